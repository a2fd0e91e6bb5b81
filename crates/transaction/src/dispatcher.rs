//! Validation and dispatch of one message as a Maileon transaction.
//!
//! [`TransactionDispatcher::dispatch`] runs a strictly linear pipeline,
//! every step a hard gate for the next one:
//!
//! 1. generic delivery preconditions of the message;
//! 2. API key check;
//! 3. transaction type resolution against the remote list;
//! 4. decoding of the variables header;
//! 5. validation of the variables against the type attributes;
//! 6. payload assembly and submission.
//!
//! Each step produces the value the next one consumes ([`TransactionType`],
//! [`VariableSet`](crate::VariableSet), [`ValidatedVariables`](crate::ValidatedVariables),
//! [`TransactionRequest`]), so a later step cannot run without the earlier
//! ones having succeeded. Nothing is cached between dispatches.

use std::sync::Arc;

use maileon_utils::{EmailMessage, Permission};
use tracing::debug;

use crate::{
    decode_variables, validate_variables, DispatchError, DispatchResult, TransactionApi,
    TransactionRequest, TransactionType,
};

/// Header naming the transaction type of the message.
pub const TRANSACTION_TYPE_HEADER: &str = "X-Maileon-TransactionType";

/// Header carrying the JSON object of transaction variables.
pub const VARIABLES_HEADER: &str = "X-Maileon-Variables";

/// Submits outgoing messages as Maileon transactions.
pub struct TransactionDispatcher {
    api: Arc<dyn TransactionApi>,
    permission: Permission,
}

impl std::fmt::Debug for TransactionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionDispatcher")
            .field("permission", &self.permission)
            .finish()
    }
}

impl TransactionDispatcher {
    /// Creates a new [`TransactionDispatcher`] talking to `api`, importing
    /// contacts with the default [`Permission`].
    pub fn new(api: Arc<dyn TransactionApi>) -> Self {
        Self {
            api,
            permission: Permission::default(),
        }
    }

    /// Sets the permission given to the contact imported with each transaction.
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Validates `message` and submits it as a transaction.
    ///
    /// Performs exactly one call to list the transaction types and, once
    /// every gate passed, exactly one call to create the transaction. On
    /// success the very same message is returned untouched.
    pub async fn dispatch<'a>(&self, message: &'a EmailMessage) -> DispatchResult<&'a EmailMessage> {
        message.check_delivery_params()?;
        self.check_api_key()?;

        let type_name = message
            .header(TRANSACTION_TYPE_HEADER)
            .ok_or(DispatchError::MissingHeader(TRANSACTION_TYPE_HEADER))?;
        let transaction_type = self.resolve_transaction_type(type_name).await?;
        debug!(
            message_id = %message.message_id,
            transaction_type = %transaction_type.name,
            type_id = transaction_type.id,
            "Resolved transaction type"
        );

        let variables = decode_variables(message.header(VARIABLES_HEADER))?;
        let validated = validate_variables(&transaction_type, variables)?;

        let recipient = message.to.trim();
        let request =
            TransactionRequest::new(&transaction_type, validated, recipient, self.permission);
        self.api
            .create_transaction(request.type_id, &request.payload)
            .await?;
        debug!(
            message_id = %message.message_id,
            type_id = request.type_id,
            to = %recipient,
            "Submitted transaction"
        );

        Ok(message)
    }

    /// Extension point for a live verification of the API key, accepts
    /// every key for now.
    fn check_api_key(&self) -> DispatchResult<()> {
        Ok(())
    }

    /// Finds the first remote transaction type named exactly `name`.
    async fn resolve_transaction_type(&self, name: &str) -> DispatchResult<TransactionType> {
        self.api
            .transaction_types()
            .await?
            .into_iter()
            .find(|transaction_type| transaction_type.name == name)
            .ok_or(DispatchError::TransactionTypeNotFound)
    }
}
