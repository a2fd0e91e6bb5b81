use maileon_utils::Permission;
use serde_json::{json, Map, Value};

use crate::{TransactionType, ValidatedVariables};

/// Top-level payload key owned by the dispatcher, holding the contact the
/// transaction is sent to.
pub const IMPORT_KEY: &str = "import";

/// Outbound "create transaction" request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRequest {
    pub type_id: u64,
    pub payload: Map<String, Value>,
}

impl TransactionRequest {
    /// Builds the request for `transaction_type`, merging the validated
    /// variables with the contact block of `recipient`.
    ///
    /// The `import` key always holds the contact block, a caller supplied
    /// `import` variable is replaced.
    pub fn new(
        transaction_type: &TransactionType,
        variables: ValidatedVariables,
        recipient: &str,
        permission: Permission,
    ) -> Self {
        let mut payload = variables.into_inner();
        payload.insert(
            IMPORT_KEY.to_string(),
            json!({
                "contact": {
                    "email": recipient,
                    "permission": permission.code(),
                }
            }),
        );
        Self {
            type_id: transaction_type.id,
            payload,
        }
    }
}
