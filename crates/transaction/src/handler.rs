//! Maileon transaction delivery as a [`MessageHandler`].
//!
//! Provides [`MaileonTransactionHandler`], which plugs the
//! [`TransactionDispatcher`] into a mail pipeline in place of SMTP delivery.

use std::sync::Arc;

use maileon_utils::{EmailMessage, HandlerError, HandlerFuture, MaileonConfig, MessageHandler};
use tracing::{error, info};

use crate::{DispatchError, MaileonApi, TransactionDispatcher};

/// Message handler that sends emails as Maileon transactions.
#[derive(Debug)]
pub struct MaileonTransactionHandler {
    dispatcher: TransactionDispatcher,
}

impl MaileonTransactionHandler {
    /// Creates a new [`MaileonTransactionHandler`] around an existing dispatcher.
    pub fn new(dispatcher: TransactionDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Creates a new [`MaileonTransactionHandler`] talking to the Maileon
    /// REST API described by `config`.
    pub fn from_config(config: &MaileonConfig) -> Result<Self, HandlerError> {
        let api = MaileonApi::from_config(config).map_err(|e| {
            error!(error = %e, "Failed to create Maileon API client");
            HandlerError::Configuration(e.to_string())
        })?;
        let dispatcher =
            TransactionDispatcher::new(Arc::new(api)).with_permission(config.permission);
        info!(
            permission = config.permission.code(),
            "Maileon transaction handler initialized"
        );
        Ok(Self::new(dispatcher))
    }

    /// Returns a reference to the underlying dispatcher.
    pub fn dispatcher(&self) -> &TransactionDispatcher {
        &self.dispatcher
    }
}

impl From<DispatchError> for HandlerError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::Transport(_) => HandlerError::Connection(e.to_string()),
            _ => HandlerError::Rejected(e.to_string()),
        }
    }
}

impl MessageHandler for MaileonTransactionHandler {
    fn handle<'a>(&'a self, message: &'a EmailMessage) -> HandlerFuture<'a> {
        Box::pin(async move {
            self.dispatcher.dispatch(message).await.map_err(|e| {
                error!(
                    message_id = %message.message_id,
                    to = %message.to,
                    error = %e,
                    "Failed to dispatch Maileon transaction"
                );
                HandlerError::from(e)
            })?;
            info!(
                message_id = %message.message_id,
                from = %message.from,
                to = %message.to,
                "Dispatched Maileon transaction"
            );
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "maileon_transaction"
    }
}

#[cfg(test)]
mod tests {
    use maileon_utils::Permission;

    use super::*;
    use crate::{
        dispatcher::tests::{message, transaction_type, RecordingApi},
        ApiError,
    };

    fn handler(api: &Arc<RecordingApi>) -> MaileonTransactionHandler {
        MaileonTransactionHandler::new(TransactionDispatcher::new(api.clone()))
    }

    #[tokio::test]
    async fn test_handle_success() {
        let api = Arc::new(RecordingApi::new(vec![transaction_type(
            7,
            "welcome",
            &["firstname"],
        )]));

        handler(&api)
            .handle(&message("welcome", r#"{"firstname": "Jo"}"#))
            .await
            .unwrap();

        assert_eq!(api.created().len(), 1);
    }

    #[tokio::test]
    async fn test_handle_validation_failure_rejected() {
        let api = Arc::new(RecordingApi::new(vec![transaction_type(
            7,
            "welcome",
            &["firstname"],
        )]));

        let result = handler(&api).handle(&message("welcome", "{}")).await;

        assert_eq!(
            result,
            Err(HandlerError::Rejected(
                "maileon transaction :: missing variable/s [firstname]".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_handle_precondition_failure_rejected() {
        let api = Arc::new(RecordingApi::new(vec![]));
        let message = EmailMessage::from_raw("shop@example.com", "", "Body");

        let result = handler(&api).handle(&message).await;

        assert!(matches!(result, Err(HandlerError::Rejected(_))));
        assert_eq!(api.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_handle_transport_failure_connection() {
        let api = Arc::new(RecordingApi::failing_list(ApiError::Http(
            "connection refused".to_string(),
        )));

        let result = handler(&api).handle(&message("welcome", "{}")).await;

        assert_eq!(
            result,
            Err(HandlerError::Connection(
                "maileon transaction :: HTTP error: connection refused".to_string()
            ))
        );
    }

    #[test]
    fn test_from_config() {
        let config = MaileonConfig {
            permission: Permission::ConfirmedOptIn,
            ..MaileonConfig::new("key")
        };
        let handler = MaileonTransactionHandler::from_config(&config).unwrap();

        assert_eq!(handler.name(), "maileon_transaction");
        assert_eq!(handler.dispatcher().permission(), Permission::ConfirmedOptIn);
    }

    #[test]
    fn test_from_config_blank_api_key() {
        let result = MaileonTransactionHandler::from_config(&MaileonConfig::new(""));

        assert!(matches!(result, Err(HandlerError::Configuration(_))));
    }
}
