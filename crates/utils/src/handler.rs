use std::{error::Error, fmt::Display, future::Future, pin::Pin};

use crate::EmailMessage;

/// Result type for handler operations.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Boxed future type for handler operations, enabling object safety.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = HandlerResult<()>> + Send + 'a>>;

/// Errors that can occur during message delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The message was refused before it left the process.
    Rejected(String),
    /// A connection error occurred talking to the remote service.
    Connection(String),
    /// The handler could not be built from its configuration.
    Configuration(String),
}

impl Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerError::Rejected(msg) => write!(f, "Rejected: {msg}"),
            HandlerError::Connection(msg) => write!(f, "Connection error: {msg}"),
            HandlerError::Configuration(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl Error for HandlerError {}

/// Trait for delivery handlers that take an outgoing email and hand it
/// over to its destination.
///
/// A handler plays the role of a delivery method in a mail pipeline: the
/// pipeline composes the message, the handler decides how it leaves the
/// process (SMTP, a remote API, a queue).
pub trait MessageHandler: Send + Sync {
    /// Delivers an outgoing email message.
    fn handle<'a>(&'a self, message: &'a EmailMessage) -> HandlerFuture<'a>;

    /// Returns the name of this handler.
    fn name(&self) -> &str;
}
