use std::{error::Error, fmt::Display};

use maileon_utils::DeliveryParamsError;

use crate::ApiError;

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Reasons a message can fail to be dispatched as a Maileon transaction.
///
/// Variants are ordered as the pipeline gates that raise them, the first
/// failing gate is the one reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The message failed the generic delivery preconditions.
    Delivery(DeliveryParamsError),
    /// A header the dispatcher needs is absent from the message.
    MissingHeader(&'static str),
    /// No remote transaction type carries the requested name.
    TransactionTypeNotFound,
    /// The variables header is absent or is not a JSON object.
    VariableDecode,
    /// Attributes required by the transaction type are missing from the
    /// variables, in declaration order.
    MissingVariables(Vec<String>),
    /// The remote service call failed.
    Transport(ApiError),
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "maileon transaction :: ")?;
        match self {
            DispatchError::Delivery(e) => write!(f, "{e}"),
            DispatchError::MissingHeader(name) => write!(f, "missing header {name}"),
            DispatchError::TransactionTypeNotFound => write!(f, "unable to find transaction"),
            DispatchError::VariableDecode => {
                write!(f, "unable to load/parse variables for mail")
            }
            DispatchError::MissingVariables(names) => {
                write!(f, "missing variable/s [{}]", names.join(", "))
            }
            DispatchError::Transport(e) => write!(f, "{e}"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DispatchError::Delivery(e) => Some(e),
            DispatchError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DeliveryParamsError> for DispatchError {
    fn from(e: DeliveryParamsError) -> Self {
        DispatchError::Delivery(e)
    }
}

impl From<ApiError> for DispatchError {
    fn from(e: ApiError) -> Self {
        DispatchError::Transport(e)
    }
}
