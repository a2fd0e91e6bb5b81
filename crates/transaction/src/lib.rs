//! Delivery of transactional email through the Maileon API.
//!
//! Instead of handing a message to an SMTP server, the
//! [`TransactionDispatcher`] reads the transaction type and the template
//! variables from two custom headers, validates them against the type
//! defined in the Maileon account and creates a transaction, which makes
//! Maileon render and send the email.
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//!
//! use maileon_transaction::{MaileonApi, TransactionDispatcher};
//! use maileon_utils::EmailMessage;
//!
//! let api = MaileonApi::new("xxxxxx-yyy-xxx-yyyyyy", false)?;
//! let dispatcher = TransactionDispatcher::new(Arc::new(api));
//!
//! let message = EmailMessage::from_raw(
//!     "shop@example.com",
//!     "jo@example.com",
//!     "X-Maileon-TransactionType: welcome\r\n\
//!      X-Maileon-Variables: {\"firstname\": \"Jo\"}\r\n\r\nWelcome aboard",
//! );
//! dispatcher.dispatch(&message).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod request;
pub mod variables;

pub use api::*;
pub use client::*;
pub use dispatcher::*;
pub use error::*;
pub use handler::*;
pub use request::*;
pub use variables::*;
