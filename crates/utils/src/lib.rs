pub mod config;
pub mod handler;
pub mod message;
pub mod mime;

pub use config::*;
pub use handler::*;
pub use message::*;
pub use mime::*;
