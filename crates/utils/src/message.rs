//! Core email message type handed to delivery handlers.
//!
//! This module defines [`EmailMessage`], an outgoing email with structured
//! [RFC 5322](https://www.rfc-editor.org/rfc/rfc5322) headers, plus the
//! generic delivery precondition check every handler runs before any
//! handler-specific logic.

use std::{error::Error, fmt::Display};

use uuid::Uuid;

use crate::parse_raw_headers;

/// Represents an outgoing email message.
///
/// Headers are stored as an ordered `Vec` (preserving RFC 5322 order and
/// supporting duplicate headers). Handlers only read the message, it is
/// never rewritten during delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Unique message identifier, used to correlate log events.
    pub message_id: String,

    /// Sender address, RFC 5322 address format.
    pub from: String,

    /// Primary recipient address, RFC 5322 address format.
    pub to: String,

    /// Ordered list of MIME headers (case-preserved keys, trimmed and
    /// unfolded values).
    headers: Vec<(String, String)>,

    /// Message body after the blank-line separator (RFC 5322 body).
    body: String,

    /// Full message as composed (headers + blank line + body).
    raw: String,
}

impl EmailMessage {
    pub fn new(from: String, to: String, raw: String) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), from, to, raw)
    }

    pub fn from_raw(from: &str, to: &str, raw: &str) -> Self {
        Self::new(from.to_string(), to.to_string(), raw.to_string())
    }

    pub fn with_id(message_id: String, from: String, to: String, raw: String) -> Self {
        let (headers, content) = parse_raw_headers(&raw);
        let body = content.to_string();
        Self {
            message_id,
            from,
            to,
            headers,
            body,
            raw,
        }
    }

    /// Returns the first header value matching `name` (case-insensitive).
    ///
    /// Only the header name is compared case-insensitively, the value is
    /// returned exactly as parsed.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the email subject (convenience for `header("Subject")`).
    pub fn subject(&self) -> &str {
        self.header("Subject").unwrap_or_default()
    }

    /// Returns the full message as composed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the message body after the header section (RFC 5322 body).
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns whether the message has any MIME headers.
    pub fn has_headers(&self) -> bool {
        !self.headers.is_empty()
    }

    /// Returns a reference to the ordered header list.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Verifies the generic delivery preconditions shared by every
    /// delivery handler: a sender, a recipient and a body must be present.
    ///
    /// Checks run in that order and the first failure is returned.
    pub fn check_delivery_params(&self) -> Result<(), DeliveryParamsError> {
        if self.from.trim().is_empty() {
            return Err(DeliveryParamsError::MissingSender);
        }
        if self.to.trim().is_empty() {
            return Err(DeliveryParamsError::MissingRecipient);
        }
        if self.body.trim().is_empty() {
            return Err(DeliveryParamsError::MissingBody);
        }
        Ok(())
    }
}

/// Errors raised when a message fails the generic delivery preconditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryParamsError {
    /// The sender address is blank.
    MissingSender,
    /// The recipient address is blank.
    MissingRecipient,
    /// The message has no body.
    MissingBody,
}

impl Display for DeliveryParamsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryParamsError::MissingSender => write!(f, "From address may not be blank"),
            DeliveryParamsError::MissingRecipient => write!(f, "To address may not be blank"),
            DeliveryParamsError::MissingBody => {
                write!(f, "A message body is required to send an email")
            }
        }
    }
}

impl Error for DeliveryParamsError {}
