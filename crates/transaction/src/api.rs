//! Remote transaction service seam.
//!
//! [`TransactionApi`] is the boundary between the dispatcher and the
//! Maileon REST API. The dispatcher only needs two operations from it,
//! listing the transaction types and creating a transaction, so tests can
//! swap in a recording fake while production uses
//! [`MaileonApi`](crate::MaileonApi).

use std::{error::Error, fmt::Display, future::Future, pin::Pin};

use serde::{de, Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Result type for remote API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Boxed future type for remote API operations, enabling object safety.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = ApiResult<T>> + Send + 'a>>;

/// Operations the dispatcher requires from the remote transaction service.
pub trait TransactionApi: Send + Sync {
    /// Lists every transaction type currently defined in the account,
    /// in the order returned by the service.
    fn transaction_types(&self) -> ApiFuture<'_, Vec<TransactionType>>;

    /// Creates a transaction of the given type, triggering the send.
    ///
    /// Returns the decoded response body, [`Value::Null`] when empty.
    fn create_transaction<'a>(
        &'a self,
        type_id: u64,
        payload: &'a Map<String, Value>,
    ) -> ApiFuture<'a, Value>;
}

/// Errors raised by the remote transaction service client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The client could not be built from the given settings.
    Configuration(String),
    /// The request could not be sent or its response could not be read.
    Http(String),
    /// The service answered with a non-success status.
    Status { status: u16, body: String },
    /// The response body did not have the expected shape.
    Decode(String),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Configuration(msg) => write!(f, "Configuration error: {msg}"),
            ApiError::Http(msg) => write!(f, "HTTP error: {msg}"),
            ApiError::Status { status, body } => {
                write!(f, "Request failed with status {status}: {body}")
            }
            ApiError::Decode(msg) => write!(f, "Decode error: {msg}"),
        }
    }
}

impl Error for ApiError {}

/// A transaction type as defined in the Maileon account.
///
/// Every entry of [`attributes`](Self::attributes) names a variable the
/// transaction needs to be created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionType {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,

    pub name: String,

    #[serde(default, deserialize_with = "deserialize_attributes")]
    pub attributes: Vec<AttributeDescriptor>,
}

impl TransactionType {
    /// Returns the names of the attributes in declaration order.
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }
}

/// Descriptor of one attribute of a [`TransactionType`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttributeDescriptor {
    pub name: String,
}

impl AttributeDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// Identifiers come back either as numbers or as numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(u64),
    Text(String),
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match IdRepr::deserialize(deserializer)? {
        IdRepr::Number(id) => Ok(id),
        IdRepr::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid transaction type id {text:?}"))),
    }
}

/// Attribute lists come either as a plain array or wrapped in an
/// `attribute` field holding one entry or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum AttributesRepr {
    List(Vec<AttributeDescriptor>),
    Wrapped(AttributeWrapper),
}

/// Any key other than `attribute` is an unknown shape and must not be read
/// as an empty attribute list.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AttributeWrapper {
    #[serde(default)]
    attribute: Option<OneOrMany>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<AttributeDescriptor>),
    One(AttributeDescriptor),
}

fn deserialize_attributes<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<AttributeDescriptor>, D::Error> {
    let attributes = match Option::<AttributesRepr>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(AttributesRepr::List(list)) => list,
        Some(AttributesRepr::Wrapped(wrapper)) => match wrapper.attribute {
            None => Vec::new(),
            Some(OneOrMany::Many(list)) => list,
            Some(OneOrMany::One(single)) => vec![single],
        },
    };
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_transaction_type_plain_list() {
        let value = json!({
            "id": 7,
            "name": "welcome",
            "attributes": [{"name": "firstname", "type": "string", "required": true}]
        });
        let transaction_type: TransactionType = serde_json::from_value(value).unwrap();

        assert_eq!(transaction_type.id, 7);
        assert_eq!(transaction_type.name, "welcome");
        assert_eq!(transaction_type.attribute_names(), vec!["firstname"]);
    }

    #[test]
    fn test_transaction_type_textual_id() {
        let value = json!({"id": "42", "name": "order", "attributes": []});
        let transaction_type: TransactionType = serde_json::from_value(value).unwrap();

        assert_eq!(transaction_type.id, 42);
    }

    #[test]
    fn test_transaction_type_invalid_id() {
        let value = json!({"id": "forty-two", "name": "order"});
        let result = serde_json::from_value::<TransactionType>(value);

        assert!(result.is_err());
    }

    #[test]
    fn test_transaction_type_wrapped_attributes() {
        let value = json!({
            "id": 3,
            "name": "order",
            "attributes": {"attribute": [{"name": "firstname"}, {"name": "amount"}]}
        });
        let transaction_type: TransactionType = serde_json::from_value(value).unwrap();

        assert_eq!(
            transaction_type.attribute_names(),
            vec!["firstname", "amount"]
        );
    }

    #[test]
    fn test_transaction_type_wrapped_single_attribute() {
        let value = json!({
            "id": 3,
            "name": "order",
            "attributes": {"attribute": {"name": "amount"}}
        });
        let transaction_type: TransactionType = serde_json::from_value(value).unwrap();

        assert_eq!(transaction_type.attributes, vec![AttributeDescriptor::new("amount")]);
    }

    #[test]
    fn test_transaction_type_without_attributes() {
        let missing: TransactionType =
            serde_json::from_value(json!({"id": 1, "name": "ping"})).unwrap();
        let null: TransactionType =
            serde_json::from_value(json!({"id": 1, "name": "ping", "attributes": null}))
                .unwrap();
        let empty_wrapper: TransactionType =
            serde_json::from_value(json!({"id": 1, "name": "ping", "attributes": {}})).unwrap();

        assert!(missing.attributes.is_empty());
        assert!(null.attributes.is_empty());
        assert!(empty_wrapper.attributes.is_empty());
    }

    #[test]
    fn test_transaction_type_unknown_attributes_wrapper() {
        let value = json!({
            "id": 7,
            "name": "welcome",
            "attributes": {"attributes": [{"name": "firstname"}, {"name": "amount"}]}
        });

        assert!(serde_json::from_value::<TransactionType>(value).is_err());
    }

    #[test]
    fn test_transaction_type_wrapper_with_extra_key() {
        let value = json!({
            "id": 7,
            "name": "welcome",
            "attributes": {"attribute": [{"name": "firstname"}], "count": 1}
        });

        assert!(serde_json::from_value::<TransactionType>(value).is_err());
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            ApiError::Status {
                status: 401,
                body: "unauthorized".to_string()
            }
            .to_string(),
            "Request failed with status 401: unauthorized"
        );
        assert_eq!(
            ApiError::Http("timeout".to_string()).to_string(),
            "HTTP error: timeout"
        );
        assert_eq!(
            ApiError::Decode("bad".to_string()).to_string(),
            "Decode error: bad"
        );
    }
}
