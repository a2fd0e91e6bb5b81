//! Decoding and validation of the variables carried by a message.
//!
//! Variables travel as a JSON object in a single header. They are checked
//! for presence only: every attribute declared by the transaction type must
//! appear as a key, whatever its value.

use serde_json::{Map, Value};
use tracing::debug;

use crate::{DispatchError, DispatchResult, TransactionType};

/// Mapping of template variables decoded from a message header.
pub type VariableSet = Map<String, Value>;

/// Variables that carry every attribute required by a transaction type.
///
/// Only [`validate_variables`] builds this type, so holding one proves the
/// validation gate was passed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedVariables(VariableSet);

impl ValidatedVariables {
    pub fn into_inner(self) -> VariableSet {
        self.0
    }
}

impl AsRef<VariableSet> for ValidatedVariables {
    fn as_ref(&self) -> &VariableSet {
        &self.0
    }
}

/// Decodes the raw variables header value into a [`VariableSet`].
///
/// An absent header, malformed JSON or a top-level value other than an
/// object all fail with [`DispatchError::VariableDecode`].
pub fn decode_variables(raw: Option<&str>) -> DispatchResult<VariableSet> {
    let raw = raw.ok_or(DispatchError::VariableDecode)?;
    serde_json::from_str::<VariableSet>(raw).map_err(|e| {
        debug!(error = %e, "Discarding variables parse error");
        DispatchError::VariableDecode
    })
}

/// Returns the attribute names of `transaction_type` that are not keys of
/// `variables`, in declaration order.
pub fn missing_attributes(
    transaction_type: &TransactionType,
    variables: &VariableSet,
) -> Vec<String> {
    transaction_type
        .attributes
        .iter()
        .filter(|attribute| !variables.contains_key(&attribute.name))
        .map(|attribute| attribute.name.clone())
        .collect()
}

/// Checks that `variables` carries every attribute of `transaction_type`.
///
/// All missing names are reported at once through
/// [`DispatchError::MissingVariables`].
pub fn validate_variables(
    transaction_type: &TransactionType,
    variables: VariableSet,
) -> DispatchResult<ValidatedVariables> {
    let missing = missing_attributes(transaction_type, &variables);
    debug!(
        transaction_type = %transaction_type.name,
        attributes = ?transaction_type.attribute_names(),
        missing = missing.len(),
        "Checking transaction variables"
    );
    if !missing.is_empty() {
        return Err(DispatchError::MissingVariables(missing));
    }
    Ok(ValidatedVariables(variables))
}
