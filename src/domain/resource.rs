//! Shared behaviour of every API-backed resource.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::api::{form_value, Content};

/// Raw key-value data deserialized from an API response body
pub type Payload = Map<String, Value>;

/// Attribute lookup failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{resource} does not contain the {key} attribute")]
    NotFound { resource: &'static str, key: String },

    #[error("{resource} attribute {key} is not a {expected}")]
    Malformed {
        resource: &'static str,
        key: String,
        expected: &'static str,
    },
}

impl FieldError {
    pub fn not_found(resource: &'static str, key: impl Into<String>) -> Self {
        FieldError::NotFound {
            resource,
            key: key.into(),
        }
    }

    pub fn malformed(resource: &'static str, key: impl Into<String>, expected: &'static str) -> Self {
        FieldError::Malformed {
            resource,
            key: key.into(),
            expected,
        }
    }
}

/// A resource wrapping a raw payload.
///
/// Derived attributes are named methods on each type; [`Resource::get`] is
/// plain payload lookup and never falls back to a default.
pub trait Resource: fmt::Display {
    /// Resource kind used in error messages
    const KIND: &'static str;

    fn payload(&self) -> &Payload;

    /// Look up a payload key
    fn get(&self, key: &str) -> Result<&Value, FieldError> {
        self.payload()
            .get(key)
            .ok_or_else(|| FieldError::not_found(Self::KIND, key))
    }

    /// Look up a payload key that must hold a string
    fn get_str(&self, key: &str) -> Result<&str, FieldError> {
        self.get(key)?
            .as_str()
            .ok_or_else(|| FieldError::malformed(Self::KIND, key, "string"))
    }

    /// Integer identity from the payload `id`
    fn id(&self) -> Result<u64, FieldError> {
        self.get("id")?
            .as_u64()
            .ok_or_else(|| FieldError::malformed(Self::KIND, "id", "integer"))
    }
}

/// Maps caller-facing keys to server field names
pub(crate) struct Allowed {
    pub key: &'static str,
    pub field: &'static str,
}

/// Build the form body for an update.
///
/// Only allowlisted keys are forwarded, renamed to their server field;
/// anything else in `data` is dropped, as are nulls.
pub(crate) fn allowlist(data: &Payload, allowed: &[Allowed]) -> Vec<(String, Value)> {
    allowed
        .iter()
        .filter_map(|a| {
            data.get(a.key)
                .filter(|v| !v.is_null())
                .map(|v| (a.field.to_string(), v.clone()))
        })
        .collect()
}

pub(crate) fn to_form(fields: &[(String, Value)]) -> Vec<(String, String)> {
    fields
        .iter()
        .filter_map(|(k, v)| form_value(v).map(|v| (k.clone(), v)))
        .collect()
}

/// Patch forwarded fields into a payload after a successful update,
/// preferring the value the server echoed back.
pub(crate) fn patch_fields(payload: &mut Payload, forwarded: &[(String, Value)], response: &Content) {
    let echoed = response.as_object();
    for (field, sent) in forwarded {
        let value = echoed
            .and_then(|obj| obj.get(field))
            .cloned()
            .unwrap_or_else(|| sent.clone());
        payload.insert(field.clone(), value);
    }
}
