//! The uniform `{status, content}` response shape.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::transport::RawResponse;
use crate::domain::Payload;
use crate::error::{Result, ZeefError};

/// Response body, parsed as JSON when possible
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Json(Value),
    Text(String),
}

impl Content {
    /// The JSON object body, if the content is one
    pub fn as_object(&self) -> Option<&Payload> {
        match self {
            Content::Json(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Json(value) => write!(f, "{}", value),
            Content::Text(text) => f.write_str(text),
        }
    }
}

/// Normalized HTTP response: status code plus parsed body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub status: u16,
    pub content: Content,
}

impl Envelope {
    pub fn new(status: u16, content: Content) -> Self {
        Self { status, content }
    }

    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx envelope into `ZeefError::Api`
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ZeefError::Api(self))
        }
    }

    /// Take the body as a JSON object payload
    pub fn into_payload(self) -> Result<Payload> {
        match self.content {
            Content::Json(Value::Object(map)) => Ok(map),
            other => Err(ZeefError::UnexpectedContent(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.content)
    }
}

/// Parse a raw response into an envelope.
///
/// A body that is not valid JSON (an HTML error page, an empty 204 body)
/// is kept as text instead of failing.
pub fn normalize_response(response: RawResponse) -> Envelope {
    let content = match serde_json::from_slice::<Value>(&response.body) {
        Ok(value) => Content::Json(value),
        Err(_) => Content::Text(String::from_utf8_lossy(&response.body).into_owned()),
    };
    Envelope::new(response.status, content)
}
