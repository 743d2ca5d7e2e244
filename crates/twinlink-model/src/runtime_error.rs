//! Error payload carried by error responses.

use crate::error::{ModelError, Result};
use crate::status::HttpStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A platform error as seen by clients.
///
/// ```text
/// { "status": 404, "error": "things:attribute.notfound",
///   "message": "The attribute was not found.", "description": "..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeError {
    pub status: HttpStatus,
    #[serde(rename = "error")]
    pub error_code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl RuntimeError {
    pub fn new(status: HttpStatus, error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error_code: error_code.into(),
            message: message.into(),
            description: None,
            href: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        Self::deserialize(value).map_err(|e| ModelError::json("RuntimeError", e))
    }

    pub fn to_json(&self) -> Value {
        let mut object = crate::JsonObject::new();
        object.insert("status".to_string(), Value::from(self.status.code()));
        object.insert("error".to_string(), Value::String(self.error_code.clone()));
        object.insert("message".to_string(), Value::String(self.message.clone()));
        if let Some(description) = &self.description {
            object.insert("description".to_string(), Value::String(description.clone()));
        }
        if let Some(href) = &self.href {
            object.insert("href".to_string(), Value::String(href.clone()));
        }
        Value::Object(object)
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.error_code, self.message)
    }
}
