//! Acknowledgements confirming that a signal reached a requested party.

use crate::error::{ModelError, Result};
use crate::headers::Headers;
use crate::id::{EntityId, ThingId};
use crate::signal::SignalInfo;
use crate::status::HttpStatus;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

static LABEL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9\-_:]{3,165}$").expect("label pattern is valid"));

/// Prefix of labels issued by the platform itself.
pub const INTERNAL_LABEL_PREFIX: &str = "ditto-";

/// Label naming an acknowledgement, e.g. `twin-persisted` or `my-connection:custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AcknowledgementLabel(String);

impl AcknowledgementLabel {
    pub fn parse(label: &str) -> Result<Self> {
        if !LABEL_PATTERN.is_match(label) {
            return Err(ModelError::InvalidLabel(label.to_string()));
        }
        Ok(Self(label.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Internal labels never leave the platform.
    pub fn is_internal(&self) -> bool {
        is_internal_label(&self.0)
    }
}

/// Whether a raw label string is platform-internal.
pub fn is_internal_label(label: &str) -> bool {
    label.starts_with(INTERNAL_LABEL_PREFIX)
}

impl fmt::Display for AcknowledgementLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AcknowledgementLabel {
    type Error = ModelError;

    fn try_from(label: String) -> Result<Self> {
        Self::parse(&label)
    }
}

impl From<AcknowledgementLabel> for String {
    fn from(label: AcknowledgementLabel) -> String {
        label.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Acknowledgement {
    pub label: AcknowledgementLabel,
    pub thing_id: ThingId,
    pub status: HttpStatus,
    pub payload: Option<Value>,
    pub headers: Headers,
}

impl Acknowledgement {
    pub fn new(label: AcknowledgementLabel, thing_id: ThingId, status: HttpStatus, headers: Headers) -> Self {
        Self {
            label,
            thing_id,
            status,
            payload: None,
            headers,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl SignalInfo for Acknowledgement {
    fn signal_type(&self) -> String {
        "acknowledgement".to_string()
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn entity_id(&self) -> Option<&EntityId> {
        Some(self.thing_id.entity_id())
    }
}
