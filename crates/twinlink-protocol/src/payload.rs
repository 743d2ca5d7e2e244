//! Payload of an adaptable: the resource path plus the data of the signal.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use twinlink_model::signal::MessageDirection;
use twinlink_model::{HttpStatus, JsonFieldSelector, JsonObject, JsonPointer, ModelError};

const FEATURES: &str = "features";
const MESSAGES: &str = "messages";

/// Path of the resource a signal is about, relative to the entity root.
///
/// Message paths have the form `/(inbox|outbox)/messages/<subject>` or
/// `/features/<id>/(inbox|outbox)/messages/<subject>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MessagePath(JsonPointer);

impl MessagePath {
    pub fn new(pointer: JsonPointer) -> Self {
        Self(pointer)
    }

    pub fn root() -> Self {
        Self::default()
    }

    /// Path of a message to or from the Thing or one of its features.
    pub fn for_message(
        direction: MessageDirection,
        feature_id: Option<&str>,
        subject: &str,
    ) -> Result<Self, ModelError> {
        let mut keys: Vec<String> = Vec::new();
        if let Some(feature_id) = feature_id {
            keys.push(FEATURES.to_string());
            keys.push(feature_id.to_string());
        }
        keys.push(direction.path_segment().to_string());
        keys.push(MESSAGES.to_string());
        keys.extend(subject.split('/').filter(|part| !part.is_empty()).map(str::to_string));
        JsonPointer::from_keys(keys).map(Self)
    }

    pub fn pointer(&self) -> &JsonPointer {
        &self.0
    }

    pub fn into_pointer(self) -> JsonPointer {
        self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_root()
    }

    /// The feature the path is rooted at, if any.
    pub fn feature_id(&self) -> Option<&str> {
        match self.0.first() {
            Some(FEATURES) => self.0.get(1),
            _ => None,
        }
    }

    /// Message direction of an `inbox`/`outbox` path.
    pub fn direction(&self) -> Option<MessageDirection> {
        let segment = match self.0.first() {
            Some(FEATURES) => self.0.get(2),
            other => other,
        };
        segment.and_then(MessageDirection::from_path_segment)
    }

    /// The message subject following `(inbox|outbox)/messages/`.
    pub fn message_subject(&self) -> Option<String> {
        let offset = match self.0.first() {
            Some(FEATURES) => 2,
            _ => 0,
        };
        self.direction()?;
        if self.0.get(offset + 1) != Some(MESSAGES) {
            return None;
        }
        let subject = self.0.sub_pointer(offset + 2)?;
        if subject.is_root() {
            return None;
        }
        Some(subject.keys().join("/"))
    }
}

impl From<JsonPointer> for MessagePath {
    fn from(pointer: JsonPointer) -> Self {
        Self(pointer)
    }
}

impl fmt::Display for MessagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Immutable payload of an adaptable. Build with [`Payload::builder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    path: MessagePath,
    value: Option<Value>,
    extra: Option<JsonObject>,
    status: Option<HttpStatus>,
    revision: Option<u64>,
    timestamp: Option<DateTime<Utc>>,
    fields: Option<JsonFieldSelector>,
}

impl Payload {
    pub fn builder(path: impl Into<MessagePath>) -> PayloadBuilder {
        PayloadBuilder {
            payload: Payload {
                path: path.into(),
                value: None,
                extra: None,
                status: None,
                revision: None,
                timestamp: None,
                fields: None,
            },
        }
    }

    pub fn path(&self) -> &MessagePath {
        &self.path
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn extra(&self) -> Option<&JsonObject> {
        self.extra.as_ref()
    }

    pub fn status(&self) -> Option<HttpStatus> {
        self.status
    }

    pub fn revision(&self) -> Option<u64> {
        self.revision
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn fields(&self) -> Option<&JsonFieldSelector> {
        self.fields.as_ref()
    }

    /// A builder preloaded with this payload.
    pub fn to_builder(&self) -> PayloadBuilder {
        PayloadBuilder { payload: self.clone() }
    }
}

impl Hash for Payload {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
        self.value.as_ref().map(Value::to_string).hash(state);
        self.extra.as_ref().map(|extra| Value::Object(extra.clone()).to_string()).hash(state);
        self.status.hash(state);
        self.revision.hash(state);
        self.timestamp.hash(state);
        self.fields.hash(state);
    }
}

#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    payload: Payload,
}

impl PayloadBuilder {
    pub fn with_value(mut self, value: Value) -> Self {
        self.payload.value = Some(value);
        self
    }

    pub fn with_optional_value(mut self, value: Option<Value>) -> Self {
        self.payload.value = value;
        self
    }

    pub fn with_extra(mut self, extra: JsonObject) -> Self {
        self.payload.extra = Some(extra);
        self
    }

    pub fn with_status(mut self, status: HttpStatus) -> Self {
        self.payload.status = Some(status);
        self
    }

    pub fn with_revision(mut self, revision: u64) -> Self {
        self.payload.revision = Some(revision);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.payload.timestamp = Some(timestamp);
        self
    }

    pub fn with_optional_timestamp(mut self, timestamp: Option<DateTime<Utc>>) -> Self {
        self.payload.timestamp = timestamp;
        self
    }

    pub fn with_fields(mut self, fields: JsonFieldSelector) -> Self {
        self.payload.fields = Some(fields);
        self
    }

    pub fn with_optional_fields(mut self, fields: Option<JsonFieldSelector>) -> Self {
        self.payload.fields = fields;
        self
    }

    pub fn build(self) -> Payload {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> MessagePath {
        MessagePath::new(JsonPointer::parse(s).unwrap())
    }

    #[test]
    fn test_message_path_parts() {
        let thing = path("/inbox/messages/switch/on");
        assert_eq!(thing.direction(), Some(MessageDirection::To));
        assert_eq!(thing.feature_id(), None);
        assert_eq!(thing.message_subject().as_deref(), Some("switch/on"));

        let feature = path("/features/light/outbox/messages/dimmed");
        assert_eq!(feature.direction(), Some(MessageDirection::From));
        assert_eq!(feature.feature_id(), Some("light"));
        assert_eq!(feature.message_subject().as_deref(), Some("dimmed"));

        let attribute = path("/attributes/location");
        assert_eq!(attribute.direction(), None);
        assert_eq!(attribute.message_subject(), None);
    }

    #[test]
    fn test_for_message() {
        let built = MessagePath::for_message(MessageDirection::From, Some("light"), "a/b").unwrap();
        assert_eq!(built.to_string(), "/features/light/outbox/messages/a/b");
        assert_eq!(built.message_subject().as_deref(), Some("a/b"));
    }

    #[test]
    fn test_for_message_rejects_empty_feature_id() {
        assert!(MessagePath::for_message(MessageDirection::To, Some(""), "hello").is_err());
    }

    #[test]
    fn test_payload_builder() {
        let payload = Payload::builder(path("/attributes/a"))
            .with_value(json!(1))
            .with_status(HttpStatus::NO_CONTENT)
            .with_revision(4)
            .build();
        assert_eq!(payload.value(), Some(&json!(1)));
        assert_eq!(payload.status(), Some(HttpStatus::NO_CONTENT));
        assert_eq!(payload.revision(), Some(4));
        assert!(payload.timestamp().is_none());

        let copy = payload.to_builder().with_revision(5).build();
        assert_ne!(copy, payload);
    }
}
