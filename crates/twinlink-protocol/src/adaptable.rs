//! The wire-level envelope exchanged with external parties.
//!
//! ```text
//! {
//!   "topic": "org.eclipse.ditto/lamp/things/twin/commands/modify",
//!   "headers": { "correlation-id": "c-1" },
//!   "path": "/attributes/location",
//!   "value": "kitchen"
//! }
//! ```

use crate::error::{ProtocolError, Result};
use crate::payload::{MessagePath, Payload};
use crate::topic::TopicPath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use twinlink_model::{Headers, HttpStatus, JsonFieldSelector, JsonObject, JsonPointer};

/// Envelope field names.
pub mod fields {
    pub const TOPIC: &str = "topic";
    pub const HEADERS: &str = "headers";
    pub const PATH: &str = "path";
    pub const VALUE: &str = "value";
    pub const EXTRA: &str = "extra";
    pub const STATUS: &str = "status";
    pub const REVISION: &str = "revision";
    pub const TIMESTAMP: &str = "timestamp";
    pub const FIELDS: &str = "fields";
}

/// Topic path, payload and headers of one protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Adaptable {
    topic_path: TopicPath,
    payload: Payload,
    headers: Option<Headers>,
}

impl Adaptable {
    pub fn new(topic_path: TopicPath, payload: Payload, headers: Option<Headers>) -> Self {
        Self {
            topic_path,
            payload,
            headers,
        }
    }

    pub fn topic_path(&self) -> &TopicPath {
        &self.topic_path
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    /// The headers, or an empty map.
    pub fn headers_or_empty(&self) -> Headers {
        self.headers.clone().unwrap_or_default()
    }

    pub fn with_headers(self, headers: Headers) -> Self {
        Self {
            headers: Some(headers),
            ..self
        }
    }

    pub fn to_json(&self) -> Value {
        let mut object = JsonObject::new();
        object.insert(fields::TOPIC.to_string(), Value::String(self.topic_path.path().to_string()));

        let headers = self
            .headers
            .iter()
            .flat_map(Headers::iter)
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect();
        object.insert(fields::HEADERS.to_string(), Value::Object(headers));

        let payload = &self.payload;
        object.insert(fields::PATH.to_string(), Value::String(payload.path().to_string()));
        if let Some(value) = payload.value() {
            object.insert(fields::VALUE.to_string(), value.clone());
        }
        if let Some(extra) = payload.extra() {
            object.insert(fields::EXTRA.to_string(), Value::Object(extra.clone()));
        }
        if let Some(status) = payload.status() {
            object.insert(fields::STATUS.to_string(), Value::from(status.code()));
        }
        if let Some(revision) = payload.revision() {
            object.insert(fields::REVISION.to_string(), Value::from(revision));
        }
        if let Some(timestamp) = payload.timestamp() {
            object.insert(fields::TIMESTAMP.to_string(), Value::String(timestamp.to_rfc3339()));
        }
        if let Some(fields) = payload.fields() {
            object.insert(fields::FIELDS.to_string(), Value::String(fields.to_string()));
        }
        Value::Object(object)
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }

    /// Parse an envelope. Non-string header values are stringified.
    pub fn from_json(json: &Value) -> Result<Self> {
        let empty = Headers::new();
        let object = json
            .as_object()
            .ok_or_else(|| ProtocolError::missing_field(fields::TOPIC, &empty))?;

        let headers = match object.get(fields::HEADERS) {
            Some(Value::Object(map)) => Some(
                map.iter()
                    .map(|(key, value)| (key.clone(), header_value(value)))
                    .collect::<Headers>(),
            ),
            Some(Value::Null) | None => None,
            Some(_) => return Err(ProtocolError::missing_field(fields::HEADERS, &empty)),
        };
        let in_flight = headers.clone().unwrap_or_default();
        let with_headers = |err: ProtocolError| err.with_headers(&in_flight);

        let topic = object
            .get(fields::TOPIC)
            .and_then(Value::as_str)
            .ok_or_else(|| ProtocolError::missing_field(fields::TOPIC, &in_flight))?;
        let topic_path = TopicPath::parse(topic).map_err(with_headers)?;

        let path = object
            .get(fields::PATH)
            .and_then(Value::as_str)
            .ok_or_else(|| ProtocolError::missing_field(fields::PATH, &in_flight))?;
        let pointer = JsonPointer::parse(path)
            .map_err(|_| ProtocolError::unknown_path(path, &in_flight))?;

        let mut builder = Payload::builder(MessagePath::new(pointer));
        if let Some(value) = object.get(fields::VALUE) {
            builder = builder.with_value(value.clone());
        }
        if let Some(extra) = object.get(fields::EXTRA) {
            let extra = extra
                .as_object()
                .cloned()
                .ok_or_else(|| ProtocolError::missing_field(fields::EXTRA, &in_flight))?;
            builder = builder.with_extra(extra);
        }
        if let Some(status) = object.get(fields::STATUS) {
            let code = status
                .as_u64()
                .and_then(|code| u16::try_from(code).ok())
                .ok_or_else(|| ProtocolError::missing_field(fields::STATUS, &in_flight))?;
            builder = builder.with_status(HttpStatus::from_code(code).map_err(|e| with_headers(e.into()))?);
        }
        if let Some(revision) = object.get(fields::REVISION) {
            let revision = revision
                .as_u64()
                .ok_or_else(|| ProtocolError::missing_field(fields::REVISION, &in_flight))?;
            builder = builder.with_revision(revision);
        }
        if let Some(timestamp) = object.get(fields::TIMESTAMP) {
            let timestamp = timestamp
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|t| t.with_timezone(&Utc))
                .ok_or_else(|| ProtocolError::missing_field(fields::TIMESTAMP, &in_flight))?;
            builder = builder.with_timestamp(timestamp);
        }
        if let Some(selector) = object.get(fields::FIELDS) {
            let selector = selector
                .as_str()
                .ok_or_else(|| ProtocolError::missing_field(fields::FIELDS, &in_flight))?;
            builder = builder.with_fields(JsonFieldSelector::parse(selector).map_err(|e| with_headers(e.into()))?);
        }

        Ok(Self::new(topic_path, builder.build(), headers))
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let json: Value = serde_json::from_str(s)?;
        Self::from_json(&json)
    }
}

fn header_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Serialize for Adaptable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Adaptable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Adaptable::from_json(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_round_trip() {
        let json = json!({
            "topic": "ns/lamp/things/twin/events/modified",
            "headers": {"correlation-id": "c-1"},
            "path": "/attributes/location",
            "value": "kitchen",
            "revision": 3,
            "timestamp": "2024-05-01T10:00:00+00:00"
        });
        let adaptable = Adaptable::from_json(&json).unwrap();
        assert_eq!(adaptable.payload().revision(), Some(3));
        assert_eq!(adaptable.headers().unwrap().correlation_id(), Some("c-1"));
        assert_eq!(adaptable.to_json(), json);
    }

    #[test]
    fn test_structural_hashing() {
        use std::collections::HashSet;

        let first = Adaptable::from_json(&json!({
            "topic": "ns/lamp/things/twin/commands/modify",
            "headers": {"correlation-id": "c-1"},
            "path": "/attributes",
            "value": {"a": 1, "b": [true, null]}
        }))
        .unwrap();
        let reordered = Adaptable::from_json(&json!({
            "value": {"b": [true, null], "a": 1},
            "path": "/attributes",
            "headers": {"Correlation-Id": "c-1"},
            "topic": "ns/lamp/things/twin/commands/modify"
        }))
        .unwrap();
        let other = first.clone().with_headers(Headers::new());

        let set: HashSet<Adaptable> = [first.clone(), reordered, other].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&first));
    }

    #[test]
    fn test_non_string_headers_are_stringified() {
        let adaptable = Adaptable::from_json(&json!({
            "topic": "ns/lamp/things/twin/commands/retrieve",
            "headers": {"response-required": true, "timeout": 30, "requested-acks": ["a-1"]},
            "path": "/"
        }))
        .unwrap();
        let headers = adaptable.headers().unwrap();
        assert_eq!(headers.get("response-required"), Some("true"));
        assert_eq!(headers.get("timeout"), Some("30"));
        assert_eq!(headers.get("requested-acks"), Some(r#"["a-1"]"#));
    }

    #[test]
    fn test_invalid_envelopes_keep_headers() {
        let err = Adaptable::from_json(&json!({
            "topic": "ns/lamp/things/nowhere",
            "headers": {"correlation-id": "c-9"},
            "path": "/"
        }))
        .unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownTopicPath { .. }));
        assert_eq!(err.headers().correlation_id(), Some("c-9"));

        let err = Adaptable::from_json(&json!({"topic": "ns/lamp/things/twin/errors"})).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField { field: "path", .. }));
        assert!(Adaptable::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_serde_impls() {
        let adaptable: Adaptable =
            serde_json::from_str(r#"{"topic":"ns/lamp/things/twin/errors","path":"/","status":404}"#).unwrap();
        assert_eq!(adaptable.payload().status(), Some(HttpStatus::NOT_FOUND));
        let text = serde_json::to_string(&adaptable).unwrap();
        assert!(text.contains("\"status\":404"));
    }
}
