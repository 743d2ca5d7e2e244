//! Header definitions.
//!
//! Every header the platform knows about is described by a [`HeaderDefinition`]:
//! its key, the type its value serializes as, and whether it may be read from
//! or written to external parties. The definition tables are fixed and shared
//! by the whole process.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Header keys with special meaning.
pub mod keys {
    pub const CORRELATION_ID: &str = "correlation-id";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const SCHEMA_VERSION: &str = "version";
    pub const RESPONSE_REQUIRED: &str = "response-required";
    pub const DRY_RUN: &str = "dry-run";
    pub const CHANNEL: &str = "channel";
    pub const REQUESTED_ACKS: &str = "requested-acks";
    pub const DECLARED_ACKS: &str = "declared-acks";
    pub const TIMEOUT: &str = "timeout";
    pub const IF_MATCH: &str = "if-match";
    pub const IF_NONE_MATCH: &str = "if-none-match";
    pub const ETAG: &str = "etag";
    pub const ORIGIN: &str = "origin";
    pub const REPLY_TO: &str = "reply-to";
    pub const REPLY_TARGET: &str = "ditto-reply-target";
    pub const ORIGINATOR: &str = "ditto-originator";
    pub const READ_SUBJECTS: &str = "ditto-read-subjects";
    pub const AUTHORIZATION_CONTEXT: &str = "ditto-auth-context";
    pub const WEAK_ACK: &str = "ditto-weak-ack";
    pub const ENTITY_ID: &str = "ditto-entity-id";
    pub const INBOUND_PAYLOAD_MAPPER: &str = "ditto-inbound-payload-mapper";

    pub const MESSAGE_DIRECTION: &str = "ditto-message-direction";
    pub const MESSAGE_SUBJECT: &str = "ditto-message-subject";
    pub const MESSAGE_THING_ID: &str = "ditto-message-thing-id";
    pub const MESSAGE_FEATURE_ID: &str = "ditto-message-feature-id";
    pub const MESSAGE_STATUS: &str = "ditto-message-status";
    pub const TIMESTAMP: &str = "timestamp";
}

/// The JSON type a header value serializes as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderValueType {
    String,
    Integer,
    Boolean,
    JsonArray,
    JsonObject,
}

impl HeaderValueType {
    /// Whether `value` is a valid serialization for this type.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::String => true,
            Self::Integer => value.parse::<i64>().is_ok(),
            Self::Boolean => matches!(value, "true" | "false"),
            Self::JsonArray => matches!(
                serde_json::from_str::<serde_json::Value>(value),
                Ok(serde_json::Value::Array(_))
            ),
            Self::JsonObject => matches!(
                serde_json::from_str::<serde_json::Value>(value),
                Ok(serde_json::Value::Object(_))
            ),
        }
    }
}

/// Read/write/serialization policy for one header key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeaderDefinition {
    pub key: &'static str,
    pub value_type: HeaderValueType,
    pub read_from_external: bool,
    pub write_to_external: bool,
}

impl HeaderDefinition {
    pub const fn new(
        key: &'static str,
        value_type: HeaderValueType,
        read_from_external: bool,
        write_to_external: bool,
    ) -> Self {
        Self {
            key,
            value_type,
            read_from_external,
            write_to_external,
        }
    }

    /// Header visible in both directions.
    const fn public(key: &'static str, value_type: HeaderValueType) -> Self {
        Self::new(key, value_type, true, true)
    }

    /// Header that never crosses the platform boundary.
    const fn internal(key: &'static str, value_type: HeaderValueType) -> Self {
        Self::new(key, value_type, false, false)
    }
}

use HeaderValueType::{Boolean, Integer, JsonArray, JsonObject, String as Str};

/// Headers understood by every signal.
pub static STANDARD_HEADER_DEFINITIONS: &[HeaderDefinition] = &[
    HeaderDefinition::public(keys::CORRELATION_ID, Str),
    HeaderDefinition::public(keys::CONTENT_TYPE, Str),
    HeaderDefinition::public(keys::SCHEMA_VERSION, Integer),
    HeaderDefinition::public(keys::RESPONSE_REQUIRED, Boolean),
    HeaderDefinition::public(keys::DRY_RUN, Boolean),
    HeaderDefinition::new(keys::CHANNEL, Str, true, false),
    HeaderDefinition::public(keys::REQUESTED_ACKS, JsonArray),
    HeaderDefinition::public(keys::DECLARED_ACKS, JsonArray),
    HeaderDefinition::public(keys::TIMEOUT, Str),
    HeaderDefinition::public(keys::IF_MATCH, Str),
    HeaderDefinition::public(keys::IF_NONE_MATCH, Str),
    HeaderDefinition::public(keys::ETAG, Str),
    HeaderDefinition::public(keys::ORIGIN, Str),
    HeaderDefinition::public(keys::REPLY_TO, Str),
    HeaderDefinition::internal(keys::REPLY_TARGET, Integer),
    HeaderDefinition::new(keys::ORIGINATOR, Str, false, true),
    HeaderDefinition::internal(keys::READ_SUBJECTS, JsonArray),
    HeaderDefinition::internal(keys::AUTHORIZATION_CONTEXT, JsonObject),
    HeaderDefinition::new(keys::WEAK_ACK, Boolean, false, true),
    HeaderDefinition::internal(keys::ENTITY_ID, Str),
    HeaderDefinition::internal(keys::INBOUND_PAYLOAD_MAPPER, Str),
];

/// Headers synthesized for live messages.
pub static MESSAGE_HEADER_DEFINITIONS: &[HeaderDefinition] = &[
    HeaderDefinition::internal(keys::MESSAGE_DIRECTION, Str),
    HeaderDefinition::internal(keys::MESSAGE_SUBJECT, Str),
    HeaderDefinition::internal(keys::MESSAGE_THING_ID, Str),
    HeaderDefinition::internal(keys::MESSAGE_FEATURE_ID, Str),
    HeaderDefinition::internal(keys::MESSAGE_STATUS, Integer),
    HeaderDefinition::public(keys::TIMESTAMP, Str),
];

/// Lookup table from header key to definition.
#[derive(Debug, Clone, Default)]
pub struct HeaderDefinitions {
    by_key: HashMap<&'static str, &'static HeaderDefinition>,
}

impl HeaderDefinitions {
    /// Build a lookup from definition tables. Later tables win on duplicate keys.
    pub fn of(tables: &[&'static [HeaderDefinition]]) -> Self {
        let by_key = tables
            .iter()
            .flat_map(|table| table.iter())
            .map(|definition| (definition.key, definition))
            .collect();
        Self { by_key }
    }

    /// The standard and message definitions combined, built once.
    pub fn all() -> &'static HeaderDefinitions {
        static ALL: Lazy<HeaderDefinitions> = Lazy::new(|| {
            HeaderDefinitions::of(&[STANDARD_HEADER_DEFINITIONS, MESSAGE_HEADER_DEFINITIONS])
        });
        &ALL
    }

    pub fn get(&self, key: &str) -> Option<&'static HeaderDefinition> {
        self.by_key.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
