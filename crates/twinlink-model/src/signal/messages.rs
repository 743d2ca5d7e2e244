//! Live messages sent to or from a Thing or one of its Features.
//!
//! Messages are not persisted. The subject is free text and may contain `/`;
//! the payload is opaque and described by the `content-type` header.

use crate::error::{ModelError, Result};
use crate::headers::Headers;
use crate::id::{EntityId, ThingId};
use crate::signal::SignalInfo;
use crate::status::HttpStatus;
use serde_json::Value;
use std::fmt;

/// Subject reserved for claim messages.
pub const CLAIM_SUBJECT: &str = "claim";

const MESSAGES: &str = "messages";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageDirection {
    /// Sent to the device (inbox).
    To,
    /// Sent by the device (outbox).
    From,
}

impl MessageDirection {
    /// Header representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::To => "TO",
            Self::From => "FROM",
        }
    }

    /// Path segment, `inbox` or `outbox`.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::To => "inbox",
            Self::From => "outbox",
        }
    }

    pub fn from_string(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TO" => Ok(Self::To),
            "FROM" => Ok(Self::From),
            _ => Err(ModelError::InvalidHeaderValue {
                key: crate::headers::keys::MESSAGE_DIRECTION.to_string(),
                value: s.to_string(),
            }),
        }
    }

    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "inbox" => Some(Self::To),
            "outbox" => Some(Self::From),
            _ => None,
        }
    }
}

impl fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which part of the Thing a message addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Thing,
    Feature,
    Claim,
}

impl MessageKind {
    pub fn command_name(&self) -> &'static str {
        match self {
            Self::Thing => "thingMessage",
            Self::Feature => "featureMessage",
            Self::Claim => "claimMessage",
        }
    }

    pub fn response_name(&self) -> &'static str {
        match self {
            Self::Thing => "thingResponseMessage",
            Self::Feature => "featureResponseMessage",
            Self::Claim => "claimResponse",
        }
    }
}

/// Envelope and body of a live message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub direction: MessageDirection,
    pub subject: String,
    pub feature_id: Option<String>,
    pub payload: Option<Value>,
}

impl Message {
    pub fn new(direction: MessageDirection, subject: impl Into<String>) -> Result<Self> {
        let subject = subject.into();
        if subject.is_empty() || subject.starts_with('/') || subject.ends_with('/') {
            return Err(ModelError::InvalidPointer(format!("invalid message subject '{}'", subject)));
        }
        Ok(Self {
            direction,
            subject,
            feature_id: None,
            payload: None,
        })
    }

    pub fn with_feature_id(mut self, feature_id: impl Into<String>) -> Self {
        self.feature_id = Some(feature_id.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn kind(&self) -> MessageKind {
        match &self.feature_id {
            Some(_) => MessageKind::Feature,
            None if self.subject == CLAIM_SUBJECT => MessageKind::Claim,
            None => MessageKind::Thing,
        }
    }
}

/// A message sent to or from a Thing.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageCommand {
    pub thing_id: ThingId,
    pub message: Message,
    pub headers: Headers,
}

impl MessageCommand {
    pub fn new(thing_id: ThingId, message: Message, headers: Headers) -> Self {
        Self {
            thing_id,
            message,
            headers,
        }
    }
}

impl SignalInfo for MessageCommand {
    fn signal_type(&self) -> String {
        format!("{}.commands:{}", MESSAGES, self.message.kind().command_name())
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn entity_id(&self) -> Option<&EntityId> {
        Some(self.thing_id.entity_id())
    }
}

/// The answer to a [`MessageCommand`].
#[derive(Debug, Clone, PartialEq)]
pub struct MessageCommandResponse {
    pub thing_id: ThingId,
    pub message: Message,
    pub status: HttpStatus,
    pub headers: Headers,
}

impl MessageCommandResponse {
    pub fn new(thing_id: ThingId, message: Message, status: HttpStatus, headers: Headers) -> Self {
        Self {
            thing_id,
            message,
            status,
            headers,
        }
    }
}

impl SignalInfo for MessageCommandResponse {
    fn signal_type(&self) -> String {
        format!("{}.responses:{}", MESSAGES, self.message.kind().response_name())
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn entity_id(&self) -> Option<&EntityId> {
        Some(self.thing_id.entity_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_kinds() {
        let thing_id = ThingId::parse("ns:lamp").unwrap();

        let message = Message::new(MessageDirection::To, "switch/on").unwrap();
        assert_eq!(message.kind(), MessageKind::Thing);
        let command = MessageCommand::new(thing_id.clone(), message.clone(), Headers::new());
        assert_eq!(command.signal_type(), "messages.commands:thingMessage");

        let feature = message.with_feature_id("light").with_payload(json!({"level": 3}));
        assert_eq!(feature.kind(), MessageKind::Feature);

        let claim = Message::new(MessageDirection::To, CLAIM_SUBJECT).unwrap();
        let response = MessageCommandResponse::new(thing_id, claim, HttpStatus::OK, Headers::new());
        assert_eq!(response.signal_type(), "messages.responses:claimResponse");
    }

    #[test]
    fn test_direction() {
        assert_eq!(MessageDirection::from_string("from").unwrap(), MessageDirection::From);
        assert!(MessageDirection::from_string("sideways").is_err());
        assert_eq!(MessageDirection::from_path_segment("inbox"), Some(MessageDirection::To));
        assert_eq!(MessageDirection::To.path_segment(), "inbox");
        assert!(Message::new(MessageDirection::To, "").is_err());
    }
}
