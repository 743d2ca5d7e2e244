//! Adapters for live messages and their responses.
//!
//! Message adaptables keep the content type of the message body and, on
//! decode, carry `ditto-message-*` headers derived from topic and path.

use super::{
    required_status, thing_id_of, things_topic, unknown_topic, Adapter, AdapterContext, MappingStrategies,
};
use crate::adaptable::Adaptable;
use crate::error::{ProtocolError, Result};
use crate::payload::{MessagePath, Payload};
use crate::topic::{Channel, TopicPath};
use twinlink_model::headers::keys;
use twinlink_model::signal::{Message, MessageCommand, MessageCommandResponse, MessageKind};
use twinlink_model::{Headers, ThingId};

const MESSAGES: &str = "messages";
const KINDS: [MessageKind; 3] = [MessageKind::Thing, MessageKind::Feature, MessageKind::Claim];

fn command_key(kind: MessageKind) -> String {
    format!("{}.commands:{}", MESSAGES, kind.command_name())
}

fn response_key(kind: MessageKind) -> String {
    format!("{}.responses:{}", MESSAGES, kind.response_name())
}

/// Decode the message envelope shared by commands and responses. The path
/// must address the message named by the topic subject.
fn message(adaptable: &Adaptable) -> Result<Message> {
    let payload = adaptable.payload();
    let path = payload.path();
    let unknown_path = || ProtocolError::unknown_path(path.to_string(), &Headers::new());
    let direction = path.direction().ok_or_else(unknown_path)?;
    let subject = adaptable.topic_path().subject().ok_or_else(|| unknown_topic(adaptable))?;
    if path.message_subject().as_deref() != Some(subject) {
        return Err(unknown_path());
    }

    let mut message = Message::new(direction, subject)?;
    if let Some(feature_id) = path.feature_id() {
        message = message.with_feature_id(feature_id);
    }
    if let Some(value) = payload.value() {
        message = message.with_payload(value.clone());
    }
    Ok(message)
}

fn message_kind(adaptable: &Adaptable) -> Result<MessageKind> {
    Ok(message(adaptable)?.kind())
}

/// `ditto-message-*` headers of an incoming message adaptable.
pub fn message_headers(adaptable: &Adaptable) -> Headers {
    let topic = adaptable.topic_path();
    let payload = adaptable.payload();
    let mut headers = Headers::new();

    if let Ok(entity_id) = topic.entity_id() {
        headers.insert(keys::MESSAGE_THING_ID, entity_id.to_string());
    }
    if let Some(subject) = topic.subject() {
        headers.insert(keys::MESSAGE_SUBJECT, subject);
    }
    if let Some(direction) = payload.path().direction() {
        headers.insert(keys::MESSAGE_DIRECTION, direction.as_str());
    }
    if let Some(feature_id) = payload.path().feature_id() {
        headers.insert(keys::MESSAGE_FEATURE_ID, feature_id);
    }
    if let Some(status) = payload.status() {
        headers.insert(keys::MESSAGE_STATUS, status.code().to_string());
    }
    headers
}

fn encode_message(thing_id: &ThingId, message: &Message, channel: Channel) -> Result<(TopicPath, Payload)> {
    let subject = message.subject.clone();
    let topic = things_topic!(thing_id.entity_id(), channel, b => b.messages().subject(subject).build())?;
    let path = MessagePath::for_message(message.direction, message.feature_id.as_deref(), &message.subject)?;
    let payload = Payload::builder(path)
        .with_optional_value(message.payload.clone())
        .build();
    Ok((topic, payload))
}

/// `messages.commands:(thing|feature|claim)Message`.
pub struct MessageCommandAdapter {
    context: AdapterContext,
    strategies: MappingStrategies<MessageCommand>,
}

impl MessageCommandAdapter {
    pub fn new(context: AdapterContext) -> Self {
        let mut strategies: MappingStrategies<MessageCommand> = MappingStrategies::new();
        for kind in KINDS {
            strategies.insert(command_key(kind), message_command);
        }
        Self { context, strategies }
    }
}

fn message_command(adaptable: &Adaptable) -> Result<MessageCommand> {
    Ok(MessageCommand::new(
        thing_id_of(adaptable)?,
        message(adaptable)?,
        adaptable.headers_or_empty(),
    ))
}

impl Adapter for MessageCommandAdapter {
    type Signal = MessageCommand;

    fn context(&self) -> &AdapterContext {
        &self.context
    }

    fn strategies(&self) -> &MappingStrategies<MessageCommand> {
        &self.strategies
    }

    fn mapping_key(&self, adaptable: &Adaptable) -> Result<String> {
        Ok(command_key(message_kind(adaptable)?))
    }

    fn encode(&self, command: &MessageCommand, channel: Channel) -> Result<(TopicPath, Payload)> {
        encode_message(&command.thing_id, &command.message, channel)
    }

    fn forces_content_type(&self) -> bool {
        false
    }

    fn decorate_headers(&self, adaptable: &Adaptable, headers: Headers) -> Headers {
        if self.context.include_message_headers() {
            headers.merged_with(&message_headers(adaptable))
        } else {
            headers
        }
    }
}

/// `messages.responses:(thingResponseMessage|featureResponseMessage|claimResponse)`.
pub struct MessageCommandResponseAdapter {
    context: AdapterContext,
    strategies: MappingStrategies<MessageCommandResponse>,
}

impl MessageCommandResponseAdapter {
    pub fn new(context: AdapterContext) -> Self {
        let mut strategies: MappingStrategies<MessageCommandResponse> = MappingStrategies::new();
        for kind in KINDS {
            strategies.insert(response_key(kind), message_response);
        }
        Self { context, strategies }
    }
}

fn message_response(adaptable: &Adaptable) -> Result<MessageCommandResponse> {
    Ok(MessageCommandResponse::new(
        thing_id_of(adaptable)?,
        message(adaptable)?,
        required_status(adaptable)?,
        adaptable.headers_or_empty(),
    ))
}

impl Adapter for MessageCommandResponseAdapter {
    type Signal = MessageCommandResponse;

    fn context(&self) -> &AdapterContext {
        &self.context
    }

    fn strategies(&self) -> &MappingStrategies<MessageCommandResponse> {
        &self.strategies
    }

    fn mapping_key(&self, adaptable: &Adaptable) -> Result<String> {
        Ok(response_key(message_kind(adaptable)?))
    }

    fn encode(&self, response: &MessageCommandResponse, channel: Channel) -> Result<(TopicPath, Payload)> {
        let (topic, payload) = encode_message(&response.thing_id, &response.message, channel)?;
        Ok((topic, payload.to_builder().with_status(response.status).build()))
    }

    fn forces_content_type(&self) -> bool {
        false
    }

    fn decorate_headers(&self, adaptable: &Adaptable, headers: Headers) -> Headers {
        if self.context.include_message_headers() {
            headers.merged_with(&message_headers(adaptable))
        } else {
            headers
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use twinlink_model::signal::MessageDirection;
    use twinlink_model::{HttpStatus, SignalInfo};

    fn adaptable(value: serde_json::Value) -> Adaptable {
        Adaptable::from_json(&value).unwrap()
    }

    #[test]
    fn test_decode_feature_message() {
        let adapter = MessageCommandAdapter::new(AdapterContext::default());
        let command = adapter
            .from_adaptable(&adaptable(json!({
                "topic": "ns/lamp/things/live/messages/switch/on",
                "headers": {"content-type": "text/plain", "ditto-message-subject": "spoofed"},
                "path": "/features/light/inbox/messages/switch/on",
                "value": "now"
            })))
            .unwrap();

        assert_eq!(command.signal_type(), "messages.commands:featureMessage");
        assert_eq!(command.message.subject, "switch/on");
        assert_eq!(command.message.direction, MessageDirection::To);
        assert_eq!(command.message.feature_id.as_deref(), Some("light"));
        assert_eq!(command.message.payload, Some(json!("now")));

        let headers = &command.headers;
        assert_eq!(headers.content_type(), Some("text/plain"));
        assert_eq!(headers.get(keys::MESSAGE_SUBJECT), Some("switch/on"));
        assert_eq!(headers.get(keys::MESSAGE_DIRECTION), Some("TO"));
        assert_eq!(headers.get(keys::MESSAGE_THING_ID), Some("ns:lamp"));
        assert!(headers.is_live_channel());
    }

    #[test]
    fn test_claim_message() {
        let adapter = MessageCommandAdapter::new(AdapterContext::default());
        let command = adapter
            .from_adaptable(&adaptable(json!({
                "topic": "ns/lamp/things/live/messages/claim",
                "path": "/inbox/messages/claim"
            })))
            .unwrap();
        assert_eq!(command.signal_type(), "messages.commands:claimMessage");
    }

    #[test]
    fn test_message_path_needs_direction() {
        let adapter = MessageCommandAdapter::new(AdapterContext::default());
        let err = adapter
            .from_adaptable(&adaptable(json!({
                "topic": "ns/lamp/things/live/messages/hello",
                "path": "/attributes"
            })))
            .unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownPath { .. }));
    }

    #[test]
    fn test_message_path_must_match_subject() {
        let adapter = MessageCommandAdapter::new(AdapterContext::default());
        for path in [
            "/outbox/messages/other",
            "/inbox",
            "/inbox/messages",
            "/features/light/inbox/nothing",
        ] {
            let err = adapter
                .from_adaptable(&adaptable(json!({
                    "topic": "ns/lamp/things/live/messages/ask",
                    "path": path
                })))
                .unwrap_err();
            assert!(matches!(err, ProtocolError::UnknownPath { .. }), "{} gave {:?}", path, err);
        }
    }

    #[test]
    fn test_empty_feature_id_not_encoded() {
        let adapter = MessageCommandAdapter::new(AdapterContext::default());
        let message = Message::new(MessageDirection::To, "hello").unwrap().with_feature_id("");
        let command = MessageCommand::new(ThingId::parse("ns:lamp").unwrap(), message, Headers::new());
        assert!(matches!(
            adapter.to_adaptable(&command, Channel::Live).unwrap_err(),
            ProtocolError::InvalidModel { .. }
        ));
    }

    #[test]
    fn test_response_keeps_content_type() {
        let adapter = MessageCommandResponseAdapter::new(AdapterContext::default());
        let message = Message::new(MessageDirection::From, "status")
            .unwrap()
            .with_payload(json!({"on": true}));
        let response = MessageCommandResponse::new(
            ThingId::parse("ns:lamp").unwrap(),
            message,
            HttpStatus::OK,
            Headers::new().with(keys::CONTENT_TYPE, "application/json"),
        );

        let encoded = adapter.to_adaptable(&response, Channel::Live).unwrap();
        assert_eq!(encoded.topic_path().path(), "ns/lamp/things/live/messages/status");
        assert_eq!(encoded.payload().path().to_string(), "/outbox/messages/status");
        assert_eq!(encoded.payload().status(), Some(HttpStatus::OK));
        assert_eq!(encoded.headers().unwrap().content_type(), Some("application/json"));

        let decoded = adapter.from_adaptable(&encoded).unwrap();
        assert_eq!(decoded.message, response.message);
        assert_eq!(decoded.headers.get(keys::MESSAGE_STATUS), Some("200"));
    }
}
