//! Adapter for acknowledgements, `<ns>/<name>/things/<channel>/acks/<label>`.

use super::{required_status, thing_id_of, things_topic, unknown_topic, Adapter, AdapterContext, MappingStrategies};
use crate::adaptable::Adaptable;
use crate::error::Result;
use crate::payload::Payload;
use crate::topic::{Channel, TopicPath};
use twinlink_model::signal::{Acknowledgement, AcknowledgementLabel};
use twinlink_model::JsonPointer;

const ACKNOWLEDGEMENT: &str = "acknowledgement";

pub struct AcknowledgementAdapter {
    context: AdapterContext,
    strategies: MappingStrategies<Acknowledgement>,
}

impl AcknowledgementAdapter {
    pub fn new(context: AdapterContext) -> Self {
        let mut strategies: MappingStrategies<Acknowledgement> = MappingStrategies::new();
        strategies.insert(ACKNOWLEDGEMENT.to_string(), acknowledgement);
        Self { context, strategies }
    }
}

fn acknowledgement(adaptable: &Adaptable) -> Result<Acknowledgement> {
    let label = adaptable.topic_path().subject().ok_or_else(|| unknown_topic(adaptable))?;
    let ack = Acknowledgement::new(
        AcknowledgementLabel::parse(label)?,
        thing_id_of(adaptable)?,
        required_status(adaptable)?,
        adaptable.headers_or_empty(),
    );
    Ok(match adaptable.payload().value() {
        Some(value) => ack.with_payload(value.clone()),
        None => ack,
    })
}

impl Adapter for AcknowledgementAdapter {
    type Signal = Acknowledgement;

    fn context(&self) -> &AdapterContext {
        &self.context
    }

    fn strategies(&self) -> &MappingStrategies<Acknowledgement> {
        &self.strategies
    }

    fn mapping_key(&self, _adaptable: &Adaptable) -> Result<String> {
        Ok(ACKNOWLEDGEMENT.to_string())
    }

    fn encode(&self, ack: &Acknowledgement, channel: Channel) -> Result<(TopicPath, Payload)> {
        let label = &ack.label;
        let topic = things_topic!(ack.thing_id.entity_id(), channel, b => b.acks().label(label).build())?;
        let payload = Payload::builder(JsonPointer::root())
            .with_optional_value(ack.payload.clone())
            .with_status(ack.status)
            .build();
        Ok((topic, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;
    use serde_json::json;
    use twinlink_model::{Headers, HttpStatus, ThingId};

    #[test]
    fn test_ack_round_trip() {
        let adapter = AcknowledgementAdapter::new(AdapterContext::default());
        let ack = Acknowledgement::new(
            AcknowledgementLabel::parse("custom-ack").unwrap(),
            ThingId::parse("ns:lamp").unwrap(),
            HttpStatus::NO_CONTENT,
            Headers::new(),
        )
        .with_payload(json!({"done": true}));

        let encoded = adapter.to_adaptable(&ack, Channel::Twin).unwrap();
        assert_eq!(encoded.topic_path().path(), "ns/lamp/things/twin/acks/custom-ack");
        assert_eq!(encoded.payload().status(), Some(HttpStatus::NO_CONTENT));

        let decoded = adapter.from_adaptable(&encoded).unwrap();
        assert_eq!(decoded.label, ack.label);
        assert_eq!(decoded.payload, ack.payload);
        assert_eq!(decoded.status, ack.status);
    }

    #[test]
    fn test_ack_requires_status() {
        let adapter = AcknowledgementAdapter::new(AdapterContext::default());
        let adaptable = Adaptable::from_json(&json!({
            "topic": "ns/lamp/things/twin/acks/custom-ack",
            "path": "/"
        }))
        .unwrap();
        let err = adapter.from_adaptable(&adaptable).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField { field: "status", .. }));
    }
}
