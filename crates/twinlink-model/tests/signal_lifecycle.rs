//! A command flowing through its response and event, as the platform processes it.

use serde_json::json;
use twinlink_model::headers::keys;
use twinlink_model::signal::{
    ModifyAction, ThingEvent, ThingModifyCommand, ThingModifyCommandResponse, ThingModifyKind, ThingResource,
};
use twinlink_model::{Feature, Headers, HttpStatus, JsonPointer, Signal, SignalInfo, Thing, ThingId};

fn thing_id() -> ThingId {
    ThingId::parse("org.eclipse.ditto:lamp").unwrap()
}

#[test]
fn test_modify_feature_property_lifecycle() {
    let command = ThingModifyCommand::new(
        thing_id(),
        ThingModifyKind::ModifyFeatureProperty {
            feature_id: "light".into(),
            pointer: JsonPointer::parse("/brightness").unwrap(),
            value: json!(80),
        },
        Headers::new().with(keys::CORRELATION_ID, "c-7"),
    );
    assert_eq!(command.signal_type(), "things.commands:modifyFeatureProperty");
    assert_eq!(command.kind.action(), ModifyAction::Modify);

    let response = ThingModifyCommandResponse::for_command(&command, false);
    assert_eq!(response.status(), HttpStatus::NO_CONTENT);
    assert_eq!(response.headers.correlation_id(), Some("c-7"));
    assert_eq!(response.signal_type(), "things.responses:modifyFeatureProperty");

    let event = ThingEvent::from_command(&command, 12, false).unwrap();
    assert_eq!(event.revision, 12);
    assert_eq!(event.signal_type(), "things.events:featurePropertyModified");
    assert_eq!(
        event.resource,
        ThingResource::FeatureProperty("light".into(), JsonPointer::parse("/brightness").unwrap())
    );

    let created = ThingEvent::from_command(&command, 13, true).unwrap();
    assert_eq!(created.signal_type(), "things.events:featurePropertyCreated");
}

#[test]
fn test_signal_enum_delegates() {
    let command = ThingModifyCommand::new(
        thing_id(),
        ThingModifyKind::CreateThing(Thing::new(thing_id()).with_feature(Feature::new("light").unwrap())),
        Headers::new(),
    );
    let signal: Signal = command.into();

    assert_eq!(signal.family(), "ThingModifyCommand");
    assert_eq!(signal.entity_id(), Some(thing_id().entity_id()));
    assert_eq!(signal.to_string(), "things.commands:createThing [org.eclipse.ditto:lamp]");

    let relabeled = signal.with_headers(Headers::new().with(keys::CHANNEL, "live"));
    assert!(relabeled.headers().is_live_channel());
}

#[test]
fn test_invalid_values_rejected() {
    assert!(ThingId::parse("no-namespace-separator").is_err());
    assert!(JsonPointer::parse("/a//b").is_err());
    assert!(ThingEvent::new(
        thing_id(),
        twinlink_model::signal::EventAction::Deleted,
        ThingResource::Attributes,
        Some(json!({})),
        1,
    )
    .is_err());
}
