//! Every registered signal type survives encode, wire JSON and decode.

mod common;

use common::init_tracing;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use twinlink_model::headers::keys;
use twinlink_model::signal::{
    Acknowledgement, AcknowledgementLabel, EventAction, Message, MessageCommand, MessageCommandResponse,
    MessageDirection, ModifyAction, PolicyErrorResponse, PolicyModifyCommand, PolicyModifyCommandResponse,
    PolicyModifyKind, PolicyQueryCommand, PolicyQueryCommandResponse, PolicyQueryKind, PolicyResource,
    PolicyResourceKind, SearchCommandKind, SearchEventKind, SearchSubscriptionCommand, SearchSubscriptionEvent,
    ThingErrorResponse, ThingEvent, ThingModifyCommand, ThingModifyCommandResponse, ThingModifyKind,
    ThingQueryCommand, ThingQueryCommandResponse, ThingQueryKind, ThingResource, ThingResourceKind,
};
use twinlink_model::{
    Headers, HttpStatus, JsonFieldSelector, JsonPointer, PolicyId, RuntimeError, Signal, SignalInfo, Thing, ThingId,
};
use twinlink_protocol::{Adaptable, ProtocolAdapter};

const CORRELATION_ID: &str = "catalog-1";
const MODIFY_ACTIONS: [ModifyAction; 3] = [ModifyAction::Create, ModifyAction::Modify, ModifyAction::Delete];
const EVENT_ACTIONS: [EventAction; 3] = [EventAction::Created, EventAction::Modified, EventAction::Deleted];

fn headers() -> Headers {
    Headers::new().with(keys::CORRELATION_ID, CORRELATION_ID)
}

fn thing_id() -> ThingId {
    ThingId::parse("org.eclipse.ditto:lamp").unwrap()
}

fn policy_id() -> PolicyId {
    PolicyId::parse("org.eclipse.ditto:policy").unwrap()
}

fn thing_resource(kind: ThingResourceKind) -> ThingResource {
    let on = || JsonPointer::parse("/on").unwrap();
    match kind {
        ThingResourceKind::Thing => ThingResource::Thing,
        ThingResourceKind::PolicyId => ThingResource::PolicyId,
        ThingResourceKind::Definition => ThingResource::Definition,
        ThingResourceKind::Attributes => ThingResource::Attributes,
        ThingResourceKind::Attribute => ThingResource::Attribute(JsonPointer::parse("/location/room").unwrap()),
        ThingResourceKind::Features => ThingResource::Features,
        ThingResourceKind::Feature => ThingResource::Feature("light".into()),
        ThingResourceKind::FeatureDefinition => ThingResource::FeatureDefinition("light".into()),
        ThingResourceKind::FeatureProperties => ThingResource::FeatureProperties("light".into()),
        ThingResourceKind::FeatureProperty => ThingResource::FeatureProperty("light".into(), on()),
        ThingResourceKind::FeatureDesiredProperties => ThingResource::FeatureDesiredProperties("light".into()),
        ThingResourceKind::FeatureDesiredProperty => ThingResource::FeatureDesiredProperty("light".into(), on()),
    }
}

fn thing_value(kind: ThingResourceKind) -> Value {
    match kind {
        ThingResourceKind::Thing => Thing::new(thing_id())
            .with_policy_id(policy_id())
            .with_attribute("location", json!({"room": "kitchen"}))
            .to_json(),
        ThingResourceKind::PolicyId => json!("org.eclipse.ditto:policy"),
        ThingResourceKind::Definition => json!("org.eclipse.ditto:lamp:1.0.0"),
        ThingResourceKind::Attributes => json!({"location": {"room": "kitchen"}}),
        ThingResourceKind::Attribute => json!("kitchen"),
        ThingResourceKind::Features => json!({"light": {"properties": {"on": true}}}),
        ThingResourceKind::Feature => json!({"definition": ["org.eclipse.ditto:light:1.0.0"], "properties": {"on": true}}),
        ThingResourceKind::FeatureDefinition => json!(["org.eclipse.ditto:light:1.0.0"]),
        ThingResourceKind::FeatureProperties | ThingResourceKind::FeatureDesiredProperties => json!({"on": true}),
        ThingResourceKind::FeatureProperty | ThingResourceKind::FeatureDesiredProperty => json!(false),
    }
}

fn policy_resource(kind: PolicyResourceKind) -> PolicyResource {
    match kind {
        PolicyResourceKind::Policy => PolicyResource::Policy,
        PolicyResourceKind::PolicyEntries => PolicyResource::PolicyEntries,
        PolicyResourceKind::PolicyEntry => PolicyResource::PolicyEntry("DEFAULT".into()),
        PolicyResourceKind::Resources => PolicyResource::Resources("DEFAULT".into()),
        PolicyResourceKind::Resource => PolicyResource::Resource("DEFAULT".into(), "thing:/features/light".into()),
        PolicyResourceKind::Subjects => PolicyResource::Subjects("DEFAULT".into()),
        PolicyResourceKind::Subject => PolicyResource::Subject("DEFAULT".into(), "nginx:admin".into()),
    }
}

fn policy_value(kind: PolicyResourceKind) -> Value {
    let resource = json!({"grant": ["READ", "WRITE"], "revoke": []});
    let subject = json!({"type": "generated"});
    let entry = json!({
        "subjects": {"nginx:admin": subject},
        "resources": {"thing:/": resource}
    });
    match kind {
        PolicyResourceKind::Policy => json!({"policyId": "org.eclipse.ditto:policy", "entries": {"DEFAULT": entry}}),
        PolicyResourceKind::PolicyEntries => json!({"DEFAULT": entry}),
        PolicyResourceKind::PolicyEntry => entry,
        PolicyResourceKind::Resources => json!({"thing:/": resource}),
        PolicyResourceKind::Resource => resource,
        PolicyResourceKind::Subjects => json!({"nginx:admin": subject}),
        PolicyResourceKind::Subject => subject,
    }
}

fn thing_signals() -> Vec<Signal> {
    let mut signals: Vec<Signal> = Vec::new();
    for kind in ThingResourceKind::ALL {
        let resource = thing_resource(kind);
        let value = thing_value(kind);

        for action in MODIFY_ACTIONS {
            if !ThingModifyKind::supports(action, kind) {
                continue;
            }
            let written = (action != ModifyAction::Delete).then_some(&value);
            let command = ThingModifyCommand::new(
                thing_id(),
                ThingModifyKind::from_parts(action, resource.clone(), written).unwrap(),
                headers(),
            );
            signals.push(ThingModifyCommandResponse::for_command(&command, written.is_some()).into());
            signals.push(command.into());
        }

        let fields = kind
            .supports_field_selection()
            .then(|| JsonFieldSelector::parse("attributes/location,features/light").unwrap());
        let query = ThingQueryCommand::new(
            thing_id(),
            ThingQueryKind::from_parts(resource.clone(), fields).unwrap(),
            headers(),
        );
        signals.push(ThingQueryCommandResponse::for_query(&query, value.clone()).unwrap().into());
        signals.push(query.into());

        for action in EVENT_ACTIONS {
            if !ThingEvent::supports(action, kind) {
                continue;
            }
            let written = (action != EventAction::Deleted).then(|| value.clone());
            let event = ThingEvent::new(thing_id(), action, resource.clone(), written, 7)
                .unwrap()
                .with_headers(headers());
            signals.push(event.into());
        }
    }

    let error = RuntimeError::new(HttpStatus::NOT_FOUND, "things:thing.notfound", "The Thing was not found.");
    signals.push(ThingErrorResponse::new(thing_id(), error, headers()).into());
    signals
}

fn policy_signals() -> Vec<Signal> {
    let mut signals: Vec<Signal> = Vec::new();
    for kind in PolicyResourceKind::ALL {
        let resource = policy_resource(kind);
        let value = policy_value(kind);

        for action in MODIFY_ACTIONS {
            if !PolicyModifyKind::supports(action, kind) {
                continue;
            }
            let written = (action != ModifyAction::Delete).then_some(&value);
            let command = PolicyModifyCommand::new(
                policy_id(),
                PolicyModifyKind::from_parts(action, resource.clone(), written).unwrap(),
                headers(),
            );
            signals.push(PolicyModifyCommandResponse::for_command(&command, written.is_some()).into());
            signals.push(command.into());
        }

        let query = PolicyQueryCommand::new(policy_id(), PolicyQueryKind::from_resource(resource.clone()), headers());
        signals.push(query.into());
        signals.push(
            PolicyQueryCommandResponse::new(policy_id(), resource, value, headers())
                .unwrap()
                .into(),
        );
    }

    let error = RuntimeError::new(HttpStatus::FORBIDDEN, "policies:policy.notmodifiable", "Not allowed.");
    signals.push(PolicyErrorResponse::new(policy_id(), error, headers()).into());
    signals
}

fn live_signals() -> Vec<Signal> {
    let messages = [
        Message::new(MessageDirection::To, "switch/on")
            .unwrap()
            .with_payload(json!("now")),
        Message::new(MessageDirection::From, "dimmed")
            .unwrap()
            .with_feature_id("light")
            .with_payload(json!({"level": 3})),
        Message::new(MessageDirection::To, "claim").unwrap(),
    ];

    let mut signals: Vec<Signal> = Vec::new();
    for message in messages {
        signals.push(MessageCommand::new(thing_id(), message.clone(), headers()).into());
        signals.push(MessageCommandResponse::new(thing_id(), message, HttpStatus::OK, headers()).into());
    }

    let label = AcknowledgementLabel::parse("custom-ack").unwrap();
    let ack = Acknowledgement::new(label, thing_id(), HttpStatus::ACCEPTED, headers()).with_payload(json!({"ok": true}));
    signals.push(ack.into());
    signals
}

fn search_signals() -> Vec<Signal> {
    let create = SearchCommandKind::CreateSubscription {
        filter: Some("eq(attributes/location/room,\"kitchen\")".into()),
        options: Some("size(10)".into()),
        fields: Some(JsonFieldSelector::parse("thingId,attributes").unwrap()),
        namespaces: vec!["org.eclipse.ditto".into()],
    };
    let cancel = SearchCommandKind::CancelSubscription {
        subscription_id: "sub-1".into(),
    };
    let failure = RuntimeError::new(HttpStatus::BAD_REQUEST, "thing-search:filter.invalid", "Invalid filter.");
    let event = |kind: SearchEventKind| -> Signal {
        SearchSubscriptionEvent::new("sub-1", kind, headers()).unwrap().into()
    };

    vec![
        SearchSubscriptionCommand::new(create, headers()).into(),
        SearchSubscriptionCommand::request("sub-1", 25, headers()).unwrap().into(),
        SearchSubscriptionCommand::new(cancel, headers()).into(),
        event(SearchEventKind::Created),
        event(SearchEventKind::HasNextPage {
            items: json!([{"thingId": "org.eclipse.ditto:lamp"}]),
        }),
        event(SearchEventKind::Complete),
        event(SearchEventKind::Failed { error: failure }),
    ]
}

fn catalog() -> Vec<Signal> {
    let mut signals = thing_signals();
    signals.extend(policy_signals());
    signals.extend(live_signals());
    signals.extend(search_signals());
    signals
}

fn without_headers(signal: Signal) -> Signal {
    signal.with_headers(Headers::new())
}

#[test]
fn test_catalog_covers_supported_types() {
    let adapter = ProtocolAdapter::default();
    let covered: BTreeSet<String> = catalog().iter().map(|signal| signal.signal_type()).collect();
    let supported: BTreeSet<String> = adapter.supported_signal_types().into_iter().collect();

    let missing: Vec<&String> = supported.difference(&covered).collect();
    let unknown: Vec<&String> = covered.difference(&supported).collect();
    assert!(missing.is_empty(), "no fixture for {:?}", missing);
    assert!(unknown.is_empty(), "not registered: {:?}", unknown);
}

#[test]
fn test_every_signal_type_round_trips() {
    init_tracing();
    let adapter = ProtocolAdapter::default();

    for signal in catalog() {
        let adaptable = adapter
            .to_adaptable(&signal)
            .unwrap_or_else(|e| panic!("encoding {} failed: {}", signal, e));
        let wire = Adaptable::from_json_str(&adaptable.to_json_string())
            .unwrap_or_else(|e| panic!("re-reading {} failed: {}", adaptable.to_json(), e));
        let decoded = adapter
            .from_adaptable(&wire)
            .unwrap_or_else(|e| panic!("decoding {} failed: {}", adaptable.to_json(), e));

        assert_eq!(decoded.signal_type(), signal.signal_type());
        assert_eq!(decoded.headers().correlation_id(), Some(CORRELATION_ID), "{}", signal);
        assert_eq!(
            without_headers(decoded),
            without_headers(signal.clone()),
            "{}",
            adaptable.to_json()
        );
    }
}
