//! Topic path grammar: builder, parser and their agreement.

use proptest::prelude::*;
use twinlink_model::signal::AcknowledgementLabel;
use twinlink_model::{JsonPointer, PolicyId};
use twinlink_protocol::topic::CommandAction;
use twinlink_protocol::{
    Action, Adaptable, AdapterResolver, Channel, Criterion, Group, Payload, ProtocolError, SearchAction, TopicPath,
};

#[test]
fn test_builder_and_parser_agree() {
    let built = [
        TopicPath::builder("ns", "lamp").things().twin().commands().action(CommandAction::Modify).build(),
        TopicPath::builder("ns", "lamp").things().live().events().created().build(),
        TopicPath::builder("ns", "lamp").things().live().messages().subject("switch/on").build(),
        TopicPath::builder("ns", "lamp")
            .things()
            .twin()
            .acks()
            .label(&AcknowledgementLabel::parse("twin-persisted").unwrap())
            .build(),
        TopicPath::builder("ns", "policy").policies().commands().retrieve().build(),
        TopicPath::builder("ns", "policy").policies().errors().build(),
        TopicPath::search_builder().search_action(SearchAction::Next).build(),
    ];

    for topic in built {
        let topic = topic.unwrap();
        assert_eq!(TopicPath::parse(topic.path()).unwrap(), topic);
    }
}

#[test]
fn test_policy_topics_have_no_channel() {
    let policy = PolicyId::parse("ns:policy").unwrap();
    let topic = TopicPath::builder_for(policy.entity_id()).policies().commands().delete().build().unwrap();
    assert_eq!(topic.path(), "ns/policy/policies/commands/delete");
    assert_eq!(topic.channel(), Channel::None);
    assert_eq!(topic.group(), Group::Policies);

    for invalid in [
        "ns/policy/policies/twin/commands/modify",
        "ns/policy/policies/live/commands/modify",
        "ns/policy/policies/events/created",
        "ns/policy/policies/messages/hello",
    ] {
        assert!(TopicPath::parse(invalid).is_err(), "{}", invalid);
    }
}

#[test]
fn test_parse_accessors() {
    let topic = TopicPath::parse("ns/lamp/things/twin/commands/retrieve").unwrap();
    assert_eq!(topic.namespace(), "ns");
    assert_eq!(topic.id(), "lamp");
    assert_eq!(topic.criterion(), Criterion::Commands);
    assert_eq!(topic.action(), Some(Action::Retrieve));
    assert!(topic.subject().is_none());

    let message = TopicPath::parse("ns/lamp/things/live/messages/a/b/c").unwrap();
    assert_eq!(message.subject(), Some("a/b/c"));
}

#[test]
fn test_invalid_topics() {
    for invalid in [
        "",
        "ns/lamp",
        "ns/lamp/things",
        "ns/lamp/things/twin",
        "ns/lamp/things/commands/modify",
        "ns/lamp/things/twin/commands",
        "ns/lamp/things/twin/commands/update",
        "ns/lamp/things/twin/errors/extra",
        "ns/lamp/things/twin/messages",
        "ns/lamp/things/twin/acks/x",
        "ns/lamp/things/twin/search/subscribe",
        "ns//things/twin/commands/modify",
    ] {
        let err = TopicPath::parse(invalid).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownTopicPath { .. }), "{}", invalid);
    }
}

fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("ns".to_string()),
        Just("_".to_string()),
        Just("things".to_string()),
        Just("policies".to_string()),
        Just("twin".to_string()),
        Just("live".to_string()),
        Just("commands".to_string()),
        Just("events".to_string()),
        Just("messages".to_string()),
        Just("errors".to_string()),
        Just("acks".to_string()),
        Just("search".to_string()),
        Just("modify".to_string()),
        Just("retrieve".to_string()),
        Just("created".to_string()),
        Just("subscribe".to_string()),
        Just("next".to_string()),
        Just(String::new()),
        "[a-z0-9-]{1,8}",
    ]
}

proptest! {
    /// Every input either parses into a topic that re-renders to itself or
    /// fails with `UnknownTopicPath`; parsed topics always resolve to an
    /// adapter or fail with the same typed error.
    #[test]
    fn test_grammar_is_total(segments in prop::collection::vec(segment(), 0..8)) {
        let input = segments.join("/");
        match TopicPath::parse(&input) {
            Ok(topic) => {
                prop_assert_eq!(topic.path(), input.as_str());
                let adaptable = Adaptable::new(topic, Payload::builder(JsonPointer::root()).build(), None);
                let resolver = AdapterResolver::default();
                if let Err(err) = resolver.resolve(&adaptable) {
                    prop_assert!(matches!(err, ProtocolError::UnknownTopicPath { .. }), "expected UnknownTopicPath");
                }
            }
            Err(err) => prop_assert!(matches!(err, ProtocolError::UnknownTopicPath { .. }), "expected UnknownTopicPath"),
        }
    }
}
