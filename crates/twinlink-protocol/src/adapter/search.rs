//! Adapters for streaming search subscriptions, `_/_/things/twin/search/<action>`.
//!
//! | search action | signal                    |
//! |---------------|---------------------------|
//! | subscribe     | createSubscription        |
//! | request       | requestFromSubscription   |
//! | cancel        | cancelSubscription        |
//! | created       | subscriptionCreated       |
//! | next          | subscriptionHasNextPage   |
//! | complete      | subscriptionComplete      |
//! | failed        | subscriptionFailed        |

use super::{required_value, unknown_topic, Adapter, AdapterContext, MappingStrategies};
use crate::adaptable::Adaptable;
use crate::error::{ProtocolError, Result};
use crate::payload::Payload;
use crate::topic::{Channel, SearchAction, TopicPath};
use serde_json::Value;
use twinlink_model::signal::{SearchCommandKind, SearchEventKind, SearchSubscriptionCommand, SearchSubscriptionEvent};
use twinlink_model::{Headers, JsonObject, JsonPointer, ModelError, RuntimeError};

const THING_SEARCH: &str = "thing-search";

mod value_fields {
    pub const FILTER: &str = "filter";
    pub const OPTIONS: &str = "options";
    pub const NAMESPACES: &str = "namespaces";
    pub const SUBSCRIPTION_ID: &str = "subscriptionId";
    pub const DEMAND: &str = "demand";
    pub const ITEMS: &str = "items";
    pub const ERROR: &str = "error";
}

fn command_key(name: &str) -> String {
    format!("{}.commands:{}", THING_SEARCH, name)
}

fn event_key(name: &str) -> String {
    format!("{}.events:{}", THING_SEARCH, name)
}

fn search_action(adaptable: &Adaptable) -> Result<SearchAction> {
    adaptable
        .topic_path()
        .search_action()
        .ok_or_else(|| unknown_topic(adaptable))
}

fn search_topic(action: SearchAction, channel: Channel) -> Result<TopicPath> {
    if channel != Channel::Twin {
        return Err(ProtocolError::unknown_channel(channel.as_str(), &Headers::new()));
    }
    TopicPath::search_builder().search_action(action).build()
}

fn root_payload(value: JsonObject) -> Payload {
    Payload::builder(JsonPointer::root())
        .with_value(Value::Object(value))
        .build()
}

fn invalid_value(message: impl std::fmt::Display) -> ProtocolError {
    ModelError::json("thing search payload", message).into()
}

fn value_object(adaptable: &Adaptable) -> Result<&JsonObject> {
    required_value(adaptable)?
        .as_object()
        .ok_or_else(|| invalid_value("value must be an object"))
}

fn optional_string(object: &JsonObject, field: &str) -> Result<Option<String>> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(invalid_value(format!("'{}' must be a string, got {}", field, other))),
    }
}

fn string_list(object: &JsonObject, field: &str) -> Result<Vec<String>> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid_value(format!("'{}' must only hold strings, got {}", field, item)))
            })
            .collect(),
        Some(other) => Err(invalid_value(format!("'{}' must be an array, got {}", field, other))),
    }
}

fn subscription_id(object: &JsonObject) -> Result<String> {
    optional_string(object, value_fields::SUBSCRIPTION_ID)?
        .ok_or_else(|| ProtocolError::missing_field(value_fields::SUBSCRIPTION_ID, &Headers::new()))
}

/// `thing-search.commands:*`.
pub struct SearchCommandAdapter {
    context: AdapterContext,
    strategies: MappingStrategies<SearchSubscriptionCommand>,
}

impl SearchCommandAdapter {
    pub fn new(context: AdapterContext) -> Self {
        let mut strategies: MappingStrategies<SearchSubscriptionCommand> = MappingStrategies::new();
        strategies.insert(command_key("createSubscription"), create_subscription);
        strategies.insert(command_key("requestFromSubscription"), request_from_subscription);
        strategies.insert(command_key("cancelSubscription"), cancel_subscription);
        Self { context, strategies }
    }
}

fn create_subscription(adaptable: &Adaptable) -> Result<SearchSubscriptionCommand> {
    let empty = JsonObject::new();
    let object = match adaptable.payload().value() {
        Some(value) => value
            .as_object()
            .ok_or_else(|| invalid_value("value must be an object"))?,
        None => &empty,
    };

    let kind = SearchCommandKind::CreateSubscription {
        filter: optional_string(object, value_fields::FILTER)?,
        options: optional_string(object, value_fields::OPTIONS)?,
        fields: adaptable.payload().fields().cloned(),
        namespaces: string_list(object, value_fields::NAMESPACES)?,
    };
    Ok(SearchSubscriptionCommand::new(kind, adaptable.headers_or_empty()))
}

fn request_from_subscription(adaptable: &Adaptable) -> Result<SearchSubscriptionCommand> {
    let object = value_object(adaptable)?;
    let demand = match object.get(value_fields::DEMAND) {
        Some(demand) => demand
            .as_i64()
            .ok_or_else(|| invalid_value(format!("'demand' must be an integer, got {}", demand)))?,
        None => return Err(ProtocolError::missing_field(value_fields::DEMAND, &Headers::new())),
    };
    Ok(SearchSubscriptionCommand::request(
        subscription_id(object)?,
        demand,
        adaptable.headers_or_empty(),
    )?)
}

fn cancel_subscription(adaptable: &Adaptable) -> Result<SearchSubscriptionCommand> {
    let kind = SearchCommandKind::CancelSubscription {
        subscription_id: subscription_id(value_object(adaptable)?)?,
    };
    Ok(SearchSubscriptionCommand::new(kind, adaptable.headers_or_empty()))
}

impl Adapter for SearchCommandAdapter {
    type Signal = SearchSubscriptionCommand;

    fn context(&self) -> &AdapterContext {
        &self.context
    }

    fn strategies(&self) -> &MappingStrategies<SearchSubscriptionCommand> {
        &self.strategies
    }

    fn mapping_key(&self, adaptable: &Adaptable) -> Result<String> {
        let name = match search_action(adaptable)? {
            SearchAction::Subscribe => "createSubscription",
            SearchAction::Request => "requestFromSubscription",
            SearchAction::Cancel => "cancelSubscription",
            _ => return Err(unknown_topic(adaptable)),
        };
        Ok(command_key(name))
    }

    fn encode(&self, command: &SearchSubscriptionCommand, channel: Channel) -> Result<(TopicPath, Payload)> {
        let mut value = JsonObject::new();
        let (action, fields) = match &command.kind {
            SearchCommandKind::CreateSubscription {
                filter,
                options,
                fields,
                namespaces,
            } => {
                if let Some(filter) = filter {
                    value.insert(value_fields::FILTER.to_string(), Value::from(filter.as_str()));
                }
                if let Some(options) = options {
                    value.insert(value_fields::OPTIONS.to_string(), Value::from(options.as_str()));
                }
                if !namespaces.is_empty() {
                    value.insert(value_fields::NAMESPACES.to_string(), Value::from(namespaces.clone()));
                }
                (SearchAction::Subscribe, fields.clone())
            }
            SearchCommandKind::RequestFromSubscription {
                subscription_id,
                demand,
            } => {
                value.insert(value_fields::SUBSCRIPTION_ID.to_string(), Value::from(subscription_id.as_str()));
                value.insert(value_fields::DEMAND.to_string(), Value::from(*demand));
                (SearchAction::Request, None)
            }
            SearchCommandKind::CancelSubscription { subscription_id } => {
                value.insert(value_fields::SUBSCRIPTION_ID.to_string(), Value::from(subscription_id.as_str()));
                (SearchAction::Cancel, None)
            }
        };

        let topic = search_topic(action, channel)?;
        let payload = root_payload(value).to_builder().with_optional_fields(fields).build();
        Ok((topic, payload))
    }
}

/// `thing-search.events:*`.
pub struct SearchEventAdapter {
    context: AdapterContext,
    strategies: MappingStrategies<SearchSubscriptionEvent>,
}

impl SearchEventAdapter {
    pub fn new(context: AdapterContext) -> Self {
        let mut strategies: MappingStrategies<SearchSubscriptionEvent> = MappingStrategies::new();
        strategies.insert(event_key("subscriptionCreated"), subscription_created);
        strategies.insert(event_key("subscriptionHasNextPage"), subscription_has_next_page);
        strategies.insert(event_key("subscriptionComplete"), subscription_complete);
        strategies.insert(event_key("subscriptionFailed"), subscription_failed);
        Self { context, strategies }
    }
}

fn search_event(adaptable: &Adaptable, kind: SearchEventKind) -> Result<SearchSubscriptionEvent> {
    let id = subscription_id(value_object(adaptable)?)?;
    Ok(SearchSubscriptionEvent::new(id, kind, adaptable.headers_or_empty())?)
}

fn subscription_created(adaptable: &Adaptable) -> Result<SearchSubscriptionEvent> {
    search_event(adaptable, SearchEventKind::Created)
}

fn subscription_has_next_page(adaptable: &Adaptable) -> Result<SearchSubscriptionEvent> {
    let items = value_object(adaptable)?
        .get(value_fields::ITEMS)
        .cloned()
        .ok_or_else(|| ProtocolError::missing_field(value_fields::ITEMS, &Headers::new()))?;
    search_event(adaptable, SearchEventKind::HasNextPage { items })
}

fn subscription_complete(adaptable: &Adaptable) -> Result<SearchSubscriptionEvent> {
    search_event(adaptable, SearchEventKind::Complete)
}

fn subscription_failed(adaptable: &Adaptable) -> Result<SearchSubscriptionEvent> {
    let error = value_object(adaptable)?
        .get(value_fields::ERROR)
        .ok_or_else(|| ProtocolError::missing_field(value_fields::ERROR, &Headers::new()))?;
    let error = RuntimeError::from_json(error)?;
    search_event(adaptable, SearchEventKind::Failed { error })
}

impl Adapter for SearchEventAdapter {
    type Signal = SearchSubscriptionEvent;

    fn context(&self) -> &AdapterContext {
        &self.context
    }

    fn strategies(&self) -> &MappingStrategies<SearchSubscriptionEvent> {
        &self.strategies
    }

    fn mapping_key(&self, adaptable: &Adaptable) -> Result<String> {
        let name = match search_action(adaptable)? {
            SearchAction::Created => "subscriptionCreated",
            SearchAction::Next => "subscriptionHasNextPage",
            SearchAction::Complete => "subscriptionComplete",
            SearchAction::Failed => "subscriptionFailed",
            _ => return Err(unknown_topic(adaptable)),
        };
        Ok(event_key(name))
    }

    fn encode(&self, event: &SearchSubscriptionEvent, channel: Channel) -> Result<(TopicPath, Payload)> {
        let mut value = JsonObject::new();
        value.insert(
            value_fields::SUBSCRIPTION_ID.to_string(),
            Value::from(event.subscription_id.as_str()),
        );
        let action = match &event.kind {
            SearchEventKind::Created => SearchAction::Created,
            SearchEventKind::HasNextPage { items } => {
                value.insert(value_fields::ITEMS.to_string(), items.clone());
                SearchAction::Next
            }
            SearchEventKind::Complete => SearchAction::Complete,
            SearchEventKind::Failed { error } => {
                value.insert(value_fields::ERROR.to_string(), error.to_json());
                SearchAction::Failed
            }
        };
        Ok((search_topic(action, channel)?, root_payload(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use twinlink_model::{HttpStatus, JsonFieldSelector, SignalInfo};

    #[test]
    fn test_create_subscription_round_trip() {
        let adapter = SearchCommandAdapter::new(AdapterContext::default());
        let command = SearchSubscriptionCommand::new(
            SearchCommandKind::CreateSubscription {
                filter: Some("eq(attributes/room,\"kitchen\")".into()),
                options: Some("size(10)".into()),
                fields: Some(JsonFieldSelector::parse("thingId,attributes").unwrap()),
                namespaces: vec!["ns".into()],
            },
            Headers::new(),
        );

        let encoded = adapter.to_adaptable(&command, Channel::Twin).unwrap();
        assert_eq!(encoded.topic_path().path(), "_/_/things/twin/search/subscribe");
        assert_eq!(encoded.payload().value().unwrap()["namespaces"], json!(["ns"]));

        let decoded = adapter.from_adaptable(&encoded).unwrap();
        assert_eq!(decoded.kind, command.kind);
        assert_eq!(decoded.signal_type(), "thing-search.commands:createSubscription");
    }

    #[test]
    fn test_request_needs_positive_demand() {
        let adapter = SearchCommandAdapter::new(AdapterContext::default());
        let adaptable = Adaptable::from_json(&json!({
            "topic": "_/_/things/twin/search/request",
            "path": "/",
            "value": {"subscriptionId": "sub-1", "demand": 0}
        }))
        .unwrap();
        assert!(matches!(
            adapter.from_adaptable(&adaptable).unwrap_err(),
            ProtocolError::InvalidModel { .. }
        ));
    }

    #[test]
    fn test_malformed_subscribe_rejected() {
        let adapter = SearchCommandAdapter::new(AdapterContext::default());
        let subscribe = |value: serde_json::Value| {
            Adaptable::from_json(&json!({
                "topic": "_/_/things/twin/search/subscribe",
                "path": "/",
                "value": value
            }))
            .unwrap()
        };

        for value in [
            json!({"filter": 42}),
            json!({"options": false}),
            json!({"namespaces": ["ns", 7]}),
            json!({"namespaces": "ns"}),
            json!("junk"),
        ] {
            let err = adapter.from_adaptable(&subscribe(value.clone())).unwrap_err();
            assert!(matches!(err, ProtocolError::InvalidModel { .. }), "{} gave {:?}", value, err);
        }

        let decoded = adapter.from_adaptable(&subscribe(json!({"namespaces": ["ns"]}))).unwrap();
        assert_eq!(
            decoded.kind,
            SearchCommandKind::CreateSubscription {
                filter: None,
                options: None,
                fields: None,
                namespaces: vec!["ns".into()],
            }
        );
    }

    #[test]
    fn test_subscription_id_needs_object_value() {
        let adapter = SearchCommandAdapter::new(AdapterContext::default());
        let adaptable = Adaptable::from_json(&json!({
            "topic": "_/_/things/twin/search/cancel",
            "path": "/",
            "value": ["sub-1"]
        }))
        .unwrap();
        assert!(matches!(
            adapter.from_adaptable(&adaptable).unwrap_err(),
            ProtocolError::InvalidModel { .. }
        ));
    }

    #[test]
    fn test_search_is_twin_only() {
        let adapter = SearchCommandAdapter::new(AdapterContext::default());
        let command = SearchSubscriptionCommand::new(
            SearchCommandKind::CancelSubscription {
                subscription_id: "sub-1".into(),
            },
            Headers::new(),
        );
        let err = adapter.to_adaptable(&command, Channel::Live).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownChannel { .. }));
    }

    #[test]
    fn test_failed_event_round_trip() {
        let adapter = SearchEventAdapter::new(AdapterContext::default());
        let error = RuntimeError::new(HttpStatus::BAD_REQUEST, "thing-search:filter.invalid", "bad filter");
        let event =
            SearchSubscriptionEvent::new("sub-1", SearchEventKind::Failed { error }, Headers::new()).unwrap();

        let encoded = adapter.to_adaptable(&event, Channel::Twin).unwrap();
        assert_eq!(encoded.topic_path().path(), "_/_/things/twin/search/failed");

        let decoded = adapter.from_adaptable(&encoded).unwrap();
        assert_eq!(decoded.subscription_id, "sub-1");
        assert_eq!(decoded.kind, event.kind);
    }

    #[test]
    fn test_command_action_on_event_adapter() {
        let adapter = SearchEventAdapter::new(AdapterContext::default());
        let adaptable = Adaptable::from_json(&json!({
            "topic": "_/_/things/twin/search/subscribe",
            "path": "/"
        }))
        .unwrap();
        assert!(matches!(
            adapter.from_adaptable(&adaptable).unwrap_err(),
            ProtocolError::UnknownTopicPath { .. }
        ));
    }
}
