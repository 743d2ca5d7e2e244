//! Selection of the adapter responsible for an adaptable.

use crate::adaptable::Adaptable;
use crate::adapter::{
    AcknowledgementAdapter, AdapterContext, MessageCommandAdapter, MessageCommandResponseAdapter,
    PolicyErrorResponseAdapter, PolicyModifyCommandAdapter, PolicyModifyCommandResponseAdapter,
    PolicyQueryCommandAdapter, PolicyQueryCommandResponseAdapter, SearchCommandAdapter, SearchEventAdapter,
    SignalAdapter, ThingErrorResponseAdapter, ThingEventAdapter, ThingModifyCommandAdapter,
    ThingModifyCommandResponseAdapter, ThingQueryCommandAdapter, ThingQueryCommandResponseAdapter,
};
use crate::error::{ProtocolError, Result};
use crate::topic::{Action, Criterion, Group};
use tracing::{debug, warn};

/// Status codes from here on mark an error response.
const ERROR_STATUS: u16 = 400;

/// Owns one adapter per signal family, all sharing one context.
pub struct AdapterResolver {
    pub(crate) thing_modify_commands: ThingModifyCommandAdapter,
    pub(crate) thing_query_commands: ThingQueryCommandAdapter,
    pub(crate) thing_modify_responses: ThingModifyCommandResponseAdapter,
    pub(crate) thing_query_responses: ThingQueryCommandResponseAdapter,
    pub(crate) thing_events: ThingEventAdapter,
    pub(crate) thing_errors: ThingErrorResponseAdapter,
    pub(crate) message_commands: MessageCommandAdapter,
    pub(crate) message_responses: MessageCommandResponseAdapter,
    pub(crate) acknowledgements: AcknowledgementAdapter,
    pub(crate) policy_modify_commands: PolicyModifyCommandAdapter,
    pub(crate) policy_query_commands: PolicyQueryCommandAdapter,
    pub(crate) policy_modify_responses: PolicyModifyCommandResponseAdapter,
    pub(crate) policy_query_responses: PolicyQueryCommandResponseAdapter,
    pub(crate) policy_errors: PolicyErrorResponseAdapter,
    pub(crate) search_commands: SearchCommandAdapter,
    pub(crate) search_events: SearchEventAdapter,
}

/// Command-topic adapters of one group.
struct CommandAdapters<'a> {
    modify: &'a dyn SignalAdapter,
    query: &'a dyn SignalAdapter,
    modify_response: &'a dyn SignalAdapter,
    query_response: &'a dyn SignalAdapter,
    error: &'a dyn SignalAdapter,
}

impl AdapterResolver {
    pub fn new(context: AdapterContext) -> Self {
        Self {
            thing_modify_commands: ThingModifyCommandAdapter::new(context.clone()),
            thing_query_commands: ThingQueryCommandAdapter::new(context.clone()),
            thing_modify_responses: ThingModifyCommandResponseAdapter::new(context.clone()),
            thing_query_responses: ThingQueryCommandResponseAdapter::new(context.clone()),
            thing_events: ThingEventAdapter::new(context.clone()),
            thing_errors: ThingErrorResponseAdapter::new(context.clone()),
            message_commands: MessageCommandAdapter::new(context.clone()),
            message_responses: MessageCommandResponseAdapter::new(context.clone()),
            acknowledgements: AcknowledgementAdapter::new(context.clone()),
            policy_modify_commands: PolicyModifyCommandAdapter::new(context.clone()),
            policy_query_commands: PolicyQueryCommandAdapter::new(context.clone()),
            policy_modify_responses: PolicyModifyCommandResponseAdapter::new(context.clone()),
            policy_query_responses: PolicyQueryCommandResponseAdapter::new(context.clone()),
            policy_errors: PolicyErrorResponseAdapter::new(context.clone()),
            search_commands: SearchCommandAdapter::new(context.clone()),
            search_events: SearchEventAdapter::new(context),
        }
    }

    /// The adapter decoding `adaptable`, chosen by group, criterion, action and status.
    pub fn resolve(&self, adaptable: &Adaptable) -> Result<&dyn SignalAdapter> {
        let topic = adaptable.topic_path();
        let has_status = adaptable.payload().status().is_some();

        let adapter: Option<&dyn SignalAdapter> = match (topic.group(), topic.criterion()) {
            (Group::Things, Criterion::Commands) => Some(Self::command_adapter(adaptable, self.thing_commands())),
            (Group::Things, Criterion::Events) => Some(&self.thing_events),
            (Group::Things, Criterion::Errors) => Some(&self.thing_errors),
            (Group::Things, Criterion::Messages) if has_status => Some(&self.message_responses),
            (Group::Things, Criterion::Messages) => Some(&self.message_commands),
            (Group::Things, Criterion::Acks) => Some(&self.acknowledgements),
            (Group::Things, Criterion::Search) => match topic.search_action() {
                Some(action) if action.is_command() => Some(&self.search_commands),
                Some(_) => Some(&self.search_events),
                None => None,
            },
            (Group::Policies, Criterion::Commands) => {
                Some(Self::command_adapter(adaptable, self.policy_commands()))
            }
            (Group::Policies, Criterion::Errors) => Some(&self.policy_errors),
            (Group::Policies, _) => None,
        };

        match adapter {
            Some(adapter) => {
                debug!(topic = %topic, "Resolved adapter");
                Ok(adapter)
            }
            None => {
                warn!(topic = %topic, "No adapter for topic");
                Err(ProtocolError::unknown_topic_path(
                    topic.path(),
                    &adaptable.headers_or_empty(),
                ))
            }
        }
    }

    fn command_adapter<'a>(adaptable: &Adaptable, adapters: CommandAdapters<'a>) -> &'a dyn SignalAdapter {
        let retrieve = adaptable.topic_path().action() == Some(Action::Retrieve);
        match adaptable.payload().status() {
            Some(status) if status.code() >= ERROR_STATUS => adapters.error,
            Some(_) if retrieve => adapters.query_response,
            Some(_) => adapters.modify_response,
            None if retrieve => adapters.query,
            None => adapters.modify,
        }
    }

    fn thing_commands(&self) -> CommandAdapters<'_> {
        CommandAdapters {
            modify: &self.thing_modify_commands,
            query: &self.thing_query_commands,
            modify_response: &self.thing_modify_responses,
            query_response: &self.thing_query_responses,
            error: &self.thing_errors,
        }
    }

    fn policy_commands(&self) -> CommandAdapters<'_> {
        CommandAdapters {
            modify: &self.policy_modify_commands,
            query: &self.policy_query_commands,
            modify_response: &self.policy_modify_responses,
            query_response: &self.policy_query_responses,
            error: &self.policy_errors,
        }
    }

    /// Every adapter, in a fixed order.
    pub fn adapters(&self) -> Vec<&dyn SignalAdapter> {
        vec![
            &self.thing_modify_commands,
            &self.thing_query_commands,
            &self.thing_modify_responses,
            &self.thing_query_responses,
            &self.thing_events,
            &self.thing_errors,
            &self.message_commands,
            &self.message_responses,
            &self.acknowledgements,
            &self.policy_modify_commands,
            &self.policy_query_commands,
            &self.policy_modify_responses,
            &self.policy_query_responses,
            &self.policy_errors,
            &self.search_commands,
            &self.search_events,
        ]
    }
}

impl Default for AdapterResolver {
    fn default() -> Self {
        Self::new(AdapterContext::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use twinlink_model::SignalInfo;

    fn resolve_types(envelope: serde_json::Value) -> Result<Vec<String>> {
        let resolver = AdapterResolver::default();
        let adaptable = Adaptable::from_json(&envelope).unwrap();
        resolver.resolve(&adaptable).map(|adapter| adapter.signal_types())
    }

    #[test]
    fn test_commands_by_status() {
        let command = resolve_types(json!({"topic": "ns/lamp/things/twin/commands/retrieve", "path": "/"})).unwrap();
        assert!(command.contains(&"things.commands:retrieveThing".to_string()));

        let response =
            resolve_types(json!({"topic": "ns/lamp/things/twin/commands/retrieve", "path": "/", "status": 200}))
                .unwrap();
        assert!(response.contains(&"things.responses:retrieveThing".to_string()));

        let error =
            resolve_types(json!({"topic": "ns/lamp/things/twin/commands/retrieve", "path": "/", "status": 404}))
                .unwrap();
        assert_eq!(error, vec!["things.errors:error".to_string()]);
    }

    #[test]
    fn test_events_and_messages() {
        let resolver = AdapterResolver::default();
        let adaptable = Adaptable::from_json(&json!({
            "topic": "ns/lamp/things/twin/events/created",
            "path": "/"
        }))
        .unwrap();
        assert!(resolver.resolve(&adaptable).is_ok());

        let messages =
            resolve_types(json!({"topic": "ns/lamp/things/live/messages/hi", "path": "/inbox/messages/hi"})).unwrap();
        assert!(messages.contains(&"messages.commands:thingMessage".to_string()));
    }

    #[test]
    fn test_resolved_adapter_decodes() {
        let resolver = AdapterResolver::default();
        let adaptable = Adaptable::from_json(&json!({
            "topic": "_/_/things/twin/search/next",
            "path": "/",
            "value": {"subscriptionId": "sub-1", "items": []}
        }))
        .unwrap();
        let signal = resolver.resolve(&adaptable).unwrap().decode(&adaptable).unwrap();
        assert_eq!(signal.signal_type(), "thing-search.events:subscriptionHasNextPage");
    }

    #[test]
    fn test_adapters_cover_every_family() {
        assert_eq!(AdapterResolver::default().adapters().len(), 16);
    }
}
