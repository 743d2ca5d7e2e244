//! Adapters for Thing commands, responses, events and errors.

use super::{
    insert_all, modify_action, required_status, required_value, retrieve_action, thing_id_of, things_topic,
    topic_action, unknown_topic, Adapter, AdapterContext, MappingStrategies,
};
use crate::adaptable::{fields, Adaptable};
use crate::error::{ProtocolError, Result};
use crate::path_matcher::THING_PATHS;
use crate::payload::Payload;
use crate::topic::{Channel, CommandAction, TopicPath};
use twinlink_model::signal::things::THINGS;
use twinlink_model::signal::{
    command_name, event_name, EventAction, ModifyAction, ThingErrorResponse, ThingEvent, ThingModifyCommand,
    ThingModifyCommandResponse, ThingModifyKind, ThingQueryCommand, ThingQueryCommandResponse, ThingQueryKind,
    ThingResource, ThingResourceKind, RETRIEVE,
};
use twinlink_model::{Headers, HttpStatus, JsonPointer, RuntimeError};

const MODIFY_ACTIONS: [ModifyAction; 3] = [ModifyAction::Create, ModifyAction::Modify, ModifyAction::Delete];
const EVENT_ACTIONS: [EventAction; 3] = [EventAction::Created, EventAction::Modified, EventAction::Deleted];

fn command_key(criterion: &str, action: &str, kind: ThingResourceKind) -> String {
    format!("{}.{}:{}", THINGS, criterion, command_name(action, kind.as_str()))
}

fn event_key(action: EventAction, kind: ThingResourceKind) -> String {
    format!("{}.events:{}", THINGS, event_name(kind.as_str(), action))
}

fn resource_kind(adaptable: &Adaptable) -> Result<ThingResourceKind> {
    THING_PATHS.matches(adaptable.payload().path().pointer())
}

fn resource(adaptable: &Adaptable) -> Result<ThingResource> {
    let path = adaptable.payload().path().pointer();
    let kind = THING_PATHS.matches(path)?;
    Ok(ThingResource::from_path(kind, path)?)
}

/// `things.commands:<action><Kind>` for create, modify and delete.
pub struct ThingModifyCommandAdapter {
    context: AdapterContext,
    strategies: MappingStrategies<ThingModifyCommand>,
}

impl ThingModifyCommandAdapter {
    pub fn new(context: AdapterContext) -> Self {
        let mut strategies: MappingStrategies<ThingModifyCommand> = MappingStrategies::new();
        for action in MODIFY_ACTIONS {
            let keys = ThingResourceKind::ALL
                .into_iter()
                .filter(|kind| ThingModifyKind::supports(action, *kind))
                .map(|kind| command_key("commands", action.as_str(), kind));
            insert_all(&mut strategies, keys, modify_command);
        }
        Self { context, strategies }
    }
}

fn modify_command(adaptable: &Adaptable) -> Result<ThingModifyCommand> {
    let action = modify_action(adaptable)?;
    let value = adaptable.payload().value();
    if action != ModifyAction::Delete && value.is_none() {
        return Err(ProtocolError::missing_field(fields::VALUE, &Headers::new()));
    }
    let kind = ThingModifyKind::from_parts(action, resource(adaptable)?, value)?;
    Ok(ThingModifyCommand::new(thing_id_of(adaptable)?, kind, adaptable.headers_or_empty()))
}

impl Adapter for ThingModifyCommandAdapter {
    type Signal = ThingModifyCommand;

    fn context(&self) -> &AdapterContext {
        &self.context
    }

    fn strategies(&self) -> &MappingStrategies<ThingModifyCommand> {
        &self.strategies
    }

    fn mapping_key(&self, adaptable: &Adaptable) -> Result<String> {
        let action = modify_action(adaptable)?;
        Ok(command_key("commands", action.as_str(), resource_kind(adaptable)?))
    }

    fn encode(&self, command: &ThingModifyCommand, channel: Channel) -> Result<(TopicPath, Payload)> {
        let action = CommandAction::from(command.kind.action());
        let topic = things_topic!(command.thing_id.entity_id(), channel, b => b.commands().action(action).build())?;
        let payload = Payload::builder(command.kind.resource().path())
            .with_optional_value(command.kind.value())
            .build();
        Ok((topic, payload))
    }
}

/// `things.commands:retrieve<Kind>`.
pub struct ThingQueryCommandAdapter {
    context: AdapterContext,
    strategies: MappingStrategies<ThingQueryCommand>,
}

impl ThingQueryCommandAdapter {
    pub fn new(context: AdapterContext) -> Self {
        let mut strategies: MappingStrategies<ThingQueryCommand> = MappingStrategies::new();
        let keys = ThingResourceKind::ALL
            .into_iter()
            .map(|kind| command_key("commands", RETRIEVE, kind));
        insert_all(&mut strategies, keys, query_command);
        Self { context, strategies }
    }
}

fn query_command(adaptable: &Adaptable) -> Result<ThingQueryCommand> {
    let kind = ThingQueryKind::from_parts(resource(adaptable)?, adaptable.payload().fields().cloned())?;
    Ok(ThingQueryCommand::new(thing_id_of(adaptable)?, kind, adaptable.headers_or_empty()))
}

impl Adapter for ThingQueryCommandAdapter {
    type Signal = ThingQueryCommand;

    fn context(&self) -> &AdapterContext {
        &self.context
    }

    fn strategies(&self) -> &MappingStrategies<ThingQueryCommand> {
        &self.strategies
    }

    fn mapping_key(&self, adaptable: &Adaptable) -> Result<String> {
        retrieve_action(adaptable)?;
        Ok(command_key("commands", RETRIEVE, resource_kind(adaptable)?))
    }

    fn encode(&self, query: &ThingQueryCommand, channel: Channel) -> Result<(TopicPath, Payload)> {
        let topic = things_topic!(query.thing_id.entity_id(), channel, b => b.commands().retrieve().build())?;
        let payload = Payload::builder(query.kind.resource().path())
            .with_optional_fields(query.kind.fields().cloned())
            .build();
        Ok((topic, payload))
    }
}

/// `things.responses:<action><Kind>`. Status 201 marks a created resource.
pub struct ThingModifyCommandResponseAdapter {
    context: AdapterContext,
    strategies: MappingStrategies<ThingModifyCommandResponse>,
}

impl ThingModifyCommandResponseAdapter {
    pub fn new(context: AdapterContext) -> Self {
        let mut strategies: MappingStrategies<ThingModifyCommandResponse> = MappingStrategies::new();
        for action in MODIFY_ACTIONS {
            let keys = ThingResourceKind::ALL
                .into_iter()
                .filter(|kind| ThingModifyKind::supports(action, *kind))
                .map(|kind| command_key("responses", action.as_str(), kind));
            insert_all(&mut strategies, keys, modify_response);
        }
        Self { context, strategies }
    }
}

fn modify_response(adaptable: &Adaptable) -> Result<ThingModifyCommandResponse> {
    let action = modify_action(adaptable)?;
    let thing_id = thing_id_of(adaptable)?;
    let headers = adaptable.headers_or_empty();
    let resource = resource(adaptable)?;

    let response = if required_status(adaptable)? == HttpStatus::CREATED {
        let value = required_value(adaptable)?.clone();
        ThingModifyCommandResponse::created(thing_id, action, resource, value, headers)?
    } else {
        ThingModifyCommandResponse::completed(thing_id, action, resource, headers)?
    };
    Ok(response)
}

impl Adapter for ThingModifyCommandResponseAdapter {
    type Signal = ThingModifyCommandResponse;

    fn context(&self) -> &AdapterContext {
        &self.context
    }

    fn strategies(&self) -> &MappingStrategies<ThingModifyCommandResponse> {
        &self.strategies
    }

    fn mapping_key(&self, adaptable: &Adaptable) -> Result<String> {
        let action = modify_action(adaptable)?;
        Ok(command_key("responses", action.as_str(), resource_kind(adaptable)?))
    }

    fn encode(&self, response: &ThingModifyCommandResponse, channel: Channel) -> Result<(TopicPath, Payload)> {
        let action = CommandAction::from(response.action);
        let topic = things_topic!(response.thing_id.entity_id(), channel, b => b.commands().action(action).build())?;
        let payload = Payload::builder(response.resource.path())
            .with_optional_value(response.created.clone())
            .with_status(response.status())
            .build();
        Ok((topic, payload))
    }
}

/// `things.responses:retrieve<Kind>`.
pub struct ThingQueryCommandResponseAdapter {
    context: AdapterContext,
    strategies: MappingStrategies<ThingQueryCommandResponse>,
}

impl ThingQueryCommandResponseAdapter {
    pub fn new(context: AdapterContext) -> Self {
        let mut strategies: MappingStrategies<ThingQueryCommandResponse> = MappingStrategies::new();
        let keys = ThingResourceKind::ALL
            .into_iter()
            .map(|kind| command_key("responses", RETRIEVE, kind));
        insert_all(&mut strategies, keys, query_response);
        Self { context, strategies }
    }
}

fn query_response(adaptable: &Adaptable) -> Result<ThingQueryCommandResponse> {
    let value = required_value(adaptable)?.clone();
    Ok(ThingQueryCommandResponse::new(
        thing_id_of(adaptable)?,
        resource(adaptable)?,
        value,
        adaptable.headers_or_empty(),
    )?)
}

impl Adapter for ThingQueryCommandResponseAdapter {
    type Signal = ThingQueryCommandResponse;

    fn context(&self) -> &AdapterContext {
        &self.context
    }

    fn strategies(&self) -> &MappingStrategies<ThingQueryCommandResponse> {
        &self.strategies
    }

    fn mapping_key(&self, adaptable: &Adaptable) -> Result<String> {
        retrieve_action(adaptable)?;
        Ok(command_key("responses", RETRIEVE, resource_kind(adaptable)?))
    }

    fn encode(&self, response: &ThingQueryCommandResponse, channel: Channel) -> Result<(TopicPath, Payload)> {
        let topic = things_topic!(response.thing_id.entity_id(), channel, b => b.commands().retrieve().build())?;
        let payload = Payload::builder(response.resource.path())
            .with_value(response.value.clone())
            .with_status(response.status())
            .build();
        Ok((topic, payload))
    }
}

/// `things.events:<kind><Action>`.
pub struct ThingEventAdapter {
    context: AdapterContext,
    strategies: MappingStrategies<ThingEvent>,
}

impl ThingEventAdapter {
    pub fn new(context: AdapterContext) -> Self {
        let mut strategies: MappingStrategies<ThingEvent> = MappingStrategies::new();
        for action in EVENT_ACTIONS {
            let keys = ThingResourceKind::ALL
                .into_iter()
                .filter(|kind| ThingEvent::supports(action, *kind))
                .map(|kind| event_key(action, kind));
            insert_all(&mut strategies, keys, event);
        }
        Self { context, strategies }
    }
}

fn event_action(adaptable: &Adaptable) -> Result<EventAction> {
    topic_action(adaptable)?
        .event_action()
        .ok_or_else(|| unknown_topic(adaptable))
}

fn event(adaptable: &Adaptable) -> Result<ThingEvent> {
    let payload = adaptable.payload();
    let revision = payload
        .revision()
        .ok_or_else(|| ProtocolError::missing_field(fields::REVISION, &Headers::new()))?;
    let event = ThingEvent::new(
        thing_id_of(adaptable)?,
        event_action(adaptable)?,
        resource(adaptable)?,
        payload.value().cloned(),
        revision,
    )?
    .with_headers(adaptable.headers_or_empty());

    Ok(match payload.timestamp() {
        Some(timestamp) => event.with_timestamp(timestamp),
        None => event,
    })
}

impl Adapter for ThingEventAdapter {
    type Signal = ThingEvent;

    fn context(&self) -> &AdapterContext {
        &self.context
    }

    fn strategies(&self) -> &MappingStrategies<ThingEvent> {
        &self.strategies
    }

    fn mapping_key(&self, adaptable: &Adaptable) -> Result<String> {
        Ok(event_key(event_action(adaptable)?, resource_kind(adaptable)?))
    }

    fn encode(&self, event: &ThingEvent, channel: Channel) -> Result<(TopicPath, Payload)> {
        let action = event.action;
        let topic = things_topic!(event.thing_id.entity_id(), channel, b => b.events().action(action).build())?;
        let payload = Payload::builder(event.resource.path())
            .with_optional_value(event.value.clone())
            .with_revision(event.revision)
            .with_optional_timestamp(event.timestamp)
            .build();
        Ok((topic, payload))
    }
}

/// `things.errors:error`, from an `errors` topic or a failed command.
pub struct ThingErrorResponseAdapter {
    context: AdapterContext,
    strategies: MappingStrategies<ThingErrorResponse>,
}

impl ThingErrorResponseAdapter {
    pub fn new(context: AdapterContext) -> Self {
        let mut strategies: MappingStrategies<ThingErrorResponse> = MappingStrategies::new();
        strategies.insert(error_key(), error_response as fn(&Adaptable) -> Result<ThingErrorResponse>);
        Self { context, strategies }
    }
}

fn error_key() -> String {
    format!("{}.errors:error", THINGS)
}

fn error_response(adaptable: &Adaptable) -> Result<ThingErrorResponse> {
    let error = RuntimeError::from_json(required_value(adaptable)?)?;
    Ok(ThingErrorResponse::new(thing_id_of(adaptable)?, error, adaptable.headers_or_empty()))
}

impl Adapter for ThingErrorResponseAdapter {
    type Signal = ThingErrorResponse;

    fn context(&self) -> &AdapterContext {
        &self.context
    }

    fn strategies(&self) -> &MappingStrategies<ThingErrorResponse> {
        &self.strategies
    }

    fn mapping_key(&self, _adaptable: &Adaptable) -> Result<String> {
        Ok(error_key())
    }

    fn encode(&self, response: &ThingErrorResponse, channel: Channel) -> Result<(TopicPath, Payload)> {
        let topic = things_topic!(response.thing_id.entity_id(), channel, b => b.errors().build())?;
        let payload = Payload::builder(JsonPointer::root())
            .with_value(response.error.to_json())
            .with_status(response.status())
            .build();
        Ok((topic, payload))
    }
}
