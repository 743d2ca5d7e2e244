//! Adapters for Policy commands, responses and errors.
//!
//! Policies have no channel: every topic is `<ns>/<name>/policies/...`.

use super::{
    insert_all, modify_action, required_status, required_value, retrieve_action, Adapter, AdapterContext,
    MappingStrategies,
};
use crate::adaptable::{fields, Adaptable};
use crate::error::{ProtocolError, Result};
use crate::path_matcher::POLICY_PATHS;
use crate::payload::Payload;
use crate::topic::{Channel, CommandAction, TopicPath};
use twinlink_model::signal::policies::POLICIES;
use twinlink_model::signal::{
    command_name, ModifyAction, PolicyErrorResponse, PolicyModifyCommand, PolicyModifyCommandResponse,
    PolicyModifyKind, PolicyQueryCommand, PolicyQueryCommandResponse, PolicyQueryKind, PolicyResource,
    PolicyResourceKind, RETRIEVE,
};
use twinlink_model::{EntityId, Headers, HttpStatus, JsonPointer, PolicyId, RuntimeError};

const MODIFY_ACTIONS: [ModifyAction; 3] = [ModifyAction::Create, ModifyAction::Modify, ModifyAction::Delete];

fn command_key(criterion: &str, action: &str, kind: PolicyResourceKind) -> String {
    format!("{}.{}:{}", POLICIES, criterion, command_name(action, kind.as_str()))
}

fn policy_id_of(adaptable: &Adaptable) -> Result<PolicyId> {
    Ok(PolicyId::from(adaptable.topic_path().entity_id()?))
}

fn resource_kind(adaptable: &Adaptable) -> Result<PolicyResourceKind> {
    POLICY_PATHS.matches(adaptable.payload().path().pointer())
}

fn resource(adaptable: &Adaptable) -> Result<PolicyResource> {
    let path = adaptable.payload().path().pointer();
    let kind = POLICY_PATHS.matches(path)?;
    Ok(PolicyResource::from_path(kind, path)?)
}

/// Policy signals are channel-less; the twin channel is accepted as the default.
fn check_channel(channel: Channel) -> Result<()> {
    match channel {
        Channel::None | Channel::Twin => Ok(()),
        Channel::Live => Err(ProtocolError::unknown_channel(channel.as_str(), &Headers::new())),
    }
}

fn commands_topic(policy_id: &EntityId, action: CommandAction) -> Result<TopicPath> {
    TopicPath::builder_for(policy_id).policies().commands().action(action).build()
}

/// `policies.commands:<action><Kind>` for create, modify and delete.
pub struct PolicyModifyCommandAdapter {
    context: AdapterContext,
    strategies: MappingStrategies<PolicyModifyCommand>,
}

impl PolicyModifyCommandAdapter {
    pub fn new(context: AdapterContext) -> Self {
        let mut strategies: MappingStrategies<PolicyModifyCommand> = MappingStrategies::new();
        for action in MODIFY_ACTIONS {
            let keys = PolicyResourceKind::ALL
                .into_iter()
                .filter(|kind| PolicyModifyKind::supports(action, *kind))
                .map(|kind| command_key("commands", action.as_str(), kind));
            insert_all(&mut strategies, keys, modify_command);
        }
        Self { context, strategies }
    }
}

fn modify_command(adaptable: &Adaptable) -> Result<PolicyModifyCommand> {
    let action = modify_action(adaptable)?;
    let value = adaptable.payload().value();
    if action != ModifyAction::Delete && value.is_none() {
        return Err(ProtocolError::missing_field(fields::VALUE, &Headers::new()));
    }
    let kind = PolicyModifyKind::from_parts(action, resource(adaptable)?, value)?;
    Ok(PolicyModifyCommand::new(policy_id_of(adaptable)?, kind, adaptable.headers_or_empty()))
}

impl Adapter for PolicyModifyCommandAdapter {
    type Signal = PolicyModifyCommand;

    fn context(&self) -> &AdapterContext {
        &self.context
    }

    fn strategies(&self) -> &MappingStrategies<PolicyModifyCommand> {
        &self.strategies
    }

    fn mapping_key(&self, adaptable: &Adaptable) -> Result<String> {
        let action = modify_action(adaptable)?;
        Ok(command_key("commands", action.as_str(), resource_kind(adaptable)?))
    }

    fn encode(&self, command: &PolicyModifyCommand, channel: Channel) -> Result<(TopicPath, Payload)> {
        check_channel(channel)?;
        let topic = commands_topic(command.policy_id.entity_id(), command.kind.action().into())?;
        let payload = Payload::builder(command.kind.resource().path())
            .with_optional_value(command.kind.value())
            .build();
        Ok((topic, payload))
    }
}

/// `policies.commands:retrieve<Kind>`.
pub struct PolicyQueryCommandAdapter {
    context: AdapterContext,
    strategies: MappingStrategies<PolicyQueryCommand>,
}

impl PolicyQueryCommandAdapter {
    pub fn new(context: AdapterContext) -> Self {
        let mut strategies: MappingStrategies<PolicyQueryCommand> = MappingStrategies::new();
        let keys = PolicyResourceKind::ALL
            .into_iter()
            .map(|kind| command_key("commands", RETRIEVE, kind));
        insert_all(&mut strategies, keys, query_command);
        Self { context, strategies }
    }
}

fn query_command(adaptable: &Adaptable) -> Result<PolicyQueryCommand> {
    Ok(PolicyQueryCommand::new(
        policy_id_of(adaptable)?,
        PolicyQueryKind::from_resource(resource(adaptable)?),
        adaptable.headers_or_empty(),
    ))
}

impl Adapter for PolicyQueryCommandAdapter {
    type Signal = PolicyQueryCommand;

    fn context(&self) -> &AdapterContext {
        &self.context
    }

    fn strategies(&self) -> &MappingStrategies<PolicyQueryCommand> {
        &self.strategies
    }

    fn mapping_key(&self, adaptable: &Adaptable) -> Result<String> {
        retrieve_action(adaptable)?;
        Ok(command_key("commands", RETRIEVE, resource_kind(adaptable)?))
    }

    fn encode(&self, query: &PolicyQueryCommand, channel: Channel) -> Result<(TopicPath, Payload)> {
        check_channel(channel)?;
        let topic = commands_topic(query.policy_id.entity_id(), CommandAction::Retrieve)?;
        Ok((topic, Payload::builder(query.kind.resource().path()).build()))
    }
}

/// `policies.responses:<action><Kind>`.
pub struct PolicyModifyCommandResponseAdapter {
    context: AdapterContext,
    strategies: MappingStrategies<PolicyModifyCommandResponse>,
}

impl PolicyModifyCommandResponseAdapter {
    pub fn new(context: AdapterContext) -> Self {
        let mut strategies: MappingStrategies<PolicyModifyCommandResponse> = MappingStrategies::new();
        for action in MODIFY_ACTIONS {
            let keys = PolicyResourceKind::ALL
                .into_iter()
                .filter(|kind| PolicyModifyKind::supports(action, *kind))
                .map(|kind| command_key("responses", action.as_str(), kind));
            insert_all(&mut strategies, keys, modify_response);
        }
        Self { context, strategies }
    }
}

fn modify_response(adaptable: &Adaptable) -> Result<PolicyModifyCommandResponse> {
    let created = match required_status(adaptable)? {
        HttpStatus::CREATED => Some(required_value(adaptable)?.clone()),
        _ => None,
    };
    Ok(PolicyModifyCommandResponse::new(
        policy_id_of(adaptable)?,
        modify_action(adaptable)?,
        resource(adaptable)?,
        created,
        adaptable.headers_or_empty(),
    )?)
}

impl Adapter for PolicyModifyCommandResponseAdapter {
    type Signal = PolicyModifyCommandResponse;

    fn context(&self) -> &AdapterContext {
        &self.context
    }

    fn strategies(&self) -> &MappingStrategies<PolicyModifyCommandResponse> {
        &self.strategies
    }

    fn mapping_key(&self, adaptable: &Adaptable) -> Result<String> {
        let action = modify_action(adaptable)?;
        Ok(command_key("responses", action.as_str(), resource_kind(adaptable)?))
    }

    fn encode(&self, response: &PolicyModifyCommandResponse, channel: Channel) -> Result<(TopicPath, Payload)> {
        check_channel(channel)?;
        let topic = commands_topic(response.policy_id.entity_id(), response.action.into())?;
        let payload = Payload::builder(response.resource.path())
            .with_optional_value(response.created.clone())
            .with_status(response.status())
            .build();
        Ok((topic, payload))
    }
}

/// `policies.responses:retrieve<Kind>`.
pub struct PolicyQueryCommandResponseAdapter {
    context: AdapterContext,
    strategies: MappingStrategies<PolicyQueryCommandResponse>,
}

impl PolicyQueryCommandResponseAdapter {
    pub fn new(context: AdapterContext) -> Self {
        let mut strategies: MappingStrategies<PolicyQueryCommandResponse> = MappingStrategies::new();
        let keys = PolicyResourceKind::ALL
            .into_iter()
            .map(|kind| command_key("responses", RETRIEVE, kind));
        insert_all(&mut strategies, keys, query_response);
        Self { context, strategies }
    }
}

fn query_response(adaptable: &Adaptable) -> Result<PolicyQueryCommandResponse> {
    let value = required_value(adaptable)?.clone();
    Ok(PolicyQueryCommandResponse::new(
        policy_id_of(adaptable)?,
        resource(adaptable)?,
        value,
        adaptable.headers_or_empty(),
    )?)
}

impl Adapter for PolicyQueryCommandResponseAdapter {
    type Signal = PolicyQueryCommandResponse;

    fn context(&self) -> &AdapterContext {
        &self.context
    }

    fn strategies(&self) -> &MappingStrategies<PolicyQueryCommandResponse> {
        &self.strategies
    }

    fn mapping_key(&self, adaptable: &Adaptable) -> Result<String> {
        retrieve_action(adaptable)?;
        Ok(command_key("responses", RETRIEVE, resource_kind(adaptable)?))
    }

    fn encode(&self, response: &PolicyQueryCommandResponse, channel: Channel) -> Result<(TopicPath, Payload)> {
        check_channel(channel)?;
        let topic = commands_topic(response.policy_id.entity_id(), CommandAction::Retrieve)?;
        let payload = Payload::builder(response.resource.path())
            .with_value(response.value.clone())
            .with_status(response.status())
            .build();
        Ok((topic, payload))
    }
}

/// `policies.errors:error`.
pub struct PolicyErrorResponseAdapter {
    context: AdapterContext,
    strategies: MappingStrategies<PolicyErrorResponse>,
}

impl PolicyErrorResponseAdapter {
    pub fn new(context: AdapterContext) -> Self {
        let mut strategies: MappingStrategies<PolicyErrorResponse> = MappingStrategies::new();
        strategies.insert(error_key(), error_response);
        Self { context, strategies }
    }
}

fn error_key() -> String {
    format!("{}.errors:error", POLICIES)
}

fn error_response(adaptable: &Adaptable) -> Result<PolicyErrorResponse> {
    let error = RuntimeError::from_json(required_value(adaptable)?)?;
    Ok(PolicyErrorResponse::new(policy_id_of(adaptable)?, error, adaptable.headers_or_empty()))
}

impl Adapter for PolicyErrorResponseAdapter {
    type Signal = PolicyErrorResponse;

    fn context(&self) -> &AdapterContext {
        &self.context
    }

    fn strategies(&self) -> &MappingStrategies<PolicyErrorResponse> {
        &self.strategies
    }

    fn mapping_key(&self, _adaptable: &Adaptable) -> Result<String> {
        Ok(error_key())
    }

    fn encode(&self, response: &PolicyErrorResponse, channel: Channel) -> Result<(TopicPath, Payload)> {
        check_channel(channel)?;
        let topic = TopicPath::builder_for(response.policy_id.entity_id())
            .policies()
            .errors()
            .build()?;
        let payload = Payload::builder(JsonPointer::root())
            .with_value(response.error.to_json())
            .with_status(response.status())
            .build();
        Ok((topic, payload))
    }
}
