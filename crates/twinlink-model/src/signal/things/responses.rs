//! Responses to Thing commands.

use super::commands::{ThingModifyCommand, ThingModifyKind, ThingQueryCommand};
use super::resource::ThingResource;
use super::THINGS;
use crate::error::{ModelError, Result};
use crate::headers::Headers;
use crate::id::{EntityId, ThingId};
use crate::signal::{command_name, ModifyAction, SignalInfo, RETRIEVE};
use crate::status::HttpStatus;
use serde_json::Value;

/// Response to a [`ThingModifyCommand`].
///
/// A response with a `created` value reports `201 Created`, every other
/// response `204 No Content`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThingModifyCommandResponse {
    pub thing_id: ThingId,
    pub action: ModifyAction,
    pub resource: ThingResource,
    pub created: Option<Value>,
    pub headers: Headers,
}

impl ThingModifyCommandResponse {
    /// The resource did not exist before; `value` is its new state.
    pub fn created(
        thing_id: ThingId,
        action: ModifyAction,
        resource: ThingResource,
        value: Value,
        headers: Headers,
    ) -> Result<Self> {
        if action == ModifyAction::Delete {
            return Err(ModelError::unsupported("created delete", resource.kind().as_str()));
        }
        Self::checked(thing_id, action, resource, Some(value), headers)
    }

    /// The resource was modified or deleted.
    pub fn completed(thing_id: ThingId, action: ModifyAction, resource: ThingResource, headers: Headers) -> Result<Self> {
        Self::checked(thing_id, action, resource, None, headers)
    }

    /// Response acknowledging `command`. A created response echoes the written value.
    pub fn for_command(command: &ThingModifyCommand, created: bool) -> Self {
        let created_value = if created { command.kind.value() } else { None };
        Self {
            thing_id: command.thing_id.clone(),
            action: command.kind.action(),
            resource: command.kind.resource(),
            created: created_value,
            headers: command.headers.clone(),
        }
    }

    fn checked(
        thing_id: ThingId,
        action: ModifyAction,
        resource: ThingResource,
        created: Option<Value>,
        headers: Headers,
    ) -> Result<Self> {
        let kind = resource.kind();
        if !ThingModifyKind::supports(action, kind) {
            return Err(ModelError::unsupported(action.as_str(), kind.as_str()));
        }
        if let Some(value) = &created {
            resource.check_value(value)?;
        }
        Ok(Self {
            thing_id,
            action,
            resource,
            created,
            headers,
        })
    }

    pub fn status(&self) -> HttpStatus {
        if self.created.is_some() {
            HttpStatus::CREATED
        } else {
            HttpStatus::NO_CONTENT
        }
    }

    pub fn name(&self) -> String {
        command_name(self.action.as_str(), self.resource.kind().as_str())
    }
}

impl SignalInfo for ThingModifyCommandResponse {
    fn signal_type(&self) -> String {
        format!("{}.responses:{}", THINGS, self.name())
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn entity_id(&self) -> Option<&EntityId> {
        Some(self.thing_id.entity_id())
    }
}

/// Response to a [`ThingQueryCommand`] carrying the retrieved JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ThingQueryCommandResponse {
    pub thing_id: ThingId,
    pub resource: ThingResource,
    pub value: Value,
    pub headers: Headers,
}

impl ThingQueryCommandResponse {
    pub fn new(thing_id: ThingId, resource: ThingResource, value: Value, headers: Headers) -> Result<Self> {
        resource.check_value(&value)?;
        Ok(Self {
            thing_id,
            resource,
            value,
            headers,
        })
    }

    /// Answer `query` with `value`.
    pub fn for_query(query: &ThingQueryCommand, value: Value) -> Result<Self> {
        Self::new(query.thing_id.clone(), query.kind.resource(), value, query.headers.clone())
    }

    pub fn status(&self) -> HttpStatus {
        HttpStatus::OK
    }

    pub fn name(&self) -> String {
        command_name(RETRIEVE, self.resource.kind().as_str())
    }
}

impl SignalInfo for ThingQueryCommandResponse {
    fn signal_type(&self) -> String {
        format!("{}.responses:{}", THINGS, self.name())
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn entity_id(&self) -> Option<&EntityId> {
        Some(self.thing_id.entity_id())
    }
}
