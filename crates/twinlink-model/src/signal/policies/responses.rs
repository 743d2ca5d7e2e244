use super::commands::{PolicyModifyCommand, PolicyModifyKind};
use super::resource::PolicyResource;
use super::POLICIES;
use crate::error::{ModelError, Result};
use crate::headers::Headers;
use crate::id::{EntityId, PolicyId};
use crate::runtime_error::RuntimeError;
use crate::signal::{command_name, ModifyAction, SignalInfo, RETRIEVE};
use crate::status::HttpStatus;
use serde_json::Value;

/// Response to a [`PolicyModifyCommand`]; `created` implies `201 Created`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyModifyCommandResponse {
    pub policy_id: PolicyId,
    pub action: ModifyAction,
    pub resource: PolicyResource,
    pub created: Option<Value>,
    pub headers: Headers,
}

impl PolicyModifyCommandResponse {
    pub fn new(
        policy_id: PolicyId,
        action: ModifyAction,
        resource: PolicyResource,
        created: Option<Value>,
        headers: Headers,
    ) -> Result<Self> {
        let kind = resource.kind();
        if !PolicyModifyKind::supports(action, kind) {
            return Err(ModelError::unsupported(action.as_str(), kind.as_str()));
        }
        if let Some(value) = &created {
            if action == ModifyAction::Delete {
                return Err(ModelError::unsupported("created delete", kind.as_str()));
            }
            resource.check_value(value)?;
        }
        Ok(Self {
            policy_id,
            action,
            resource,
            created,
            headers,
        })
    }

    pub fn for_command(command: &PolicyModifyCommand, created: bool) -> Self {
        Self {
            policy_id: command.policy_id.clone(),
            action: command.kind.action(),
            resource: command.kind.resource(),
            created: if created { command.kind.value() } else { None },
            headers: command.headers.clone(),
        }
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

impl SignalInfo for PolicyModifyCommandResponse {
    fn signal_type(&self) -> String {
        format!("{}.responses:{}", POLICIES, self.name())
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn entity_id(&self) -> Option<&EntityId> {
        Some(self.policy_id.entity_id())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyQueryCommandResponse {
    pub policy_id: PolicyId,
    pub resource: PolicyResource,
    pub value: Value,
    pub headers: Headers,
}

impl PolicyQueryCommandResponse {
    pub fn new(policy_id: PolicyId, resource: PolicyResource, value: Value, headers: Headers) -> Result<Self> {
        resource.check_value(&value)?;
        Ok(Self {
            policy_id,
            resource,
            value,
            headers,
        })
    }

    pub fn status(&self) -> HttpStatus {
        HttpStatus::OK
    }

    pub fn name(&self) -> String {
        command_name(RETRIEVE, self.resource.kind().as_str())
    }
}

impl SignalInfo for PolicyQueryCommandResponse {
    fn signal_type(&self) -> String {
        format!("{}.responses:{}", POLICIES, self.name())
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn entity_id(&self) -> Option<&EntityId> {
        Some(self.policy_id.entity_id())
    }
}

/// A failed Policy command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyErrorResponse {
    pub policy_id: PolicyId,
    pub error: RuntimeError,
    pub headers: Headers,
}

impl PolicyErrorResponse {
    pub fn new(policy_id: PolicyId, error: RuntimeError, headers: Headers) -> Self {
        Self {
            policy_id,
            error,
            headers,
        }
    }

    pub fn status(&self) -> HttpStatus {
        self.error.status
    }
}

impl SignalInfo for PolicyErrorResponse {
    fn signal_type(&self) -> String {
        format!("{}.errors:error", POLICIES)
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn entity_id(&self) -> Option<&EntityId> {
        Some(self.policy_id.entity_id())
    }
}
