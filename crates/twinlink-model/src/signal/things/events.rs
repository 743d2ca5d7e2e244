//! Events emitted after a Thing changed.

use super::commands::ThingModifyCommand;
use super::resource::{ThingResource, ThingResourceKind};
use super::THINGS;
use crate::error::{ModelError, Result};
use crate::headers::Headers;
use crate::id::{EntityId, ThingId};
use crate::signal::{event_name, EventAction, ModifyAction, SignalInfo};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// A persisted change of a Thing, e.g. `things.events:attributeModified`.
///
/// Created and modified events carry the new value, deleted events none.
#[derive(Debug, Clone, PartialEq)]
pub struct ThingEvent {
    pub thing_id: ThingId,
    pub action: EventAction,
    pub resource: ThingResource,
    pub value: Option<Value>,
    pub revision: u64,
    pub timestamp: Option<DateTime<Utc>>,
    pub headers: Headers,
}

impl ThingEvent {
    pub fn new(
        thing_id: ThingId,
        action: EventAction,
        resource: ThingResource,
        value: Option<Value>,
        revision: u64,
    ) -> Result<Self> {
        let kind = resource.kind();
        if !Self::supports(action, kind) {
            return Err(ModelError::unsupported(action.as_str(), kind.as_str()));
        }
        match (&value, action) {
            (Some(_), EventAction::Deleted) => {
                return Err(ModelError::json("ThingEvent", "deleted events carry no value"))
            }
            (None, EventAction::Created | EventAction::Modified) => {
                return Err(ModelError::json("ThingEvent", "missing value"))
            }
            (Some(value), _) => resource.check_value(value)?,
            (None, EventAction::Deleted) => {}
        }

        Ok(Self {
            thing_id,
            action,
            resource,
            value,
            revision,
            timestamp: None,
            headers: Headers::new(),
        })
    }

    /// The event recording the effect of `command` at `revision`.
    pub fn from_command(command: &ThingModifyCommand, revision: u64, created: bool) -> Result<Self> {
        let action = match command.kind.action() {
            ModifyAction::Create => EventAction::Created,
            ModifyAction::Modify if created => EventAction::Created,
            ModifyAction::Modify => EventAction::Modified,
            ModifyAction::Delete => EventAction::Deleted,
        };
        Ok(Self::new(
            command.thing_id.clone(),
            action,
            command.kind.resource(),
            command.kind.value(),
            revision,
        )?
        .with_headers(command.headers.clone()))
    }

    /// `policyId` is only ever modified.
    pub fn supports(action: EventAction, kind: ThingResourceKind) -> bool {
        kind != ThingResourceKind::PolicyId || action == EventAction::Modified
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn name(&self) -> String {
        event_name(self.resource.kind().as_str(), self.action)
    }
}

impl SignalInfo for ThingEvent {
    fn signal_type(&self) -> String {
        format!("{}.events:{}", THINGS, self.name())
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn entity_id(&self) -> Option<&EntityId> {
        Some(self.thing_id.entity_id())
    }
}
