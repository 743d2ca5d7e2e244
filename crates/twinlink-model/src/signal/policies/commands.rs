//! Commands addressed to a Policy.

use super::resource::{PolicyResource, PolicyResourceKind};
use super::POLICIES;
use crate::error::{ModelError, Result};
use crate::headers::Headers;
use crate::id::{EntityId, PolicyId};
use crate::policy::{
    resources_from_json, resources_to_json, subjects_from_json, subjects_to_json, Policy, PolicyEntries,
    PolicyEntry, Resource, Resources, Subject, Subjects,
};
use crate::signal::{command_name, ModifyAction, SignalInfo, RETRIEVE};
use serde_json::Value;

/// Every state-changing Policy command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyModifyKind {
    CreatePolicy(Policy),
    ModifyPolicy(Policy),
    DeletePolicy,
    ModifyPolicyEntries(PolicyEntries),
    ModifyPolicyEntry(PolicyEntry),
    DeletePolicyEntry { label: String },
    ModifyResources { label: String, resources: Resources },
    ModifyResource { label: String, key: String, resource: Resource },
    DeleteResource { label: String, key: String },
    ModifySubjects { label: String, subjects: Subjects },
    ModifySubject { label: String, subject_id: String, subject: Subject },
    DeleteSubject { label: String, subject_id: String },
}

impl PolicyModifyKind {
    pub fn action(&self) -> ModifyAction {
        match self {
            Self::CreatePolicy(_) => ModifyAction::Create,
            Self::DeletePolicy
            | Self::DeletePolicyEntry { .. }
            | Self::DeleteResource { .. }
            | Self::DeleteSubject { .. } => ModifyAction::Delete,
            _ => ModifyAction::Modify,
        }
    }

    pub fn resource(&self) -> PolicyResource {
        match self {
            Self::CreatePolicy(_) | Self::ModifyPolicy(_) | Self::DeletePolicy => PolicyResource::Policy,
            Self::ModifyPolicyEntries(_) => PolicyResource::PolicyEntries,
            Self::ModifyPolicyEntry(entry) => PolicyResource::PolicyEntry(entry.label().to_string()),
            Self::DeletePolicyEntry { label } => PolicyResource::PolicyEntry(label.clone()),
            Self::ModifyResources { label, .. } => PolicyResource::Resources(label.clone()),
            Self::ModifyResource { label, key, .. } | Self::DeleteResource { label, key } => {
                PolicyResource::Resource(label.clone(), key.clone())
            }
            Self::ModifySubjects { label, .. } => PolicyResource::Subjects(label.clone()),
            Self::ModifySubject { label, subject_id, .. } | Self::DeleteSubject { label, subject_id } => {
                PolicyResource::Subject(label.clone(), subject_id.clone())
            }
        }
    }

    pub fn value(&self) -> Option<Value> {
        match self {
            Self::CreatePolicy(policy) | Self::ModifyPolicy(policy) => Some(policy.to_json()),
            Self::ModifyPolicyEntries(entries) => Some(entries.to_json()),
            Self::ModifyPolicyEntry(entry) => Some(entry.to_json()),
            Self::ModifyResources { resources, .. } => Some(resources_to_json(resources)),
            Self::ModifyResource { resource, .. } => Some(resource.to_json()),
            Self::ModifySubjects { subjects, .. } => Some(subjects_to_json(subjects)),
            Self::ModifySubject { subject, .. } => Some(subject.to_json()),
            Self::DeletePolicy
            | Self::DeletePolicyEntry { .. }
            | Self::DeleteResource { .. }
            | Self::DeleteSubject { .. } => None,
        }
    }

    pub fn name(&self) -> String {
        command_name(self.action().as_str(), self.resource().kind().as_str())
    }

    pub fn supports(action: ModifyAction, kind: PolicyResourceKind) -> bool {
        match action {
            ModifyAction::Create => kind == PolicyResourceKind::Policy,
            ModifyAction::Modify => true,
            ModifyAction::Delete => kind.is_deletable(),
        }
    }

    pub fn from_parts(action: ModifyAction, resource: PolicyResource, value: Option<&Value>) -> Result<Self> {
        let kind = resource.kind();
        if !Self::supports(action, kind) {
            return Err(ModelError::unsupported(action.as_str(), kind.as_str()));
        }
        let required = || value.ok_or_else(|| ModelError::json(kind.as_str(), "missing value"));

        Ok(match (action, resource) {
            (ModifyAction::Create, _) => Self::CreatePolicy(Policy::from_json(required()?)?),
            (ModifyAction::Delete, PolicyResource::PolicyEntry(label)) => Self::DeletePolicyEntry { label },
            (ModifyAction::Delete, PolicyResource::Resource(label, key)) => Self::DeleteResource { label, key },
            (ModifyAction::Delete, PolicyResource::Subject(label, subject_id)) => {
                Self::DeleteSubject { label, subject_id }
            }
            (ModifyAction::Delete, _) => Self::DeletePolicy,
            (ModifyAction::Modify, PolicyResource::Policy) => Self::ModifyPolicy(Policy::from_json(required()?)?),
            (ModifyAction::Modify, PolicyResource::PolicyEntries) => {
                Self::ModifyPolicyEntries(PolicyEntries::from_json(required()?)?)
            }
            (ModifyAction::Modify, PolicyResource::PolicyEntry(label)) => {
                Self::ModifyPolicyEntry(PolicyEntry::from_json(label, required()?)?)
            }
            (ModifyAction::Modify, PolicyResource::Resources(label)) => Self::ModifyResources {
                label,
                resources: resources_from_json(required()?)?,
            },
            (ModifyAction::Modify, PolicyResource::Resource(label, key)) => Self::ModifyResource {
                label,
                key,
                resource: Resource::from_json(required()?)?,
            },
            (ModifyAction::Modify, PolicyResource::Subjects(label)) => Self::ModifySubjects {
                label,
                subjects: subjects_from_json(required()?)?,
            },
            (ModifyAction::Modify, PolicyResource::Subject(label, subject_id)) => Self::ModifySubject {
                label,
                subject_id,
                subject: Subject::from_json(required()?)?,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyModifyCommand {
    pub policy_id: PolicyId,
    pub kind: PolicyModifyKind,
    pub headers: Headers,
}

impl PolicyModifyCommand {
    pub fn new(policy_id: PolicyId, kind: PolicyModifyKind, headers: Headers) -> Self {
        Self {
            policy_id,
            kind,
            headers,
        }
    }
}

impl SignalInfo for PolicyModifyCommand {
    fn signal_type(&self) -> String {
        format!("{}.commands:{}", POLICIES, self.kind.name())
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn entity_id(&self) -> Option<&EntityId> {
        Some(self.policy_id.entity_id())
    }
}

/// Every read-only Policy command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyQueryKind {
    RetrievePolicy,
    RetrievePolicyEntries,
    RetrievePolicyEntry { label: String },
    RetrieveResources { label: String },
    RetrieveResource { label: String, key: String },
    RetrieveSubjects { label: String },
    RetrieveSubject { label: String, subject_id: String },
}

impl PolicyQueryKind {
    pub fn resource(&self) -> PolicyResource {
        match self.clone() {
            Self::RetrievePolicy => PolicyResource::Policy,
            Self::RetrievePolicyEntries => PolicyResource::PolicyEntries,
            Self::RetrievePolicyEntry { label } => PolicyResource::PolicyEntry(label),
            Self::RetrieveResources { label } => PolicyResource::Resources(label),
            Self::RetrieveResource { label, key } => PolicyResource::Resource(label, key),
            Self::RetrieveSubjects { label } => PolicyResource::Subjects(label),
            Self::RetrieveSubject { label, subject_id } => PolicyResource::Subject(label, subject_id),
        }
    }

    pub fn from_resource(resource: PolicyResource) -> Self {
        match resource {
            PolicyResource::Policy => Self::RetrievePolicy,
            PolicyResource::PolicyEntries => Self::RetrievePolicyEntries,
            PolicyResource::PolicyEntry(label) => Self::RetrievePolicyEntry { label },
            PolicyResource::Resources(label) => Self::RetrieveResources { label },
            PolicyResource::Resource(label, key) => Self::RetrieveResource { label, key },
            PolicyResource::Subjects(label) => Self::RetrieveSubjects { label },
            PolicyResource::Subject(label, subject_id) => Self::RetrieveSubject { label, subject_id },
        }
    }

    pub fn name(&self) -> String {
        command_name(RETRIEVE, self.resource().kind().as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyQueryCommand {
    pub policy_id: PolicyId,
    pub kind: PolicyQueryKind,
    pub headers: Headers,
}

impl PolicyQueryCommand {
    pub fn new(policy_id: PolicyId, kind: PolicyQueryKind, headers: Headers) -> Self {
        Self {
            policy_id,
            kind,
            headers,
        }
    }
}

impl SignalInfo for PolicyQueryCommand {
    fn signal_type(&self) -> String {
        format!("{}.commands:{}", POLICIES, self.kind.name())
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn entity_id(&self) -> Option<&EntityId> {
        Some(self.policy_id.entity_id())
    }
}
