//! Policy entity: who may access which resources of a Thing.

use crate::error::{ModelError, Result};
use crate::id::PolicyId;
use crate::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub mod fields {
    pub const POLICY_ID: &str = "policyId";
    pub const ENTRIES: &str = "entries";
    pub const SUBJECTS: &str = "subjects";
    pub const RESOURCES: &str = "resources";
    pub const TYPE: &str = "type";
    pub const GRANT: &str = "grant";
    pub const REVOKE: &str = "revoke";
}

/// A subject of a policy entry, keyed by `<issuer>:<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(rename = "type")]
    pub subject_type: String,
}

impl Subject {
    pub fn new(subject_type: impl Into<String>) -> Self {
        Self {
            subject_type: subject_type.into(),
        }
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        Self::deserialize(value).map_err(|e| ModelError::json("Subject", e))
    }

    pub fn to_json(&self) -> Value {
        let mut object = JsonObject::new();
        object.insert(fields::TYPE.to_string(), Value::String(self.subject_type.clone()));
        Value::Object(object)
    }
}

/// Granted and revoked permissions on a resource, keyed by `<type>:<path>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub grant: Vec<String>,
    #[serde(default)]
    pub revoke: Vec<String>,
}

impl Resource {
    pub fn new<G, R>(grant: G, revoke: R) -> Self
    where
        G: IntoIterator,
        G::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            grant: grant.into_iter().map(Into::into).collect(),
            revoke: revoke.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        Self::deserialize(value).map_err(|e| ModelError::json("Resource", e))
    }

    pub fn to_json(&self) -> Value {
        let mut object = JsonObject::new();
        object.insert(fields::GRANT.to_string(), Value::from(self.grant.clone()));
        object.insert(fields::REVOKE.to_string(), Value::from(self.revoke.clone()));
        Value::Object(object)
    }
}

pub type Subjects = BTreeMap<String, Subject>;
pub type Resources = BTreeMap<String, Resource>;

pub fn subjects_from_json(value: &Value) -> Result<Subjects> {
    let subjects = Subjects::deserialize(value).map_err(|e| ModelError::json("Subjects", e))?;
    for id in subjects.keys() {
        validate_subject_id(id)?;
    }
    Ok(subjects)
}

pub fn subjects_to_json(subjects: &Subjects) -> Value {
    Value::Object(
        subjects
            .iter()
            .map(|(id, subject)| (id.clone(), subject.to_json()))
            .collect(),
    )
}

pub fn resources_from_json(value: &Value) -> Result<Resources> {
    let resources = Resources::deserialize(value).map_err(|e| ModelError::json("Resources", e))?;
    for key in resources.keys() {
        validate_resource_key(key)?;
    }
    Ok(resources)
}

pub fn resources_to_json(resources: &Resources) -> Value {
    Value::Object(
        resources
            .iter()
            .map(|(key, resource)| (key.clone(), resource.to_json()))
            .collect(),
    )
}

/// Subject ids have the form `<issuer>:<id>`.
pub fn validate_subject_id(id: &str) -> Result<()> {
    match id.split_once(':') {
        Some((issuer, rest)) if !issuer.is_empty() && !rest.is_empty() && !id.contains('/') => {
            Ok(())
        }
        _ => Err(ModelError::json("Subject", format!("invalid subject id '{}'", id))),
    }
}

/// Resource keys have the form `<type>:<path>`, e.g. `thing:/features`.
pub fn validate_resource_key(key: &str) -> Result<()> {
    match key.split_once(':') {
        Some((resource_type, _)) if !resource_type.is_empty() && !resource_type.contains('/') => {
            Ok(())
        }
        _ => Err(ModelError::json("Resource", format!("invalid resource key '{}'", key))),
    }
}

/// Labels name policy entries and cannot contain `/`.
pub fn validate_label(label: &str) -> Result<()> {
    if label.is_empty() || label.contains('/') {
        return Err(ModelError::json("PolicyEntry", format!("invalid label '{}'", label)));
    }
    Ok(())
}

/// One labelled entry of a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyEntry {
    label: String,
    pub subjects: Subjects,
    pub resources: Resources,
}

impl PolicyEntry {
    pub fn new(label: impl Into<String>, subjects: Subjects, resources: Resources) -> Result<Self> {
        let label = label.into();
        validate_label(&label)?;
        Ok(Self {
            label,
            subjects,
            resources,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn from_json(label: impl Into<String>, value: &Value) -> Result<Self> {
        let body = value
            .as_object()
            .ok_or_else(|| ModelError::json("PolicyEntry", "expected object"))?;
        let subjects = match body.get(fields::SUBJECTS) {
            Some(subjects) => subjects_from_json(subjects)?,
            None => Subjects::new(),
        };
        let resources = match body.get(fields::RESOURCES) {
            Some(resources) => resources_from_json(resources)?,
            None => Resources::new(),
        };
        Self::new(label, subjects, resources)
    }

    /// The entry body, without its label.
    pub fn to_json(&self) -> Value {
        let mut body = JsonObject::new();
        body.insert(fields::SUBJECTS.to_string(), subjects_to_json(&self.subjects));
        body.insert(fields::RESOURCES.to_string(), resources_to_json(&self.resources));
        Value::Object(body)
    }
}

/// All entries of a policy keyed by label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyEntries {
    entries: BTreeMap<String, PolicyEntry>,
}

impl PolicyEntries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, entry: PolicyEntry) -> Self {
        self.entries.insert(entry.label.clone(), entry);
        self
    }

    pub fn get(&self, label: &str) -> Option<&PolicyEntry> {
        self.entries.get(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PolicyEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| ModelError::json("PolicyEntries", "expected object"))?;
        let mut entries = PolicyEntries::new();
        for (label, body) in map {
            entries = entries.with_entry(PolicyEntry::from_json(label.clone(), body)?);
        }
        Ok(entries)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(label, entry)| (label.clone(), entry.to_json()))
                .collect(),
        )
    }
}

/// The Policy entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    pub policy_id: Option<PolicyId>,
    pub entries: PolicyEntries,
}

impl Policy {
    pub fn new(policy_id: PolicyId) -> Self {
        Self {
            policy_id: Some(policy_id),
            entries: PolicyEntries::new(),
        }
    }

    pub fn with_entry(mut self, entry: PolicyEntry) -> Self {
        self.entries = self.entries.with_entry(entry);
        self
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| ModelError::json("Policy", "expected object"))?;

        let policy_id = match object.get(fields::POLICY_ID) {
            Some(Value::String(id)) => Some(PolicyId::parse(id)?),
            Some(other) => {
                return Err(ModelError::json("Policy", format!("policyId must be a string, got {}", other)))
            }
            None => None,
        };
        let entries = match object.get(fields::ENTRIES) {
            Some(entries) => PolicyEntries::from_json(entries)?,
            None => PolicyEntries::new(),
        };

        Ok(Self { policy_id, entries })
    }

    pub fn to_json(&self) -> Value {
        let mut object = JsonObject::new();
        if let Some(policy_id) = &self.policy_id {
            object.insert(fields::POLICY_ID.to_string(), Value::String(policy_id.to_string()));
        }
        object.insert(fields::ENTRIES.to_string(), self.entries.to_json());
        Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_policy() -> Value {
        json!({
            "policyId": "ns:policy",
            "entries": {
                "DEFAULT": {
                    "subjects": { "nginx:admin": { "type": "pre-authenticated" } },
                    "resources": {
                        "thing:/": { "grant": ["READ", "WRITE"], "revoke": [] },
                        "policy:/": { "grant": ["READ"], "revoke": ["WRITE"] }
                    }
                }
            }
        })
    }

    #[test]
    fn test_policy_round_trip() {
        let policy = Policy::from_json(&sample_policy()).unwrap();
        assert_eq!(policy.policy_id.as_ref().unwrap().to_string(), "ns:policy");

        let entry = policy.entries.get("DEFAULT").unwrap();
        assert_eq!(entry.label(), "DEFAULT");
        assert_eq!(entry.subjects["nginx:admin"].subject_type, "pre-authenticated");
        assert_eq!(entry.resources["policy:/"].revoke, vec!["WRITE"]);

        assert_eq!(policy.to_json(), sample_policy());
    }

    #[test]
    fn test_invalid_policy_parts() {
        assert!(Policy::from_json(&json!({"policyId": 3})).is_err());
        assert!(PolicyEntry::from_json("a/b", &json!({})).is_err());
        assert!(subjects_from_json(&json!({"no-issuer": {"type": "x"}})).is_err());
        assert!(resources_from_json(&json!({"/no-type": {"grant": []}})).is_err());
        assert!(Subject::from_json(&json!({"kind": "x"})).is_err());
    }

    #[test]
    fn test_resource_defaults() {
        let resource = Resource::from_json(&json!({"grant": ["READ"]})).unwrap();
        assert!(resource.revoke.is_empty());
        assert_eq!(resource.to_json(), json!({"grant": ["READ"], "revoke": []}));
    }
}
