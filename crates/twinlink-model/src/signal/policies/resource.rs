//! Addressable parts of a Policy.
//!
//! ```text
//! /                                   policy
//! /entries                            policyEntries
//! /entries/<label>                    policyEntry
//! /entries/<label>/resources          resources
//! /entries/<label>/resources/<type>:<path...>
//!                                     resource
//! /entries/<label>/subjects           subjects
//! /entries/<label>/subjects/<id>      subject
//! ```

use crate::error::{ModelError, Result};
use crate::pointer::JsonPointer;
use crate::policy::{
    fields, resources_from_json, subjects_from_json, validate_resource_key, validate_subject_id, Policy,
    PolicyEntries, PolicyEntry, Resource, Subject,
};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyResourceKind {
    Policy,
    PolicyEntries,
    PolicyEntry,
    Resources,
    Resource,
    Subjects,
    Subject,
}

impl PolicyResourceKind {
    /// Every kind in path-matching order.
    pub const ALL: [PolicyResourceKind; 7] = [
        Self::Policy,
        Self::PolicyEntries,
        Self::PolicyEntry,
        Self::Resources,
        Self::Resource,
        Self::Subjects,
        Self::Subject,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Policy => "policy",
            Self::PolicyEntries => "policyEntries",
            Self::PolicyEntry => "policyEntry",
            Self::Resources => "resources",
            Self::Resource => "resource",
            Self::Subjects => "subjects",
            Self::Subject => "subject",
        }
    }

    /// Collections are replaced as a whole and never deleted.
    pub fn is_deletable(&self) -> bool {
        !matches!(self, Self::PolicyEntries | Self::Resources | Self::Subjects)
    }
}

impl fmt::Display for PolicyResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The address of a Policy resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PolicyResource {
    Policy,
    PolicyEntries,
    PolicyEntry(String),
    Resources(String),
    /// Entry label and resource key, e.g. `thing:/features`.
    Resource(String, String),
    Subjects(String),
    /// Entry label and subject id, e.g. `nginx:admin`.
    Subject(String, String),
}

impl PolicyResource {
    pub fn kind(&self) -> PolicyResourceKind {
        match self {
            Self::Policy => PolicyResourceKind::Policy,
            Self::PolicyEntries => PolicyResourceKind::PolicyEntries,
            Self::PolicyEntry(_) => PolicyResourceKind::PolicyEntry,
            Self::Resources(_) => PolicyResourceKind::Resources,
            Self::Resource(..) => PolicyResourceKind::Resource,
            Self::Subjects(_) => PolicyResourceKind::Subjects,
            Self::Subject(..) => PolicyResourceKind::Subject,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Self::PolicyEntry(label)
            | Self::Resources(label)
            | Self::Resource(label, _)
            | Self::Subjects(label)
            | Self::Subject(label, _) => Some(label),
            Self::Policy | Self::PolicyEntries => None,
        }
    }

    pub fn path(&self) -> JsonPointer {
        let entry = |label: &str, tail: &[&str]| {
            let mut keys = vec![fields::ENTRIES.to_string(), label.to_string()];
            keys.extend(tail.iter().map(|key| key.to_string()));
            keys
        };

        match self {
            Self::Policy => JsonPointer::root(),
            Self::PolicyEntries => JsonPointer::from_trusted([fields::ENTRIES]),
            Self::PolicyEntry(label) => JsonPointer::from_trusted(entry(label, &[])),
            Self::Resources(label) => JsonPointer::from_trusted(entry(label, &[fields::RESOURCES])),
            Self::Resource(label, key) => {
                let mut keys = entry(label, &[fields::RESOURCES]);
                keys.extend(resource_key_segments(key));
                JsonPointer::from_trusted(keys)
            }
            Self::Subjects(label) => JsonPointer::from_trusted(entry(label, &[fields::SUBJECTS])),
            Self::Subject(label, subject_id) => {
                JsonPointer::from_trusted(entry(label, &[fields::SUBJECTS, subject_id.as_str()]))
            }
        }
    }

    /// Extract the resource of an already classified path.
    pub fn from_path(kind: PolicyResourceKind, path: &JsonPointer) -> Result<Self> {
        let invalid = || ModelError::InvalidPointer(path.to_string());
        let label = || path.get(1).map(str::to_string).ok_or_else(invalid);

        Ok(match kind {
            PolicyResourceKind::Policy => Self::Policy,
            PolicyResourceKind::PolicyEntries => Self::PolicyEntries,
            PolicyResourceKind::PolicyEntry => Self::PolicyEntry(label()?),
            PolicyResourceKind::Resources => Self::Resources(label()?),
            PolicyResourceKind::Resource => {
                let tail = path.sub_pointer(3).filter(|tail| !tail.is_root()).ok_or_else(invalid)?;
                Self::Resource(label()?, resource_key_of(&tail)?)
            }
            PolicyResourceKind::Subjects => Self::Subjects(label()?),
            PolicyResourceKind::Subject => {
                let subject_id = path.get(3).ok_or_else(invalid)?;
                validate_subject_id(subject_id)?;
                Self::Subject(label()?, subject_id.to_string())
            }
        })
    }

    /// Check that `value` is a valid representation of this resource.
    pub fn check_value(&self, value: &Value) -> Result<()> {
        match self {
            Self::Policy => Policy::from_json(value).map(drop),
            Self::PolicyEntries => PolicyEntries::from_json(value).map(drop),
            Self::PolicyEntry(label) => PolicyEntry::from_json(label.clone(), value).map(drop),
            Self::Resources(_) => resources_from_json(value).map(drop),
            Self::Resource(..) => Resource::from_json(value).map(drop),
            Self::Subjects(_) => subjects_from_json(value).map(drop),
            Self::Subject(..) => Subject::from_json(value).map(drop),
        }
    }
}

impl fmt::Display for PolicyResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.path())
    }
}

/// `thing:/features/lamp` -> `["thing:", "features", "lamp"]`.
fn resource_key_segments(key: &str) -> Vec<String> {
    match key.split_once(':') {
        Some((resource_type, path)) => {
            let mut keys = vec![format!("{}:", resource_type)];
            keys.extend(path.split('/').filter(|part| !part.is_empty()).map(str::to_string));
            keys
        }
        None => vec![key.to_string()],
    }
}

/// Inverse of [`resource_key_segments`]: the first segment names the type.
fn resource_key_of(tail: &JsonPointer) -> Result<String> {
    let invalid = || ModelError::InvalidPointer(tail.to_string());
    let resource_type = tail
        .first()
        .and_then(|first| first.strip_suffix(':'))
        .ok_or_else(invalid)?;
    let path = tail.sub_pointer(1).ok_or_else(invalid)?;
    let key = format!("{}:{}", resource_type, path);
    validate_resource_key(&key)?;
    Ok(key)
}
