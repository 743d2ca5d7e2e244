//! Entity identifiers.
//!
//! Things and policies are addressed by `namespace:name`. The namespace is a
//! dot-separated sequence of identifiers (it may be empty), the name is any
//! non-empty string without `/` or control characters.

use crate::error::{ModelError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static NAMESPACE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-zA-Z]\w*(?:\.[a-zA-Z]\w*)*)?$").expect("namespace pattern is valid")
});

/// A namespaced entity identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    namespace: String,
    name: String,
}

impl EntityId {
    /// Create an entity id from its parts, validating both.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let name = name.into();

        if !NAMESPACE_PATTERN.is_match(&namespace) || !is_valid_name(&name) {
            return Err(ModelError::InvalidEntityId(format!("{}:{}", namespace, name)));
        }

        Ok(Self { namespace, name })
    }

    /// Parse `namespace:name`. Only the first `:` separates the parts.
    pub fn parse(s: &str) -> Result<Self> {
        let (namespace, name) = s
            .split_once(':')
            .ok_or_else(|| ModelError::InvalidEntityId(s.to_string()))?;
        Self::new(namespace, name).map_err(|_| ModelError::InvalidEntityId(s.to_string()))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.chars().any(char::is_control)
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

impl FromStr for EntityId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

macro_rules! entity_id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(EntityId);

        impl $name {
            pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self> {
                EntityId::new(namespace, name).map(Self)
            }

            pub fn parse(s: &str) -> Result<Self> {
                EntityId::parse(s).map(Self)
            }

            pub fn namespace(&self) -> &str {
                self.0.namespace()
            }

            pub fn name(&self) -> &str {
                self.0.name()
            }

            pub fn entity_id(&self) -> &EntityId {
                &self.0
            }
        }

        impl From<EntityId> for $name {
            fn from(id: EntityId) -> Self {
                Self(id)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ModelError;

            fn try_from(s: String) -> Result<Self> {
                Self::parse(&s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.to_string()
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id_type!(
    /// Identifier of a Thing.
    ThingId
);

entity_id_type!(
    /// Identifier of a Policy.
    PolicyId
);
