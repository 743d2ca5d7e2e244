//! Addressable parts of a Thing.

use crate::error::{ModelError, Result};
use crate::id::PolicyId;
use crate::pointer::JsonPointer;
use crate::thing::{fields, object_of, Feature, FeatureDefinition, Features, Thing, ThingDefinition};
use serde_json::Value;
use std::fmt;

/// Kind of a Thing resource, used to build signal type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThingResourceKind {
    Thing,
    PolicyId,
    Definition,
    Attributes,
    Attribute,
    Features,
    Feature,
    FeatureDefinition,
    FeatureProperties,
    FeatureProperty,
    FeatureDesiredProperties,
    FeatureDesiredProperty,
}

impl ThingResourceKind {
    /// Every kind in path-matching order.
    pub const ALL: [ThingResourceKind; 12] = [
        Self::Thing,
        Self::PolicyId,
        Self::Definition,
        Self::Attributes,
        Self::Attribute,
        Self::Features,
        Self::Feature,
        Self::FeatureDefinition,
        Self::FeatureProperties,
        Self::FeatureProperty,
        Self::FeatureDesiredProperties,
        Self::FeatureDesiredProperty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thing => "thing",
            Self::PolicyId => "policyId",
            Self::Definition => "definition",
            Self::Attributes => "attributes",
            Self::Attribute => "attribute",
            Self::Features => "features",
            Self::Feature => "feature",
            Self::FeatureDefinition => "featureDefinition",
            Self::FeatureProperties => "featureProperties",
            Self::FeatureProperty => "featureProperty",
            Self::FeatureDesiredProperties => "featureDesiredProperties",
            Self::FeatureDesiredProperty => "featureDesiredProperty",
        }
    }

    /// Whether retrieve commands for this kind accept a field selector.
    pub fn supports_field_selection(&self) -> bool {
        matches!(
            self,
            Self::Thing
                | Self::Attributes
                | Self::Features
                | Self::Feature
                | Self::FeatureProperties
                | Self::FeatureDesiredProperties
        )
    }

    /// `policyId` can only be modified; everything else supports every action.
    pub fn is_deletable(&self) -> bool {
        !matches!(self, Self::PolicyId)
    }
}

impl fmt::Display for ThingResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The address of a Thing resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ThingResource {
    Thing,
    PolicyId,
    Definition,
    Attributes,
    Attribute(JsonPointer),
    Features,
    Feature(String),
    FeatureDefinition(String),
    FeatureProperties(String),
    FeatureProperty(String, JsonPointer),
    FeatureDesiredProperties(String),
    FeatureDesiredProperty(String, JsonPointer),
}

impl ThingResource {
    pub fn kind(&self) -> ThingResourceKind {
        match self {
            Self::Thing => ThingResourceKind::Thing,
            Self::PolicyId => ThingResourceKind::PolicyId,
            Self::Definition => ThingResourceKind::Definition,
            Self::Attributes => ThingResourceKind::Attributes,
            Self::Attribute(_) => ThingResourceKind::Attribute,
            Self::Features => ThingResourceKind::Features,
            Self::Feature(_) => ThingResourceKind::Feature,
            Self::FeatureDefinition(_) => ThingResourceKind::FeatureDefinition,
            Self::FeatureProperties(_) => ThingResourceKind::FeatureProperties,
            Self::FeatureProperty(..) => ThingResourceKind::FeatureProperty,
            Self::FeatureDesiredProperties(_) => ThingResourceKind::FeatureDesiredProperties,
            Self::FeatureDesiredProperty(..) => ThingResourceKind::FeatureDesiredProperty,
        }
    }

    pub fn feature_id(&self) -> Option<&str> {
        match self {
            Self::Feature(id)
            | Self::FeatureDefinition(id)
            | Self::FeatureProperties(id)
            | Self::FeatureProperty(id, _)
            | Self::FeatureDesiredProperties(id)
            | Self::FeatureDesiredProperty(id, _) => Some(id),
            _ => None,
        }
    }

    /// The resource path relative to the Thing root.
    pub fn path(&self) -> JsonPointer {
        let feature = |id: &str, tail: &[&str]| {
            let mut keys = vec![fields::FEATURES.to_string(), id.to_string()];
            keys.extend(tail.iter().map(|key| key.to_string()));
            JsonPointer::from_trusted(keys)
        };

        match self {
            Self::Thing => JsonPointer::root(),
            Self::PolicyId => JsonPointer::from_trusted([fields::POLICY_ID]),
            Self::Definition => JsonPointer::from_trusted([fields::DEFINITION]),
            Self::Attributes => JsonPointer::from_trusted([fields::ATTRIBUTES]),
            Self::Attribute(pointer) => JsonPointer::from_trusted([fields::ATTRIBUTES]).append(pointer),
            Self::Features => JsonPointer::from_trusted([fields::FEATURES]),
            Self::Feature(id) => feature(id, &[]),
            Self::FeatureDefinition(id) => feature(id, &[fields::DEFINITION]),
            Self::FeatureProperties(id) => feature(id, &[fields::PROPERTIES]),
            Self::FeatureProperty(id, pointer) => feature(id, &[fields::PROPERTIES]).append(pointer),
            Self::FeatureDesiredProperties(id) => feature(id, &[fields::DESIRED_PROPERTIES]),
            Self::FeatureDesiredProperty(id, pointer) => {
                feature(id, &[fields::DESIRED_PROPERTIES]).append(pointer)
            }
        }
    }

    /// Extract the resource of an already classified path.
    pub fn from_path(kind: ThingResourceKind, path: &JsonPointer) -> Result<Self> {
        let feature_id = || {
            path.get(1)
                .map(str::to_string)
                .ok_or_else(|| ModelError::InvalidPointer(path.to_string()))
        };
        let tail = |level: usize| match path.sub_pointer(level) {
            Some(pointer) if !pointer.is_root() => Ok(pointer),
            _ => Err(ModelError::InvalidPointer(path.to_string())),
        };

        Ok(match kind {
            ThingResourceKind::Thing => Self::Thing,
            ThingResourceKind::PolicyId => Self::PolicyId,
            ThingResourceKind::Definition => Self::Definition,
            ThingResourceKind::Attributes => Self::Attributes,
            ThingResourceKind::Attribute => Self::Attribute(tail(1)?),
            ThingResourceKind::Features => Self::Features,
            ThingResourceKind::Feature => Self::Feature(feature_id()?),
            ThingResourceKind::FeatureDefinition => Self::FeatureDefinition(feature_id()?),
            ThingResourceKind::FeatureProperties => Self::FeatureProperties(feature_id()?),
            ThingResourceKind::FeatureProperty => Self::FeatureProperty(feature_id()?, tail(3)?),
            ThingResourceKind::FeatureDesiredProperties => {
                Self::FeatureDesiredProperties(feature_id()?)
            }
            ThingResourceKind::FeatureDesiredProperty => {
                Self::FeatureDesiredProperty(feature_id()?, tail(3)?)
            }
        })
    }

    /// Check that `value` is a valid representation of this resource.
    pub fn check_value(&self, value: &Value) -> Result<()> {
        match self {
            Self::Thing => Thing::from_json(value).map(drop),
            Self::PolicyId => policy_id_of(value).map(drop),
            Self::Definition => ThingDefinition::from_json(value).map(drop),
            Self::Attributes | Self::FeatureProperties(_) | Self::FeatureDesiredProperties(_) => {
                object_of(self.kind().as_str(), value).map(drop)
            }
            Self::Features => Features::from_json(value).map(drop),
            Self::Feature(id) => Feature::from_json(id.clone(), value).map(drop),
            Self::FeatureDefinition(_) => FeatureDefinition::from_json(value).map(drop),
            Self::Attribute(_) | Self::FeatureProperty(..) | Self::FeatureDesiredProperty(..) => Ok(()),
        }
    }
}

impl fmt::Display for ThingResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.path())
    }
}

pub(crate) fn policy_id_of(value: &Value) -> Result<PolicyId> {
    match value {
        Value::String(id) => PolicyId::parse(id),
        other => Err(ModelError::json("PolicyId", format!("expected string, got {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pointer(s: &str) -> JsonPointer {
        JsonPointer::parse(s).unwrap()
    }

    #[test]
    fn test_paths() {
        assert_eq!(ThingResource::Thing.path().to_string(), "/");
        assert_eq!(
            ThingResource::Attribute(pointer("/location/lat")).path().to_string(),
            "/attributes/location/lat"
        );
        assert_eq!(
            ThingResource::FeatureDesiredProperty("lamp".into(), pointer("/on")).path().to_string(),
            "/features/lamp/desiredProperties/on"
        );
    }

    #[test]
    fn test_from_path() {
        let resource = ThingResource::from_path(
            ThingResourceKind::FeatureProperty,
            &pointer("/features/lamp/properties/color/r"),
        )
        .unwrap();
        assert_eq!(resource, ThingResource::FeatureProperty("lamp".into(), pointer("/color/r")));
        assert_eq!(resource.feature_id(), Some("lamp"));

        for resource in [
            ThingResource::Thing,
            ThingResource::Attribute(pointer("/a")),
            ThingResource::FeatureDefinition("f".into()),
        ] {
            assert_eq!(ThingResource::from_path(resource.kind(), &resource.path()).unwrap(), resource);
        }

        assert!(ThingResource::from_path(ThingResourceKind::Attribute, &pointer("/attributes")).is_err());
    }

    #[test]
    fn test_check_value() {
        assert!(ThingResource::PolicyId.check_value(&json!("ns:policy")).is_ok());
        assert!(ThingResource::PolicyId.check_value(&json!(1)).is_err());
        assert!(ThingResource::Attributes.check_value(&json!([1])).is_err());
        assert!(ThingResource::Attribute(pointer("/a")).check_value(&json!([1])).is_ok());
        assert!(ThingResource::Feature("f".into()).check_value(&json!({"properties": {}})).is_ok());
    }

    #[test]
    fn test_kind_flags() {
        assert!(!ThingResourceKind::PolicyId.is_deletable());
        assert!(ThingResourceKind::Feature.supports_field_selection());
        assert!(!ThingResourceKind::Attribute.supports_field_selection());
        assert_eq!(ThingResourceKind::ALL.len(), 12);
    }
}
