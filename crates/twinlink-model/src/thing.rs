//! Thing entity: the digital twin of a device.
//!
//! ```text
//! {
//!   "thingId": "org.eclipse.ditto:lamp-1",
//!   "policyId": "org.eclipse.ditto:lamp-policy",
//!   "definition": "org.eclipse.ditto:lamp:1.0.0",
//!   "attributes": { "location": "kitchen" },
//!   "features": {
//!     "light": {
//!       "definition": ["org.eclipse.ditto:light:1.0.0"],
//!       "properties": { "on": true },
//!       "desiredProperties": { "on": false }
//!     }
//!   }
//! }
//! ```

use crate::error::{ModelError, Result};
use crate::id::{PolicyId, ThingId};
use crate::JsonObject;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

pub mod fields {
    pub const THING_ID: &str = "thingId";
    pub const POLICY_ID: &str = "policyId";
    pub const DEFINITION: &str = "definition";
    pub const ATTRIBUTES: &str = "attributes";
    pub const FEATURES: &str = "features";
    pub const PROPERTIES: &str = "properties";
    pub const DESIRED_PROPERTIES: &str = "desiredProperties";
}

/// Reference to the model a Thing follows, e.g. `ns:name:version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThingDefinition(String);

impl ThingDefinition {
    pub fn new(definition: impl Into<String>) -> Result<Self> {
        let definition = definition.into();
        if definition.trim().is_empty() {
            return Err(ModelError::InvalidDefinition(
                "thing definition must not be empty".to_string(),
            ));
        }
        Ok(Self(definition))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Self::new(s.clone()),
            other => Err(ModelError::json("ThingDefinition", format!("expected string, got {}", other))),
        }
    }

    pub fn to_json(&self) -> Value {
        Value::String(self.0.clone())
    }
}

impl TryFrom<String> for ThingDefinition {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<ThingDefinition> for String {
    fn from(definition: ThingDefinition) -> String {
        definition.0
    }
}

/// Non-empty list of definition identifiers a Feature implements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureDefinition(Vec<String>);

impl FeatureDefinition {
    pub fn new<I, S>(identifiers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let identifiers: Vec<String> = identifiers.into_iter().map(Into::into).collect();
        if identifiers.is_empty() || identifiers.iter().any(|id| id.trim().is_empty()) {
            return Err(ModelError::InvalidDefinition(
                "feature definition needs at least one non-empty identifier".to_string(),
            ));
        }
        Ok(Self(identifiers))
    }

    pub fn identifiers(&self) -> &[String] {
        &self.0
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| ModelError::json("FeatureDefinition", "expected array"))?;
        let identifiers = items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ModelError::json("FeatureDefinition", "expected string identifiers"))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(identifiers)
    }

    pub fn to_json(&self) -> Value {
        Value::from(self.0.clone())
    }
}

impl TryFrom<Vec<String>> for FeatureDefinition {
    type Error = ModelError;

    fn try_from(identifiers: Vec<String>) -> Result<Self> {
        Self::new(identifiers)
    }
}

impl From<FeatureDefinition> for Vec<String> {
    fn from(definition: FeatureDefinition) -> Vec<String> {
        definition.0
    }
}

/// A Feature of a Thing. The id is the key under `features`, not part of the body.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    id: String,
    pub definition: Option<FeatureDefinition>,
    pub properties: Option<JsonObject>,
    pub desired_properties: Option<JsonObject>,
}

impl Feature {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        validate_feature_id(&id)?;
        Ok(Self {
            id,
            definition: None,
            properties: None,
            desired_properties: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn with_definition(mut self, definition: FeatureDefinition) -> Self {
        self.definition = Some(definition);
        self
    }

    pub fn with_properties(mut self, properties: JsonObject) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_desired_properties(mut self, desired: JsonObject) -> Self {
        self.desired_properties = Some(desired);
        self
    }

    /// Parse the body of the feature with the given id.
    pub fn from_json(id: impl Into<String>, value: &Value) -> Result<Self> {
        let mut feature = Self::new(id)?;
        let body = value
            .as_object()
            .ok_or_else(|| ModelError::json("Feature", "expected object"))?;

        if let Some(definition) = body.get(fields::DEFINITION) {
            feature.definition = Some(FeatureDefinition::from_json(definition)?);
        }
        if let Some(properties) = body.get(fields::PROPERTIES) {
            feature.properties = Some(object_of("Feature properties", properties)?);
        }
        if let Some(desired) = body.get(fields::DESIRED_PROPERTIES) {
            feature.desired_properties = Some(object_of("Feature desiredProperties", desired)?);
        }
        Ok(feature)
    }

    /// The feature body, without its id.
    pub fn to_json(&self) -> Value {
        let mut body = JsonObject::new();
        if let Some(definition) = &self.definition {
            body.insert(fields::DEFINITION.to_string(), definition.to_json());
        }
        if let Some(properties) = &self.properties {
            body.insert(fields::PROPERTIES.to_string(), Value::Object(properties.clone()));
        }
        if let Some(desired) = &self.desired_properties {
            body.insert(fields::DESIRED_PROPERTIES.to_string(), Value::Object(desired.clone()));
        }
        Value::Object(body)
    }
}

fn validate_feature_id(id: &str) -> Result<()> {
    if id.is_empty() || id.contains('/') {
        return Err(ModelError::InvalidPointer(format!("invalid feature id '{}'", id)));
    }
    Ok(())
}

/// Expect a JSON object.
pub(crate) fn object_of(expected: &'static str, value: &Value) -> Result<JsonObject> {
    value
        .as_object()
        .cloned()
        .ok_or_else(|| ModelError::json(expected, "expected object"))
}

/// All features of a Thing keyed by feature id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Features {
    features: BTreeMap<String, Feature>,
}

impl Features {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.insert(feature.id.clone(), feature);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Feature> {
        self.features.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| ModelError::json("Features", "expected object"))?;
        let mut features = Features::new();
        for (id, body) in map {
            features = features.with_feature(Feature::from_json(id.clone(), body)?);
        }
        Ok(features)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.features
                .iter()
                .map(|(id, feature)| (id.clone(), feature.to_json()))
                .collect(),
        )
    }
}

impl Serialize for Features {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Features {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Features::from_json(&value).map_err(de::Error::custom)
    }
}

impl Serialize for Feature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// The Thing entity. Every part is optional so partial (field-selected)
/// representations fit the same type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thing {
    #[serde(default)]
    pub thing_id: Option<ThingId>,
    #[serde(default)]
    pub policy_id: Option<PolicyId>,
    #[serde(default)]
    pub definition: Option<ThingDefinition>,
    #[serde(default)]
    pub attributes: Option<JsonObject>,
    #[serde(default)]
    pub features: Option<Features>,
}

impl Thing {
    pub fn new(thing_id: ThingId) -> Self {
        Self {
            thing_id: Some(thing_id),
            ..Default::default()
        }
    }

    pub fn with_policy_id(mut self, policy_id: PolicyId) -> Self {
        self.policy_id = Some(policy_id);
        self
    }

    pub fn with_definition(mut self, definition: ThingDefinition) -> Self {
        self.definition = Some(definition);
        self
    }

    pub fn with_attributes(mut self, attributes: JsonObject) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes
            .get_or_insert_with(JsonObject::new)
            .insert(key.into(), value);
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        let features = self.features.take().unwrap_or_default();
        self.features = Some(features.with_feature(feature));
        self
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        Self::deserialize(value).map_err(|e| ModelError::json("Thing", e))
    }

    pub fn to_json(&self) -> Value {
        let mut object = JsonObject::new();
        if let Some(thing_id) = &self.thing_id {
            object.insert(fields::THING_ID.to_string(), Value::String(thing_id.to_string()));
        }
        if let Some(policy_id) = &self.policy_id {
            object.insert(fields::POLICY_ID.to_string(), Value::String(policy_id.to_string()));
        }
        if let Some(definition) = &self.definition {
            object.insert(fields::DEFINITION.to_string(), definition.to_json());
        }
        if let Some(attributes) = &self.attributes {
            object.insert(fields::ATTRIBUTES.to_string(), Value::Object(attributes.clone()));
        }
        if let Some(features) = &self.features {
            object.insert(fields::FEATURES.to_string(), features.to_json());
        }
        Value::Object(object)
    }
}

impl Serialize for Thing {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
