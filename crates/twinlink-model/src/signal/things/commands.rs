//! Commands addressed to a Thing.

use super::resource::{policy_id_of, ThingResource, ThingResourceKind};
use super::THINGS;
use crate::error::{ModelError, Result};
use crate::headers::Headers;
use crate::id::{EntityId, PolicyId, ThingId};
use crate::pointer::{JsonFieldSelector, JsonPointer};
use crate::signal::{command_name, ModifyAction, SignalInfo, RETRIEVE};
use crate::thing::{object_of, Feature, FeatureDefinition, Features, Thing, ThingDefinition};
use crate::JsonObject;
use serde_json::Value;

/// Every state-changing Thing command.
#[derive(Debug, Clone, PartialEq)]
pub enum ThingModifyKind {
    CreateThing(Thing),
    ModifyThing(Thing),
    DeleteThing,
    ModifyPolicyId(PolicyId),
    ModifyDefinition(ThingDefinition),
    DeleteDefinition,
    ModifyAttributes(JsonObject),
    DeleteAttributes,
    ModifyAttribute { pointer: JsonPointer, value: Value },
    DeleteAttribute { pointer: JsonPointer },
    ModifyFeatures(Features),
    DeleteFeatures,
    ModifyFeature(Feature),
    DeleteFeature { feature_id: String },
    ModifyFeatureDefinition { feature_id: String, definition: FeatureDefinition },
    DeleteFeatureDefinition { feature_id: String },
    ModifyFeatureProperties { feature_id: String, properties: JsonObject },
    DeleteFeatureProperties { feature_id: String },
    ModifyFeatureProperty { feature_id: String, pointer: JsonPointer, value: Value },
    DeleteFeatureProperty { feature_id: String, pointer: JsonPointer },
    ModifyFeatureDesiredProperties { feature_id: String, properties: JsonObject },
    DeleteFeatureDesiredProperties { feature_id: String },
    ModifyFeatureDesiredProperty { feature_id: String, pointer: JsonPointer, value: Value },
    DeleteFeatureDesiredProperty { feature_id: String, pointer: JsonPointer },
}

impl ThingModifyKind {
    pub fn action(&self) -> ModifyAction {
        use ThingModifyKind::*;
        match self {
            CreateThing(_) => ModifyAction::Create,
            DeleteThing
            | DeleteDefinition
            | DeleteAttributes
            | DeleteAttribute { .. }
            | DeleteFeatures
            | DeleteFeature { .. }
            | DeleteFeatureDefinition { .. }
            | DeleteFeatureProperties { .. }
            | DeleteFeatureProperty { .. }
            | DeleteFeatureDesiredProperties { .. }
            | DeleteFeatureDesiredProperty { .. } => ModifyAction::Delete,
            _ => ModifyAction::Modify,
        }
    }

    pub fn resource(&self) -> ThingResource {
        use ThingModifyKind::*;
        match self {
            CreateThing(_) | ModifyThing(_) | DeleteThing => ThingResource::Thing,
            ModifyPolicyId(_) => ThingResource::PolicyId,
            ModifyDefinition(_) | DeleteDefinition => ThingResource::Definition,
            ModifyAttributes(_) | DeleteAttributes => ThingResource::Attributes,
            ModifyAttribute { pointer, .. } | DeleteAttribute { pointer } => {
                ThingResource::Attribute(pointer.clone())
            }
            ModifyFeatures(_) | DeleteFeatures => ThingResource::Features,
            ModifyFeature(feature) => ThingResource::Feature(feature.id().to_string()),
            DeleteFeature { feature_id } => ThingResource::Feature(feature_id.clone()),
            ModifyFeatureDefinition { feature_id, .. } | DeleteFeatureDefinition { feature_id } => {
                ThingResource::FeatureDefinition(feature_id.clone())
            }
            ModifyFeatureProperties { feature_id, .. } | DeleteFeatureProperties { feature_id } => {
                ThingResource::FeatureProperties(feature_id.clone())
            }
            ModifyFeatureProperty { feature_id, pointer, .. }
            | DeleteFeatureProperty { feature_id, pointer } => {
                ThingResource::FeatureProperty(feature_id.clone(), pointer.clone())
            }
            ModifyFeatureDesiredProperties { feature_id, .. }
            | DeleteFeatureDesiredProperties { feature_id } => {
                ThingResource::FeatureDesiredProperties(feature_id.clone())
            }
            ModifyFeatureDesiredProperty { feature_id, pointer, .. }
            | DeleteFeatureDesiredProperty { feature_id, pointer } => {
                ThingResource::FeatureDesiredProperty(feature_id.clone(), pointer.clone())
            }
        }
    }

    /// The JSON value the command writes. Deletes carry none.
    pub fn value(&self) -> Option<Value> {
        use ThingModifyKind::*;
        match self {
            CreateThing(thing) | ModifyThing(thing) => Some(thing.to_json()),
            ModifyPolicyId(policy_id) => Some(Value::String(policy_id.to_string())),
            ModifyDefinition(definition) => Some(definition.to_json()),
            ModifyAttributes(attributes) => Some(Value::Object(attributes.clone())),
            ModifyAttribute { value, .. }
            | ModifyFeatureProperty { value, .. }
            | ModifyFeatureDesiredProperty { value, .. } => Some(value.clone()),
            ModifyFeatures(features) => Some(features.to_json()),
            ModifyFeature(feature) => Some(feature.to_json()),
            ModifyFeatureDefinition { definition, .. } => Some(definition.to_json()),
            ModifyFeatureProperties { properties, .. }
            | ModifyFeatureDesiredProperties { properties, .. } => Some(Value::Object(properties.clone())),
            _ => None,
        }
    }

    /// Command name, e.g. `modifyFeatureProperty`.
    pub fn name(&self) -> String {
        command_name(self.action().as_str(), self.resource().kind().as_str())
    }

    /// Assemble a command from its action, address and written value.
    pub fn from_parts(action: ModifyAction, resource: ThingResource, value: Option<&Value>) -> Result<Self> {
        let kind = resource.kind();
        let required = || value.ok_or_else(|| ModelError::json(kind.as_str(), "missing value"));

        Ok(match (action, resource) {
            (ModifyAction::Create, ThingResource::Thing) => Self::CreateThing(Thing::from_json(required()?)?),
            (ModifyAction::Create, _) => return Err(ModelError::unsupported(action.as_str(), kind.as_str())),
            (ModifyAction::Delete, ThingResource::PolicyId) => {
                return Err(ModelError::unsupported(action.as_str(), kind.as_str()))
            }

            (ModifyAction::Modify, ThingResource::Thing) => Self::ModifyThing(Thing::from_json(required()?)?),
            (ModifyAction::Modify, ThingResource::PolicyId) => Self::ModifyPolicyId(policy_id_of(required()?)?),
            (ModifyAction::Modify, ThingResource::Definition) => {
                Self::ModifyDefinition(ThingDefinition::from_json(required()?)?)
            }
            (ModifyAction::Modify, ThingResource::Attributes) => {
                Self::ModifyAttributes(object_of("attributes", required()?)?)
            }
            (ModifyAction::Modify, ThingResource::Attribute(pointer)) => Self::ModifyAttribute {
                pointer,
                value: required()?.clone(),
            },
            (ModifyAction::Modify, ThingResource::Features) => Self::ModifyFeatures(Features::from_json(required()?)?),
            (ModifyAction::Modify, ThingResource::Feature(feature_id)) => {
                Self::ModifyFeature(Feature::from_json(feature_id, required()?)?)
            }
            (ModifyAction::Modify, ThingResource::FeatureDefinition(feature_id)) => Self::ModifyFeatureDefinition {
                feature_id,
                definition: FeatureDefinition::from_json(required()?)?,
            },
            (ModifyAction::Modify, ThingResource::FeatureProperties(feature_id)) => Self::ModifyFeatureProperties {
                feature_id,
                properties: object_of("properties", required()?)?,
            },
            (ModifyAction::Modify, ThingResource::FeatureProperty(feature_id, pointer)) => {
                Self::ModifyFeatureProperty {
                    feature_id,
                    pointer,
                    value: required()?.clone(),
                }
            }
            (ModifyAction::Modify, ThingResource::FeatureDesiredProperties(feature_id)) => {
                Self::ModifyFeatureDesiredProperties {
                    feature_id,
                    properties: object_of("desiredProperties", required()?)?,
                }
            }
            (ModifyAction::Modify, ThingResource::FeatureDesiredProperty(feature_id, pointer)) => {
                Self::ModifyFeatureDesiredProperty {
                    feature_id,
                    pointer,
                    value: required()?.clone(),
                }
            }

            (ModifyAction::Delete, ThingResource::Thing) => Self::DeleteThing,
            (ModifyAction::Delete, ThingResource::Definition) => Self::DeleteDefinition,
            (ModifyAction::Delete, ThingResource::Attributes) => Self::DeleteAttributes,
            (ModifyAction::Delete, ThingResource::Attribute(pointer)) => Self::DeleteAttribute { pointer },
            (ModifyAction::Delete, ThingResource::Features) => Self::DeleteFeatures,
            (ModifyAction::Delete, ThingResource::Feature(feature_id)) => Self::DeleteFeature { feature_id },
            (ModifyAction::Delete, ThingResource::FeatureDefinition(feature_id)) => {
                Self::DeleteFeatureDefinition { feature_id }
            }
            (ModifyAction::Delete, ThingResource::FeatureProperties(feature_id)) => {
                Self::DeleteFeatureProperties { feature_id }
            }
            (ModifyAction::Delete, ThingResource::FeatureProperty(feature_id, pointer)) => {
                Self::DeleteFeatureProperty { feature_id, pointer }
            }
            (ModifyAction::Delete, ThingResource::FeatureDesiredProperties(feature_id)) => {
                Self::DeleteFeatureDesiredProperties { feature_id }
            }
            (ModifyAction::Delete, ThingResource::FeatureDesiredProperty(feature_id, pointer)) => {
                Self::DeleteFeatureDesiredProperty { feature_id, pointer }
            }
        })
    }

    /// Whether `action` is defined for resources of `kind`.
    pub fn supports(action: ModifyAction, kind: ThingResourceKind) -> bool {
        match action {
            ModifyAction::Create => kind == ThingResourceKind::Thing,
            ModifyAction::Modify => true,
            ModifyAction::Delete => kind.is_deletable(),
        }
    }
}

/// A command that changes a Thing.
#[derive(Debug, Clone, PartialEq)]
pub struct ThingModifyCommand {
    pub thing_id: ThingId,
    pub kind: ThingModifyKind,
    pub headers: Headers,
}

impl ThingModifyCommand {
    pub fn new(thing_id: ThingId, kind: ThingModifyKind, headers: Headers) -> Self {
        Self {
            thing_id,
            kind,
            headers,
        }
    }
}

impl SignalInfo for ThingModifyCommand {
    fn signal_type(&self) -> String {
        format!("{}.commands:{}", THINGS, self.kind.name())
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn entity_id(&self) -> Option<&EntityId> {
        Some(self.thing_id.entity_id())
    }
}

/// Every read-only Thing command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThingQueryKind {
    RetrieveThing { fields: Option<JsonFieldSelector> },
    RetrievePolicyId,
    RetrieveDefinition,
    RetrieveAttributes { fields: Option<JsonFieldSelector> },
    RetrieveAttribute { pointer: JsonPointer },
    RetrieveFeatures { fields: Option<JsonFieldSelector> },
    RetrieveFeature { feature_id: String, fields: Option<JsonFieldSelector> },
    RetrieveFeatureDefinition { feature_id: String },
    RetrieveFeatureProperties { feature_id: String, fields: Option<JsonFieldSelector> },
    RetrieveFeatureProperty { feature_id: String, pointer: JsonPointer },
    RetrieveFeatureDesiredProperties { feature_id: String, fields: Option<JsonFieldSelector> },
    RetrieveFeatureDesiredProperty { feature_id: String, pointer: JsonPointer },
}

impl ThingQueryKind {
    pub fn resource(&self) -> ThingResource {
        use ThingQueryKind::*;
        match self {
            RetrieveThing { .. } => ThingResource::Thing,
            RetrievePolicyId => ThingResource::PolicyId,
            RetrieveDefinition => ThingResource::Definition,
            RetrieveAttributes { .. } => ThingResource::Attributes,
            RetrieveAttribute { pointer } => ThingResource::Attribute(pointer.clone()),
            RetrieveFeatures { .. } => ThingResource::Features,
            RetrieveFeature { feature_id, .. } => ThingResource::Feature(feature_id.clone()),
            RetrieveFeatureDefinition { feature_id } => ThingResource::FeatureDefinition(feature_id.clone()),
            RetrieveFeatureProperties { feature_id, .. } => ThingResource::FeatureProperties(feature_id.clone()),
            RetrieveFeatureProperty { feature_id, pointer } => {
                ThingResource::FeatureProperty(feature_id.clone(), pointer.clone())
            }
            RetrieveFeatureDesiredProperties { feature_id, .. } => {
                ThingResource::FeatureDesiredProperties(feature_id.clone())
            }
            RetrieveFeatureDesiredProperty { feature_id, pointer } => {
                ThingResource::FeatureDesiredProperty(feature_id.clone(), pointer.clone())
            }
        }
    }

    pub fn fields(&self) -> Option<&JsonFieldSelector> {
        use ThingQueryKind::*;
        match self {
            RetrieveThing { fields }
            | RetrieveAttributes { fields }
            | RetrieveFeatures { fields }
            | RetrieveFeature { fields, .. }
            | RetrieveFeatureProperties { fields, .. }
            | RetrieveFeatureDesiredProperties { fields, .. } => fields.as_ref(),
            _ => None,
        }
    }

    pub fn name(&self) -> String {
        command_name(RETRIEVE, self.resource().kind().as_str())
    }

    /// Assemble a query. A selector is only accepted on kinds with field selection.
    pub fn from_parts(resource: ThingResource, fields: Option<JsonFieldSelector>) -> Result<Self> {
        let kind = resource.kind();
        if fields.is_some() && !kind.supports_field_selection() {
            return Err(ModelError::unsupported("field selection", kind.as_str()));
        }

        Ok(match resource {
            ThingResource::Thing => Self::RetrieveThing { fields },
            ThingResource::PolicyId => Self::RetrievePolicyId,
            ThingResource::Definition => Self::RetrieveDefinition,
            ThingResource::Attributes => Self::RetrieveAttributes { fields },
            ThingResource::Attribute(pointer) => Self::RetrieveAttribute { pointer },
            ThingResource::Features => Self::RetrieveFeatures { fields },
            ThingResource::Feature(feature_id) => Self::RetrieveFeature { feature_id, fields },
            ThingResource::FeatureDefinition(feature_id) => Self::RetrieveFeatureDefinition { feature_id },
            ThingResource::FeatureProperties(feature_id) => Self::RetrieveFeatureProperties { feature_id, fields },
            ThingResource::FeatureProperty(feature_id, pointer) => {
                Self::RetrieveFeatureProperty { feature_id, pointer }
            }
            ThingResource::FeatureDesiredProperties(feature_id) => {
                Self::RetrieveFeatureDesiredProperties { feature_id, fields }
            }
            ThingResource::FeatureDesiredProperty(feature_id, pointer) => {
                Self::RetrieveFeatureDesiredProperty { feature_id, pointer }
            }
        })
    }
}

/// A command that reads (part of) a Thing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThingQueryCommand {
    pub thing_id: ThingId,
    pub kind: ThingQueryKind,
    pub headers: Headers,
}

impl ThingQueryCommand {
    pub fn new(thing_id: ThingId, kind: ThingQueryKind, headers: Headers) -> Self {
        Self {
            thing_id,
            kind,
            headers,
        }
    }
}

impl SignalInfo for ThingQueryCommand {
    fn signal_type(&self) -> String {
        format!("{}.commands:{}", THINGS, self.kind.name())
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn entity_id(&self) -> Option<&EntityId> {
        Some(self.thing_id.entity_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn thing_id() -> ThingId {
        ThingId::parse("org.eclipse.ditto:lamp").unwrap()
    }

    #[test]
    fn test_modify_attribute_type() {
        let command = ThingModifyCommand::new(
            thing_id(),
            ThingModifyKind::ModifyAttribute {
                pointer: JsonPointer::parse("/location").unwrap(),
                value: json!("kitchen"),
            },
            Headers::new(),
        );
        assert_eq!(command.signal_type(), "things.commands:modifyAttribute");
        assert_eq!(command.kind.resource().path().to_string(), "/attributes/location");
        assert_eq!(command.kind.value(), Some(json!("kitchen")));
    }

    #[test]
    fn test_from_parts() {
        let kind = ThingModifyKind::from_parts(
            ModifyAction::Modify,
            ThingResource::FeatureProperties("lamp".into()),
            Some(&json!({"on": true})),
        )
        .unwrap();
        assert_eq!(kind.name(), "modifyFeatureProperties");
        assert_eq!(kind.action(), ModifyAction::Modify);

        let delete = ThingModifyKind::from_parts(ModifyAction::Delete, ThingResource::Features, None).unwrap();
        assert_eq!(delete, ThingModifyKind::DeleteFeatures);
        assert_eq!(delete.value(), None);
    }

    #[test]
    fn test_unsupported_combinations() {
        assert!(ThingModifyKind::from_parts(ModifyAction::Delete, ThingResource::PolicyId, None).is_err());
        assert!(ThingModifyKind::from_parts(ModifyAction::Create, ThingResource::Attributes, Some(&json!({}))).is_err());
        assert!(ThingModifyKind::from_parts(ModifyAction::Modify, ThingResource::Attributes, None).is_err());
        assert!(ThingModifyKind::from_parts(ModifyAction::Modify, ThingResource::Attributes, Some(&json!(1))).is_err());
        assert!(!ThingModifyKind::supports(ModifyAction::Create, ThingResourceKind::Feature));
    }

    #[test]
    fn test_query_fields() {
        let selector = JsonFieldSelector::parse("attributes,features/lamp").unwrap();
        let query = ThingQueryKind::from_parts(ThingResource::Thing, Some(selector.clone())).unwrap();
        assert_eq!(query.fields(), Some(&selector));
        assert_eq!(query.name(), "retrieveThing");

        let query = ThingQueryKind::from_parts(ThingResource::PolicyId, None).unwrap();
        assert_eq!(query, ThingQueryKind::RetrievePolicyId);
        assert!(query.fields().is_none());

        let attribute = ThingResource::Attribute(JsonPointer::parse("/x").unwrap());
        assert!(matches!(
            ThingQueryKind::from_parts(attribute, Some(selector)),
            Err(ModelError::UnsupportedAction { .. })
        ));
    }
}
