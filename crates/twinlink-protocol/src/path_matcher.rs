//! Classification of resource paths.

use crate::error::{ProtocolError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use twinlink_model::signal::{PolicyResourceKind, ThingResourceKind};
use twinlink_model::{Headers, JsonPointer};

/// Maps a resource path to the kind of resource it addresses.
///
/// Patterns are tried in declaration order and every pattern anchors the
/// whole path, so the first match wins.
#[derive(Debug)]
pub struct PathMatcher<K> {
    patterns: Vec<(K, Regex)>,
}

impl<K: Copy> PathMatcher<K> {
    /// Compile `patterns`. Panics on an invalid regex, so only use literals.
    fn of(patterns: &[(K, &str)]) -> Self {
        let patterns = patterns
            .iter()
            .map(|(kind, pattern)| (*kind, Regex::new(pattern).expect("valid path pattern")))
            .collect();
        Self { patterns }
    }

    pub fn matches(&self, path: &JsonPointer) -> Result<K> {
        let path = path.to_string();
        self.patterns
            .iter()
            .find(|(_, regex)| regex.is_match(&path))
            .map(|(kind, _)| *kind)
            .ok_or_else(|| ProtocolError::unknown_path(path, &Headers::new()))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Resource paths of a Thing.
pub static THING_PATHS: Lazy<PathMatcher<ThingResourceKind>> = Lazy::new(|| {
    use ThingResourceKind::*;
    PathMatcher::of(&[
        (Thing, r"^/$"),
        (PolicyId, r"^/policyId$"),
        (Definition, r"^/definition$"),
        (Attributes, r"^/attributes$"),
        (Attribute, r"^/attributes/.+$"),
        (Features, r"^/features$"),
        (Feature, r"^/features/[^/]+$"),
        (FeatureDefinition, r"^/features/[^/]+/definition$"),
        (FeatureProperties, r"^/features/[^/]+/properties$"),
        (FeatureProperty, r"^/features/[^/]+/properties/.+$"),
        (FeatureDesiredProperties, r"^/features/[^/]+/desiredProperties$"),
        (FeatureDesiredProperty, r"^/features/[^/]+/desiredProperties/.+$"),
    ])
});

/// Resource paths of a Policy.
pub static POLICY_PATHS: Lazy<PathMatcher<PolicyResourceKind>> = Lazy::new(|| {
    use PolicyResourceKind::*;
    PathMatcher::of(&[
        (Policy, r"^/$"),
        (PolicyEntries, r"^/entries$"),
        (PolicyEntry, r"^/entries/[^/]+$"),
        (Resources, r"^/entries/[^/]+/resources$"),
        (Resource, r"^/entries/[^/]+/resources/.+$"),
        (Subjects, r"^/entries/[^/]+/subjects$"),
        (Subject, r"^/entries/[^/]+/subjects/[^/]+$"),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    fn thing_kind(path: &str) -> Result<ThingResourceKind> {
        THING_PATHS.matches(&JsonPointer::parse(path).unwrap())
    }

    fn policy_kind(path: &str) -> Result<PolicyResourceKind> {
        POLICY_PATHS.matches(&JsonPointer::parse(path).unwrap())
    }

    #[test]
    fn test_thing_paths() {
        assert_eq!(thing_kind("/").unwrap(), ThingResourceKind::Thing);
        assert_eq!(thing_kind("/policyId").unwrap(), ThingResourceKind::PolicyId);
        assert_eq!(thing_kind("/attributes").unwrap(), ThingResourceKind::Attributes);
        assert_eq!(thing_kind("/attributes/a/b").unwrap(), ThingResourceKind::Attribute);
        assert_eq!(thing_kind("/features/lamp").unwrap(), ThingResourceKind::Feature);
        assert_eq!(
            thing_kind("/features/lamp/properties/color/r").unwrap(),
            ThingResourceKind::FeatureProperty
        );
        assert_eq!(
            thing_kind("/features/lamp/desiredProperties").unwrap(),
            ThingResourceKind::FeatureDesiredProperties
        );
    }

    #[test]
    fn test_unknown_paths() {
        assert!(matches!(thing_kind("/unknown"), Err(ProtocolError::UnknownPath { .. })));
        assert!(thing_kind("/features/lamp/other").is_err());
        assert!(thing_kind("/policyId/x").is_err());
        assert!(policy_kind("/entries/owner/other").is_err());
    }

    #[test]
    fn test_policy_paths() {
        assert_eq!(policy_kind("/").unwrap(), PolicyResourceKind::Policy);
        assert_eq!(policy_kind("/entries/owner").unwrap(), PolicyResourceKind::PolicyEntry);
        assert_eq!(
            policy_kind("/entries/owner/resources/thing:/features").unwrap(),
            PolicyResourceKind::Resource
        );
        assert_eq!(
            policy_kind("/entries/owner/subjects/nginx:admin").unwrap(),
            PolicyResourceKind::Subject
        );
    }

    #[test]
    fn test_every_kind_is_covered() {
        assert_eq!(THING_PATHS.len(), ThingResourceKind::ALL.len());
        assert_eq!(POLICY_PATHS.len(), PolicyResourceKind::ALL.len());
        for kind in ThingResourceKind::ALL {
            assert!(THING_PATHS.patterns.iter().any(|(k, _)| *k == kind));
        }
    }
}
