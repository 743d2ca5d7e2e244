//! Header filters applied by the [`HeaderTranslator`](super::HeaderTranslator).
//!
//! A filter sees one entry at a time and returns the value to keep, or
//! `None` to drop the entry.

use serde_json::Value;
use twinlink_model::headers::{keys, parse_string_list, HeaderDefinitions, HeaderValueType};
use twinlink_model::signal::is_internal_label;

/// One step of a header filter chain.
pub trait HeaderFilter: Send + Sync {
    fn filter(&self, key: &str, value: &str) -> Option<String>;
}

/// Direction a header map travels in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// From an external party into the platform.
    Inbound,
    /// From the platform to an external party.
    Outbound,
}

/// Drops unknown headers when only known ones should be retained.
pub struct ExistenceFilter<'a> {
    pub definitions: &'a HeaderDefinitions,
    pub retain_known_only: bool,
}

impl HeaderFilter for ExistenceFilter<'_> {
    fn filter(&self, key: &str, value: &str) -> Option<String> {
        if self.retain_known_only && !self.definitions.contains(key) {
            return None;
        }
        Some(value.to_string())
    }
}

/// Applies the read/write policy of known headers.
pub struct DirectionFilter<'a> {
    pub definitions: &'a HeaderDefinitions,
    pub direction: Direction,
}

impl HeaderFilter for DirectionFilter<'_> {
    fn filter(&self, key: &str, value: &str) -> Option<String> {
        let allowed = match (self.definitions.get(key), self.direction) {
            (None, _) => true,
            (Some(definition), Direction::Inbound) => definition.read_from_external,
            (Some(definition), Direction::Outbound) => definition.write_to_external,
        };
        allowed.then(|| value.to_string())
    }
}

/// Removes platform-internal labels from `requested-acks`.
pub struct DiscardInternalAckRequestsFilter;

impl HeaderFilter for DiscardInternalAckRequestsFilter {
    fn filter(&self, key: &str, value: &str) -> Option<String> {
        if key != keys::REQUESTED_ACKS {
            return Some(value.to_string());
        }

        let labels = parse_string_list(value);
        let external: Vec<String> = labels
            .iter()
            .filter(|label| !is_internal_label(label))
            .cloned()
            .collect();

        if external.is_empty() {
            None
        } else if external.len() == labels.len() {
            Some(value.to_string())
        } else {
            Some(Value::from(external).to_string())
        }
    }
}

/// Turns comma-separated values of array-typed headers into array JSON.
pub struct ArrayHeaderNormalizer<'a> {
    pub definitions: &'a HeaderDefinitions,
}

impl HeaderFilter for ArrayHeaderNormalizer<'_> {
    fn filter(&self, key: &str, value: &str) -> Option<String> {
        let is_array_header = self
            .definitions
            .get(key)
            .map_or(false, |definition| definition.value_type == HeaderValueType::JsonArray);

        if !is_array_header || HeaderValueType::JsonArray.accepts(value) {
            return Some(value.to_string());
        }
        Some(Value::from(parse_string_list(value)).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existence_filter() {
        let definitions = HeaderDefinitions::all();
        let retain = ExistenceFilter {
            definitions,
            retain_known_only: true,
        };
        assert_eq!(retain.filter("x-custom", "1"), None);
        assert_eq!(retain.filter(keys::CORRELATION_ID, "c"), Some("c".to_string()));

        let pass = ExistenceFilter {
            definitions,
            retain_known_only: false,
        };
        assert_eq!(pass.filter("x-custom", "1"), Some("1".to_string()));
    }

    #[test]
    fn test_direction_filter() {
        let definitions = HeaderDefinitions::all();
        let inbound = DirectionFilter {
            definitions,
            direction: Direction::Inbound,
        };
        let outbound = DirectionFilter {
            definitions,
            direction: Direction::Outbound,
        };

        assert_eq!(inbound.filter(keys::AUTHORIZATION_CONTEXT, "{}"), None);
        assert_eq!(inbound.filter(keys::CHANNEL, "live"), Some("live".to_string()));
        assert_eq!(outbound.filter(keys::CHANNEL, "live"), None);
        assert_eq!(outbound.filter(keys::ORIGINATOR, "nginx:a"), Some("nginx:a".to_string()));
        assert_eq!(inbound.filter(keys::ORIGINATOR, "nginx:a"), None);
        assert_eq!(outbound.filter("x-custom", "v"), Some("v".to_string()));
    }

    #[test]
    fn test_discard_internal_acks() {
        let filter = DiscardInternalAckRequestsFilter;
        assert_eq!(
            filter.filter(keys::REQUESTED_ACKS, r#"["ditto-internal","custom"]"#),
            Some(r#"["custom"]"#.to_string())
        );
        assert_eq!(filter.filter(keys::REQUESTED_ACKS, r#"["ditto-internal"]"#), None);
        assert_eq!(filter.filter(keys::REQUESTED_ACKS, "a-1, b-2"), Some("a-1, b-2".to_string()));
        assert_eq!(filter.filter("other", "ditto-x"), Some("ditto-x".to_string()));
    }

    #[test]
    fn test_array_normalizer() {
        let filter = ArrayHeaderNormalizer {
            definitions: HeaderDefinitions::all(),
        };
        assert_eq!(filter.filter(keys::REQUESTED_ACKS, "a,b"), Some(r#"["a","b"]"#.to_string()));
        assert_eq!(filter.filter(keys::REQUESTED_ACKS, r#"["a"]"#), Some(r#"["a"]"#.to_string()));
        assert_eq!(filter.filter(keys::CORRELATION_ID, "a,b"), Some("a,b".to_string()));
    }
}
