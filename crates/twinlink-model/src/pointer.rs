//! JSON pointers and field selectors.

use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A slash-separated key sequence addressing a location inside a JSON value.
///
/// The string form of the root pointer is `/`, every other pointer renders as
/// `/key1/key2`. Keys are never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JsonPointer {
    keys: Vec<String>,
}

impl JsonPointer {
    /// The empty pointer.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a pointer. Leading and trailing `/` are optional; `""` and `"/"`
    /// are the root. Empty keys in between are rejected.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.strip_prefix('/').unwrap_or(s);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let keys: Vec<String> = trimmed.split('/').map(str::to_string).collect();
        if keys.iter().any(String::is_empty) {
            return Err(ModelError::InvalidPointer(s.to_string()));
        }

        Ok(Self { keys })
    }

    /// Build a pointer from keys. Empty keys are rejected.
    pub fn from_keys<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.iter().any(String::is_empty) {
            return Err(ModelError::InvalidPointer(keys.join("/")));
        }
        Ok(Self { keys })
    }

    /// Build a pointer from keys the caller already knows to be non-empty.
    pub(crate) fn from_trusted<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn get(&self, level: usize) -> Option<&str> {
        self.keys.get(level).map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.get(0)
    }

    /// Pointer to a child key. Empty keys are rejected.
    pub fn with_key(&self, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(ModelError::InvalidPointer(format!("{}/", self)));
        }
        let mut keys = self.keys.clone();
        keys.push(key);
        Ok(Self { keys })
    }

    /// Concatenate two pointers.
    pub fn append(&self, other: &JsonPointer) -> Self {
        let mut keys = self.keys.clone();
        keys.extend(other.keys.iter().cloned());
        Self { keys }
    }

    /// The pointer formed by the keys from `level` on.
    ///
    /// Returns `None` when `level` is past the last key; a `level` equal to
    /// the length yields the root pointer.
    pub fn sub_pointer(&self, level: usize) -> Option<Self> {
        if level > self.keys.len() {
            return None;
        }
        Some(Self {
            keys: self.keys[level..].to_vec(),
        })
    }

    pub fn starts_with(&self, prefix: &JsonPointer) -> bool {
        self.keys.starts_with(&prefix.keys)
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.keys.is_empty() {
            return f.write_str("/");
        }
        for key in &self.keys {
            write!(f, "/{}", key)?;
        }
        Ok(())
    }
}

impl FromStr for JsonPointer {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for JsonPointer {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<JsonPointer> for String {
    fn from(pointer: JsonPointer) -> String {
        pointer.to_string()
    }
}

/// Selection of fields to include in a query result.
///
/// The wire form is the selected pointers joined by `,`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JsonFieldSelector {
    pointers: Vec<JsonPointer>,
}

impl JsonFieldSelector {
    pub fn new(pointers: Vec<JsonPointer>) -> Result<Self> {
        if pointers.is_empty() || pointers.iter().any(JsonPointer::is_root) {
            return Err(ModelError::InvalidPointer(
                "field selector needs at least one non-root pointer".to_string(),
            ));
        }
        Ok(Self { pointers })
    }

    /// Parse a comma-separated list of pointers, e.g. `thingId,attributes/location`.
    pub fn parse(s: &str) -> Result<Self> {
        let pointers = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(JsonPointer::parse)
            .collect::<Result<Vec<_>>>()?;
        Self::new(pointers).map_err(|_| ModelError::InvalidPointer(s.to_string()))
    }

    pub fn pointers(&self) -> &[JsonPointer] {
        &self.pointers
    }
}

impl fmt::Display for JsonFieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.pointers.iter().map(ToString::to_string).collect();
        f.write_str(&joined.join(","))
    }
}

impl FromStr for JsonFieldSelector {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for JsonFieldSelector {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<JsonFieldSelector> for String {
    fn from(selector: JsonFieldSelector) -> String {
        selector.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_pointer() {
        assert!(JsonPointer::parse("").unwrap().is_root());
        assert!(JsonPointer::parse("/").unwrap().is_root());
        assert_eq!(JsonPointer::root().to_string(), "/");
    }

    #[test]
    fn test_parse_and_display() {
        let pointer = JsonPointer::parse("/attributes/location/lat").unwrap();
        assert_eq!(pointer.len(), 3);
        assert_eq!(pointer.first(), Some("attributes"));
        assert_eq!(pointer.to_string(), "/attributes/location/lat");

        let relative = JsonPointer::parse("attributes/location").unwrap();
        assert_eq!(relative.to_string(), "/attributes/location");
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(JsonPointer::parse("/a//b").is_err());
        assert!(JsonPointer::parse("/a//").is_err());
        assert_eq!(JsonPointer::parse("/a/").unwrap().to_string(), "/a");
        assert!(JsonPointer::root().with_key("").is_err());
    }

    #[test]
    fn test_sub_pointer() {
        let pointer = JsonPointer::parse("/features/lamp/properties/on").unwrap();
        assert_eq!(pointer.sub_pointer(3).unwrap().to_string(), "/on");
        assert!(pointer.sub_pointer(4).unwrap().is_root());
        assert!(pointer.sub_pointer(5).is_none());
    }

    #[test]
    fn test_append_and_prefix() {
        let base = JsonPointer::parse("/attributes").unwrap();
        let full = base.append(&JsonPointer::parse("/a/b").unwrap());
        assert_eq!(full.to_string(), "/attributes/a/b");
        assert!(full.starts_with(&base));
        assert!(!base.starts_with(&full));
    }

    #[test]
    fn test_field_selector() {
        let selector = JsonFieldSelector::parse("thingId, attributes/location").unwrap();
        assert_eq!(selector.pointers().len(), 2);
        assert_eq!(selector.to_string(), "/thingId,/attributes/location");

        let reparsed = JsonFieldSelector::parse(&selector.to_string()).unwrap();
        assert_eq!(reparsed, selector);

        assert!(JsonFieldSelector::parse("").is_err());
        assert!(JsonFieldSelector::parse("/").is_err());
    }
}
