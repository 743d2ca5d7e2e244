//! Header map carried by every signal and adaptable.

pub mod definition;

pub use definition::{
    keys, HeaderDefinition, HeaderDefinitions, HeaderValueType, MESSAGE_HEADER_DEFINITIONS,
    STANDARD_HEADER_DEFINITIONS,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Case-insensitive string header map.
///
/// Keys are stored lower-cased; iteration order is the key order, so two maps
/// with the same entries are equal and hash the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    entries: BTreeMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&key.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_ascii_lowercase())
    }

    /// Insert an entry, returning the previous value.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.entries
            .insert(key.as_ref().to_ascii_lowercase(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(&key.to_ascii_lowercase())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Overlay `other` on top of `self`; entries of `other` win.
    pub fn merged_with(mut self, other: &Headers) -> Self {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.get(keys::CORRELATION_ID)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get(keys::CONTENT_TYPE)
    }

    pub fn channel(&self) -> Option<&str> {
        self.get(keys::CHANNEL)
    }

    pub fn is_live_channel(&self) -> bool {
        self.channel()
            .map(|channel| channel.eq_ignore_ascii_case("live"))
            .unwrap_or(false)
    }

    pub fn response_required(&self) -> Option<bool> {
        self.get(keys::RESPONSE_REQUIRED).and_then(|v| v.parse().ok())
    }

    /// Requested acknowledgement labels, from array JSON or a comma-separated list.
    pub fn requested_acks(&self) -> Vec<String> {
        self.get(keys::REQUESTED_ACKS)
            .map(parse_string_list)
            .unwrap_or_default()
    }

    pub fn with_requested_acks<I, S>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let value = serde_json::Value::from(labels).to_string();
        self.with(keys::REQUESTED_ACKS, value)
    }
}

/// Parse a header value holding a list of strings.
///
/// Accepts array JSON (`["a","b"]`) and comma-separated values (`a,b`).
pub fn parse_string_list(value: &str) -> Vec<String> {
    if let Ok(serde_json::Value::Array(items)) = serde_json::from_str(value) {
        return items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();
    }

    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        for (key, value) in iter {
            headers.insert(key, value);
        }
        headers
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
