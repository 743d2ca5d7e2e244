//! Protocol adapter configuration.
//!
//! Defaults live in [`defaults`], the environment variables overriding them in
//! [`env_vars`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default configuration values.
pub mod defaults {
    /// Content type of every non-message adaptable produced by the adapter.
    pub const CONTENT_TYPE: &str = "application/vnd.eclipse.ditto+json";
    pub const RETAIN_KNOWN_HEADERS_ONLY: bool = false;
    pub const DISCARD_INTERNAL_ACK_REQUESTS: bool = true;
    pub const INCLUDE_MESSAGE_HEADERS: bool = true;
}

/// Environment variable names.
pub mod env_vars {
    pub const CONTENT_TYPE: &str = "TWINLINK_CONTENT_TYPE";
    pub const RETAIN_KNOWN_HEADERS_ONLY: &str = "TWINLINK_RETAIN_KNOWN_HEADERS_ONLY";
    pub const DISCARD_INTERNAL_ACK_REQUESTS: &str = "TWINLINK_DISCARD_INTERNAL_ACK_REQUESTS";
    pub const INCLUDE_MESSAGE_HEADERS: &str = "TWINLINK_INCLUDE_MESSAGE_HEADERS";
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings of a [`ProtocolAdapter`](crate::ProtocolAdapter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Content type forced onto outbound non-message adaptables.
    pub content_type: String,
    /// Drop headers without a definition when writing to external parties.
    pub retain_known_headers_only: bool,
    /// Strip platform-internal labels from outbound `requested-acks`.
    pub discard_internal_ack_requests: bool,
    /// Synthesize message headers on message signals.
    pub include_message_headers: bool,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            content_type: defaults::CONTENT_TYPE.to_string(),
            retain_known_headers_only: defaults::RETAIN_KNOWN_HEADERS_ONLY,
            discard_internal_ack_requests: defaults::DISCARD_INTERNAL_ACK_REQUESTS,
            include_message_headers: defaults::INCLUDE_MESSAGE_HEADERS,
        }
    }
}

impl ProtocolConfig {
    /// Load the configuration from `TWINLINK_*` variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through `lookup`, which maps variable names to values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|value| parse_flag(&value))
                .unwrap_or(default)
        };

        Self {
            content_type: lookup(env_vars::CONTENT_TYPE).unwrap_or_else(|| defaults::CONTENT_TYPE.to_string()),
            retain_known_headers_only: flag(env_vars::RETAIN_KNOWN_HEADERS_ONLY, defaults::RETAIN_KNOWN_HEADERS_ONLY),
            discard_internal_ack_requests: flag(
                env_vars::DISCARD_INTERNAL_ACK_REQUESTS,
                defaults::DISCARD_INTERNAL_ACK_REQUESTS,
            ),
            include_message_headers: flag(env_vars::INCLUDE_MESSAGE_HEADERS, defaults::INCLUDE_MESSAGE_HEADERS),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let content_type = self.content_type.trim();
        if content_type.is_empty() {
            return Err(ConfigError::Invalid("content_type must not be empty".to_string()));
        }
        if !content_type.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "content_type '{}' is not a media type",
                content_type
            )));
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
