//! Error types for protocol translation.

use thiserror::Error;
use twinlink_model::{Headers, HttpStatus, ModelError, RuntimeError};

/// Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while translating between adaptables and signals.
///
/// Every variant carries the headers of the message in flight so that the
/// caller can correlate the failure with its request.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Topic path does not follow the grammar or has no adapter.
    #[error("Unknown topic path: '{path}'")]
    UnknownTopicPath { path: String, headers: Headers },

    /// Resource path does not match any known resource.
    #[error("Unknown resource path: '{path}'")]
    UnknownPath { path: String, headers: Headers },

    /// Command type is not registered.
    #[error("Unknown command type: '{signal_type}'")]
    UnknownCommand { signal_type: String, headers: Headers },

    /// Command response type is not registered.
    #[error("Unknown command response type: '{signal_type}'")]
    UnknownCommandResponse { signal_type: String, headers: Headers },

    /// Event type is not registered.
    #[error("Unknown event type: '{signal_type}'")]
    UnknownEvent { signal_type: String, headers: Headers },

    /// Signal type is not registered.
    #[error("Unknown signal type: '{signal_type}'")]
    UnknownSignal { signal_type: String, headers: Headers },

    /// Channel is not supported for the signal.
    #[error("Unknown channel: '{channel}'")]
    UnknownChannel { channel: String, headers: Headers },

    /// JSON could not be parsed.
    #[error("Invalid JSON: {source}")]
    Json {
        source: serde_json::Error,
        headers: Headers,
    },

    /// A required field of the adaptable is absent.
    #[error("Missing field: '{field}'")]
    MissingField { field: &'static str, headers: Headers },

    /// A model value could not be built from the payload.
    #[error("Invalid model value: {source}")]
    InvalidModel { source: ModelError, headers: Headers },
}

impl ProtocolError {
    pub fn unknown_topic_path(path: impl Into<String>, headers: &Headers) -> Self {
        Self::UnknownTopicPath {
            path: path.into(),
            headers: headers.clone(),
        }
    }

    pub fn unknown_path(path: impl Into<String>, headers: &Headers) -> Self {
        Self::UnknownPath {
            path: path.into(),
            headers: headers.clone(),
        }
    }

    pub fn unknown_channel(channel: impl Into<String>, headers: &Headers) -> Self {
        Self::UnknownChannel {
            channel: channel.into(),
            headers: headers.clone(),
        }
    }

    pub fn missing_field(field: &'static str, headers: &Headers) -> Self {
        Self::MissingField {
            field,
            headers: headers.clone(),
        }
    }

    /// The headers of the message that failed.
    pub fn headers(&self) -> &Headers {
        match self {
            Self::UnknownTopicPath { headers, .. }
            | Self::UnknownPath { headers, .. }
            | Self::UnknownCommand { headers, .. }
            | Self::UnknownCommandResponse { headers, .. }
            | Self::UnknownEvent { headers, .. }
            | Self::UnknownSignal { headers, .. }
            | Self::UnknownChannel { headers, .. }
            | Self::Json { headers, .. }
            | Self::MissingField { headers, .. }
            | Self::InvalidModel { headers, .. } => headers,
        }
    }

    /// Attach the headers of the message in flight.
    pub fn with_headers(mut self, new_headers: &Headers) -> Self {
        match &mut self {
            Self::UnknownTopicPath { headers, .. }
            | Self::UnknownPath { headers, .. }
            | Self::UnknownCommand { headers, .. }
            | Self::UnknownCommandResponse { headers, .. }
            | Self::UnknownEvent { headers, .. }
            | Self::UnknownSignal { headers, .. }
            | Self::UnknownChannel { headers, .. }
            | Self::Json { headers, .. }
            | Self::MissingField { headers, .. }
            | Self::InvalidModel { headers, .. } => *headers = new_headers.clone(),
        }
        self
    }

    /// Stable machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownTopicPath { .. } => "things:topic.path.unknown",
            Self::UnknownPath { .. } => "things:path.unknown",
            Self::UnknownCommand { .. } => "things:command.unknown",
            Self::UnknownCommandResponse { .. } => "things:command.response.unknown",
            Self::UnknownEvent { .. } => "things:event.unknown",
            Self::UnknownSignal { .. } => "things:signal.unknown",
            Self::UnknownChannel { .. } => "things:channel.unknown",
            Self::Json { .. } => "json.invalid",
            Self::MissingField { .. } => "json.field.missing",
            Self::InvalidModel { .. } => "things:payload.invalid",
        }
    }

    /// Every protocol error is caused by client input.
    pub fn status(&self) -> HttpStatus {
        HttpStatus::BAD_REQUEST
    }

    /// The error as carried by error responses.
    pub fn to_runtime_error(&self) -> RuntimeError {
        RuntimeError::new(self.status(), self.error_code(), self.to_string())
    }
}

impl From<ModelError> for ProtocolError {
    fn from(source: ModelError) -> Self {
        Self::InvalidModel {
            source,
            headers: Headers::new(),
        }
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json {
            source,
            headers: Headers::new(),
        }
    }
}
