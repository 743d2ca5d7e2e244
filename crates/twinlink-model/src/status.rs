//! HTTP-like status codes carried by responses, errors and acknowledgements.

use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A status code in the range 100..=599.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct HttpStatus(u16);

impl HttpStatus {
    pub const OK: HttpStatus = HttpStatus(200);
    pub const CREATED: HttpStatus = HttpStatus(201);
    pub const ACCEPTED: HttpStatus = HttpStatus(202);
    pub const NO_CONTENT: HttpStatus = HttpStatus(204);
    pub const BAD_REQUEST: HttpStatus = HttpStatus(400);
    pub const UNAUTHORIZED: HttpStatus = HttpStatus(401);
    pub const FORBIDDEN: HttpStatus = HttpStatus(403);
    pub const NOT_FOUND: HttpStatus = HttpStatus(404);
    pub const REQUEST_TIMEOUT: HttpStatus = HttpStatus(408);
    pub const CONFLICT: HttpStatus = HttpStatus(409);
    pub const PRECONDITION_FAILED: HttpStatus = HttpStatus(412);
    pub const INTERNAL_SERVER_ERROR: HttpStatus = HttpStatus(500);
    pub const SERVICE_UNAVAILABLE: HttpStatus = HttpStatus(503);

    pub fn from_code(code: u16) -> Result<Self> {
        if (100..=599).contains(&code) {
            Ok(Self(code))
        } else {
            Err(ModelError::InvalidStatus(code))
        }
    }

    pub fn code(&self) -> u16 {
        self.0
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.0)
    }

    pub fn is_server_error(&self) -> bool {
        self.0 >= 500
    }

    /// Client or server error.
    pub fn is_error(&self) -> bool {
        self.0 >= 400
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for HttpStatus {
    type Error = ModelError;

    fn try_from(code: u16) -> Result<Self> {
        Self::from_code(code)
    }
}

impl From<HttpStatus> for u16 {
    fn from(status: HttpStatus) -> u16 {
        status.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        assert!(HttpStatus::OK.is_success());
        assert!(HttpStatus::NOT_FOUND.is_client_error());
        assert!(HttpStatus::NOT_FOUND.is_error());
        assert!(HttpStatus::INTERNAL_SERVER_ERROR.is_server_error());
        assert!(!HttpStatus::NO_CONTENT.is_error());
    }

    #[test]
    fn test_from_code() {
        assert_eq!(HttpStatus::from_code(404).unwrap(), HttpStatus::NOT_FOUND);
        assert!(HttpStatus::from_code(99).is_err());
        assert!(HttpStatus::from_code(600).is_err());
        assert!(serde_json::from_value::<HttpStatus>(serde_json::json!(700)).is_err());
    }
}
