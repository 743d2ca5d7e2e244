use super::THINGS;
use crate::headers::Headers;
use crate::id::{EntityId, ThingId};
use crate::runtime_error::RuntimeError;
use crate::signal::SignalInfo;
use crate::status::HttpStatus;

/// A failed Thing command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThingErrorResponse {
    pub thing_id: ThingId,
    pub error: RuntimeError,
    pub headers: Headers,
}

impl ThingErrorResponse {
    pub fn new(thing_id: ThingId, error: RuntimeError, headers: Headers) -> Self {
        Self {
            thing_id,
            error,
            headers,
        }
    }

    pub fn status(&self) -> HttpStatus {
        self.error.status
    }
}

impl SignalInfo for ThingErrorResponse {
    fn signal_type(&self) -> String {
        format!("{}.errors:error", THINGS)
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn entity_id(&self) -> Option<&EntityId> {
        Some(self.thing_id.entity_id())
    }
}
