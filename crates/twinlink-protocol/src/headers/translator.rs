use super::filters::{
    ArrayHeaderNormalizer, Direction, DirectionFilter, DiscardInternalAckRequestsFilter, ExistenceFilter,
    HeaderFilter,
};
use tracing::trace;
use twinlink_model::{HeaderDefinitions, Headers};

/// Translates headers between external parties and the platform.
///
/// ```text
/// inbound:  existence -> direction(read)  -> array normalization
/// outbound: existence -> direction(write) -> internal ack removal
/// ```
#[derive(Debug, Clone)]
pub struct HeaderTranslator {
    definitions: HeaderDefinitions,
    discard_internal_ack_requests: bool,
}

impl HeaderTranslator {
    pub fn new(definitions: HeaderDefinitions) -> Self {
        Self {
            definitions,
            discard_internal_ack_requests: true,
        }
    }

    /// Translator for every standard and message header.
    pub fn standard() -> Self {
        Self::new(HeaderDefinitions::all().clone())
    }

    /// A translator without definitions: every header passes unchanged.
    pub fn empty() -> Self {
        Self {
            definitions: HeaderDefinitions::default(),
            discard_internal_ack_requests: false,
        }
    }

    pub fn with_discard_internal_ack_requests(mut self, discard: bool) -> Self {
        self.discard_internal_ack_requests = discard;
        self
    }

    pub fn definitions(&self) -> &HeaderDefinitions {
        &self.definitions
    }

    /// Headers received from an external party, as the platform sees them.
    pub fn from_external_headers(&self, headers: &Headers) -> Headers {
        let existence = ExistenceFilter {
            definitions: &self.definitions,
            retain_known_only: false,
        };
        let direction = DirectionFilter {
            definitions: &self.definitions,
            direction: Direction::Inbound,
        };
        let normalizer = ArrayHeaderNormalizer {
            definitions: &self.definitions,
        };
        apply(headers, &[&existence, &direction, &normalizer])
    }

    /// Headers the platform may send to an external party.
    pub fn to_external_headers(&self, headers: &Headers) -> Headers {
        self.outbound(headers, false)
    }

    /// Like [`to_external_headers`](Self::to_external_headers), dropping unknown headers.
    pub fn to_external_and_retain_known_headers(&self, headers: &Headers) -> Headers {
        self.outbound(headers, true)
    }

    fn outbound(&self, headers: &Headers, retain_known_only: bool) -> Headers {
        let existence = ExistenceFilter {
            definitions: &self.definitions,
            retain_known_only,
        };
        let direction = DirectionFilter {
            definitions: &self.definitions,
            direction: Direction::Outbound,
        };
        if self.discard_internal_ack_requests {
            apply(headers, &[&existence, &direction, &DiscardInternalAckRequestsFilter])
        } else {
            apply(headers, &[&existence, &direction])
        }
    }
}

impl Default for HeaderTranslator {
    fn default() -> Self {
        Self::standard()
    }
}

fn apply(headers: &Headers, chain: &[&dyn HeaderFilter]) -> Headers {
    let mut result = Headers::new();
    for (key, value) in headers.iter() {
        let filtered = chain
            .iter()
            .try_fold(value.to_string(), |value, filter| filter.filter(key, &value));
        match filtered {
            Some(value) => {
                result.insert(key, value);
            }
            None => trace!(key, "Header filtered out"),
        }
    }
    result
}
