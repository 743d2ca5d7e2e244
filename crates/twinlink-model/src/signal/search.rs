//! Streaming search subscriptions over Things.
//!
//! ```text
//! client                      platform
//!   | createSubscription  ->     |
//!   |  <- subscriptionCreated    |
//!   | requestFromSubscription -> |
//!   |  <- subscriptionHasNextPage (0..n)
//!   |  <- subscriptionComplete | subscriptionFailed
//!   | cancelSubscription  ->     |
//! ```

use crate::error::{ModelError, Result};
use crate::headers::Headers;
use crate::id::EntityId;
use crate::pointer::JsonFieldSelector;
use crate::runtime_error::RuntimeError;
use crate::signal::SignalInfo;
use serde_json::Value;

const THING_SEARCH: &str = "thing-search";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCommandKind {
    CreateSubscription {
        filter: Option<String>,
        options: Option<String>,
        fields: Option<JsonFieldSelector>,
        namespaces: Vec<String>,
    },
    RequestFromSubscription {
        subscription_id: String,
        demand: i64,
    },
    CancelSubscription {
        subscription_id: String,
    },
}

impl SearchCommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateSubscription { .. } => "createSubscription",
            Self::RequestFromSubscription { .. } => "requestFromSubscription",
            Self::CancelSubscription { .. } => "cancelSubscription",
        }
    }

    pub fn subscription_id(&self) -> Option<&str> {
        match self {
            Self::CreateSubscription { .. } => None,
            Self::RequestFromSubscription { subscription_id, .. } | Self::CancelSubscription { subscription_id } => {
                Some(subscription_id)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSubscriptionCommand {
    pub kind: SearchCommandKind,
    pub headers: Headers,
}

impl SearchSubscriptionCommand {
    pub fn new(kind: SearchCommandKind, headers: Headers) -> Self {
        Self { kind, headers }
    }

    /// Request `demand` more pages. Demand must be positive.
    pub fn request(subscription_id: impl Into<String>, demand: i64, headers: Headers) -> Result<Self> {
        if demand <= 0 {
            return Err(ModelError::json("RequestFromSubscription", format!("demand must be positive, got {}", demand)));
        }
        Ok(Self::new(
            SearchCommandKind::RequestFromSubscription {
                subscription_id: subscription_id.into(),
                demand,
            },
            headers,
        ))
    }
}

impl SignalInfo for SearchSubscriptionCommand {
    fn signal_type(&self) -> String {
        format!("{}.commands:{}", THING_SEARCH, self.kind.name())
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn entity_id(&self) -> Option<&EntityId> {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchEventKind {
    Created,
    /// One page of matching Things as a JSON array.
    HasNextPage { items: Value },
    Complete,
    Failed { error: RuntimeError },
}

impl SearchEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created => "subscriptionCreated",
            Self::HasNextPage { .. } => "subscriptionHasNextPage",
            Self::Complete => "subscriptionComplete",
            Self::Failed { .. } => "subscriptionFailed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSubscriptionEvent {
    pub subscription_id: String,
    pub kind: SearchEventKind,
    pub headers: Headers,
}

impl SearchSubscriptionEvent {
    pub fn new(subscription_id: impl Into<String>, kind: SearchEventKind, headers: Headers) -> Result<Self> {
        if let SearchEventKind::HasNextPage { items } = &kind {
            if !items.is_array() {
                return Err(ModelError::json("SubscriptionHasNextPage", "items must be an array"));
            }
        }
        Ok(Self {
            subscription_id: subscription_id.into(),
            kind,
            headers,
        })
    }
}

impl SignalInfo for SearchSubscriptionEvent {
    fn signal_type(&self) -> String {
        format!("{}.events:{}", THING_SEARCH, self.kind.name())
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn entity_id(&self) -> Option<&EntityId> {
        None
    }
}
