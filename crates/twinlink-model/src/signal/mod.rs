//! Signals: the strongly-typed commands, responses, events and errors that
//! business logic exchanges.
//!
//! Every signal carries a [`Headers`] map and exposes a stable type string
//! (e.g. `things.commands:modifyAttribute`) that identifies it across process
//! boundaries and in persisted event journals.

pub mod acks;
pub mod messages;
pub mod policies;
pub mod search;
pub mod things;

pub use acks::{is_internal_label, Acknowledgement, AcknowledgementLabel};
pub use messages::{Message, MessageCommand, MessageCommandResponse, MessageDirection, MessageKind};
pub use policies::{
    PolicyErrorResponse, PolicyModifyCommand, PolicyModifyCommandResponse, PolicyModifyKind,
    PolicyQueryCommand, PolicyQueryCommandResponse, PolicyQueryKind, PolicyResource,
    PolicyResourceKind,
};
pub use search::{
    SearchCommandKind, SearchEventKind, SearchSubscriptionCommand, SearchSubscriptionEvent,
};
pub use things::{
    ThingErrorResponse, ThingEvent, ThingModifyCommand, ThingModifyCommandResponse,
    ThingModifyKind, ThingQueryCommand, ThingQueryCommandResponse, ThingQueryKind, ThingResource,
    ThingResourceKind,
};

use crate::headers::Headers;
use crate::id::EntityId;
use std::fmt;

/// Common accessors of every signal.
pub trait SignalInfo {
    /// The stable type discriminator, e.g. `things.commands:modifyAttribute`.
    fn signal_type(&self) -> String;

    fn headers(&self) -> &Headers;

    /// The entity the signal is about. Search signals have none.
    fn entity_id(&self) -> Option<&EntityId>;
}

/// Action of a modifying command or its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifyAction {
    Create,
    Modify,
    Delete,
}

impl ModifyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Delete => "delete",
        }
    }
}

/// Past-tense action of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventAction {
    Created,
    Modified,
    Deleted,
}

impl EventAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }
}

/// The retrieve action shared by every query.
pub const RETRIEVE: &str = "retrieve";

/// Upper-case the first character: `attribute` -> `Attribute`.
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `<action><Kind>`, e.g. `modify` + `attribute` -> `modifyAttribute`.
pub fn command_name(action: &str, kind: &str) -> String {
    format!("{}{}", action, upper_first(kind))
}

/// `<kind><Action>`, e.g. `attribute` + `modified` -> `attributeModified`.
pub fn event_name(kind: &str, action: EventAction) -> String {
    format!("{}{}", kind, upper_first(action.as_str()))
}

/// Any signal understood by the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    ThingModifyCommand(ThingModifyCommand),
    ThingQueryCommand(ThingQueryCommand),
    ThingModifyCommandResponse(ThingModifyCommandResponse),
    ThingQueryCommandResponse(ThingQueryCommandResponse),
    ThingEvent(ThingEvent),
    ThingErrorResponse(ThingErrorResponse),
    MessageCommand(MessageCommand),
    MessageCommandResponse(MessageCommandResponse),
    Acknowledgement(Acknowledgement),
    PolicyModifyCommand(PolicyModifyCommand),
    PolicyQueryCommand(PolicyQueryCommand),
    PolicyModifyCommandResponse(PolicyModifyCommandResponse),
    PolicyQueryCommandResponse(PolicyQueryCommandResponse),
    PolicyErrorResponse(PolicyErrorResponse),
    SearchSubscriptionCommand(SearchSubscriptionCommand),
    SearchSubscriptionEvent(SearchSubscriptionEvent),
}

macro_rules! delegate {
    ($self:ident, $inner:ident => $body:expr) => {
        match $self {
            Signal::ThingModifyCommand($inner) => $body,
            Signal::ThingQueryCommand($inner) => $body,
            Signal::ThingModifyCommandResponse($inner) => $body,
            Signal::ThingQueryCommandResponse($inner) => $body,
            Signal::ThingEvent($inner) => $body,
            Signal::ThingErrorResponse($inner) => $body,
            Signal::MessageCommand($inner) => $body,
            Signal::MessageCommandResponse($inner) => $body,
            Signal::Acknowledgement($inner) => $body,
            Signal::PolicyModifyCommand($inner) => $body,
            Signal::PolicyQueryCommand($inner) => $body,
            Signal::PolicyModifyCommandResponse($inner) => $body,
            Signal::PolicyQueryCommandResponse($inner) => $body,
            Signal::PolicyErrorResponse($inner) => $body,
            Signal::SearchSubscriptionCommand($inner) => $body,
            Signal::SearchSubscriptionEvent($inner) => $body,
        }
    };
}

impl Signal {
    /// Short name of the signal family, used in logs.
    pub fn family(&self) -> &'static str {
        match self {
            Signal::ThingModifyCommand(_) => "ThingModifyCommand",
            Signal::ThingQueryCommand(_) => "ThingQueryCommand",
            Signal::ThingModifyCommandResponse(_) => "ThingModifyCommandResponse",
            Signal::ThingQueryCommandResponse(_) => "ThingQueryCommandResponse",
            Signal::ThingEvent(_) => "ThingEvent",
            Signal::ThingErrorResponse(_) => "ThingErrorResponse",
            Signal::MessageCommand(_) => "MessageCommand",
            Signal::MessageCommandResponse(_) => "MessageCommandResponse",
            Signal::Acknowledgement(_) => "Acknowledgement",
            Signal::PolicyModifyCommand(_) => "PolicyModifyCommand",
            Signal::PolicyQueryCommand(_) => "PolicyQueryCommand",
            Signal::PolicyModifyCommandResponse(_) => "PolicyModifyCommandResponse",
            Signal::PolicyQueryCommandResponse(_) => "PolicyQueryCommandResponse",
            Signal::PolicyErrorResponse(_) => "PolicyErrorResponse",
            Signal::SearchSubscriptionCommand(_) => "SearchSubscriptionCommand",
            Signal::SearchSubscriptionEvent(_) => "SearchSubscriptionEvent",
        }
    }

    /// Replace the headers of the wrapped signal.
    pub fn with_headers(self, headers: Headers) -> Self {
        match self {
            Signal::ThingModifyCommand(s) => Signal::ThingModifyCommand(ThingModifyCommand { headers, ..s }),
            Signal::ThingQueryCommand(s) => Signal::ThingQueryCommand(ThingQueryCommand { headers, ..s }),
            Signal::ThingModifyCommandResponse(s) => {
                Signal::ThingModifyCommandResponse(ThingModifyCommandResponse { headers, ..s })
            }
            Signal::ThingQueryCommandResponse(s) => {
                Signal::ThingQueryCommandResponse(ThingQueryCommandResponse { headers, ..s })
            }
            Signal::ThingEvent(s) => Signal::ThingEvent(ThingEvent { headers, ..s }),
            Signal::ThingErrorResponse(s) => Signal::ThingErrorResponse(ThingErrorResponse { headers, ..s }),
            Signal::MessageCommand(s) => Signal::MessageCommand(MessageCommand { headers, ..s }),
            Signal::MessageCommandResponse(s) => {
                Signal::MessageCommandResponse(MessageCommandResponse { headers, ..s })
            }
            Signal::Acknowledgement(s) => Signal::Acknowledgement(Acknowledgement { headers, ..s }),
            Signal::PolicyModifyCommand(s) => Signal::PolicyModifyCommand(PolicyModifyCommand { headers, ..s }),
            Signal::PolicyQueryCommand(s) => Signal::PolicyQueryCommand(PolicyQueryCommand { headers, ..s }),
            Signal::PolicyModifyCommandResponse(s) => {
                Signal::PolicyModifyCommandResponse(PolicyModifyCommandResponse { headers, ..s })
            }
            Signal::PolicyQueryCommandResponse(s) => {
                Signal::PolicyQueryCommandResponse(PolicyQueryCommandResponse { headers, ..s })
            }
            Signal::PolicyErrorResponse(s) => Signal::PolicyErrorResponse(PolicyErrorResponse { headers, ..s }),
            Signal::SearchSubscriptionCommand(s) => {
                Signal::SearchSubscriptionCommand(SearchSubscriptionCommand { headers, ..s })
            }
            Signal::SearchSubscriptionEvent(s) => {
                Signal::SearchSubscriptionEvent(SearchSubscriptionEvent { headers, ..s })
            }
        }
    }
}

impl SignalInfo for Signal {
    fn signal_type(&self) -> String {
        delegate!(self, inner => inner.signal_type())
    }

    fn headers(&self) -> &Headers {
        delegate!(self, inner => inner.headers())
    }

    fn entity_id(&self) -> Option<&EntityId> {
        delegate!(self, inner => inner.entity_id())
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entity_id() {
            Some(id) => write!(f, "{} [{}]", self.signal_type(), id),
            None => f.write_str(&self.signal_type()),
        }
    }
}

macro_rules! signal_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Signal {
                fn from(signal: $variant) -> Self {
                    Signal::$variant(signal)
                }
            }
        )*
    };
}

signal_from!(
    ThingModifyCommand,
    ThingQueryCommand,
    ThingModifyCommandResponse,
    ThingQueryCommandResponse,
    ThingEvent,
    ThingErrorResponse,
    MessageCommand,
    MessageCommandResponse,
    Acknowledgement,
    PolicyModifyCommand,
    PolicyQueryCommand,
    PolicyModifyCommandResponse,
    PolicyQueryCommandResponse,
    PolicyErrorResponse,
    SearchSubscriptionCommand,
    SearchSubscriptionEvent,
);
