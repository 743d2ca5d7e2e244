//! Codecs between adaptables and signals, one per signal family.
//!
//! Decoding looks up a strategy by the signal type the adaptable describes;
//! encoding matches on the signal itself.

pub mod acks;
pub mod messages;
pub mod policies;
pub mod search;
pub mod things;

pub use acks::AcknowledgementAdapter;
pub use messages::{MessageCommandAdapter, MessageCommandResponseAdapter};
pub use policies::{
    PolicyErrorResponseAdapter, PolicyModifyCommandAdapter, PolicyModifyCommandResponseAdapter,
    PolicyQueryCommandAdapter, PolicyQueryCommandResponseAdapter,
};
pub use search::{SearchCommandAdapter, SearchEventAdapter};
pub use things::{
    ThingErrorResponseAdapter, ThingEventAdapter, ThingModifyCommandAdapter, ThingModifyCommandResponseAdapter,
    ThingQueryCommandAdapter, ThingQueryCommandResponseAdapter,
};

use crate::adaptable::{fields, Adaptable};
use crate::config::{defaults, ProtocolConfig};
use crate::error::{ProtocolError, Result};
use crate::headers::HeaderTranslator;
use crate::payload::Payload;
use crate::topic::{Action, Channel, TopicPath};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use twinlink_model::headers::keys;
use twinlink_model::signal::ModifyAction;
use twinlink_model::{HeaderDefinitions, Headers, HttpStatus, Signal, SignalInfo, ThingId};

/// Decode functions keyed by signal type.
pub type MappingStrategies<T> = HashMap<String, fn(&Adaptable) -> Result<T>>;

/// Settings shared by every adapter of one protocol adapter.
#[derive(Debug, Clone)]
pub struct AdapterContext {
    translator: Arc<HeaderTranslator>,
    content_type: String,
    retain_known_headers_only: bool,
    include_message_headers: bool,
}

impl AdapterContext {
    pub fn new(translator: Arc<HeaderTranslator>) -> Self {
        Self {
            translator,
            content_type: defaults::CONTENT_TYPE.to_string(),
            retain_known_headers_only: defaults::RETAIN_KNOWN_HEADERS_ONLY,
            include_message_headers: defaults::INCLUDE_MESSAGE_HEADERS,
        }
    }

    pub fn from_config(config: &ProtocolConfig) -> Self {
        let translator = HeaderTranslator::new(HeaderDefinitions::all().clone())
            .with_discard_internal_ack_requests(config.discard_internal_ack_requests);
        Self {
            translator: Arc::new(translator),
            content_type: config.content_type.clone(),
            retain_known_headers_only: config.retain_known_headers_only,
            include_message_headers: config.include_message_headers,
        }
    }

    pub fn translator(&self) -> &Arc<HeaderTranslator> {
        &self.translator
    }

    pub fn include_message_headers(&self) -> bool {
        self.include_message_headers
    }

    /// Translated headers of an incoming adaptable. The `channel` header
    /// follows the topic: set for live topics, removed otherwise.
    pub fn inbound_headers(&self, adaptable: &Adaptable) -> Headers {
        let mut headers = self.translator.from_external_headers(&adaptable.headers_or_empty());
        if adaptable.topic_path().is_channel(Channel::Live) {
            headers.insert(keys::CHANNEL, Channel::Live.as_str());
        } else {
            headers.remove(keys::CHANNEL);
        }
        headers
    }

    /// Headers of an outgoing adaptable.
    pub fn outbound_headers(&self, headers: &Headers, force_content_type: bool) -> Headers {
        let mut external = if self.retain_known_headers_only {
            self.translator.to_external_and_retain_known_headers(headers)
        } else {
            self.translator.to_external_headers(headers)
        };
        if force_content_type {
            external.insert(keys::CONTENT_TYPE, self.content_type.clone());
        }
        external
    }
}

impl Default for AdapterContext {
    fn default() -> Self {
        Self::new(Arc::new(HeaderTranslator::standard()))
    }
}

/// Codec for one signal family.
pub trait Adapter: Send + Sync {
    type Signal: SignalInfo;

    fn context(&self) -> &AdapterContext;

    fn strategies(&self) -> &MappingStrategies<Self::Signal>;

    /// The signal type an adaptable describes, used to pick the strategy.
    fn mapping_key(&self, adaptable: &Adaptable) -> Result<String>;

    /// Topic path and payload of a signal; headers are handled by the caller.
    fn encode(&self, signal: &Self::Signal, channel: Channel) -> Result<(TopicPath, Payload)>;

    /// Whether outbound adaptables get the configured `content-type`.
    fn forces_content_type(&self) -> bool {
        true
    }

    /// Hook to add headers derived from the adaptable after translation.
    fn decorate_headers(&self, _adaptable: &Adaptable, headers: Headers) -> Headers {
        headers
    }

    fn from_adaptable(&self, adaptable: &Adaptable) -> Result<Self::Signal> {
        let headers = self.context().inbound_headers(adaptable);
        let headers = self.decorate_headers(adaptable, headers);
        let key = self.mapping_key(adaptable).map_err(|e| e.with_headers(&headers))?;
        let strategy = self
            .strategies()
            .get(&key)
            .ok_or_else(|| ProtocolError::unknown_topic_path(adaptable.topic_path().path(), &headers))?;

        debug!(signal_type = %key, topic = %adaptable.topic_path(), "Decoding adaptable");
        let translated = adaptable.clone().with_headers(headers.clone());
        strategy(&translated).map_err(|e| e.with_headers(&headers))
    }

    fn to_adaptable(&self, signal: &Self::Signal, channel: Channel) -> Result<Adaptable> {
        let (topic_path, payload) = self
            .encode(signal, channel)
            .map_err(|e| e.with_headers(signal.headers()))?;
        let headers = self
            .context()
            .outbound_headers(signal.headers(), self.forces_content_type());

        debug!(signal_type = %signal.signal_type(), topic = %topic_path, "Encoded signal");
        Ok(Adaptable::new(topic_path, payload, Some(headers)))
    }

    /// Every signal type this adapter decodes, sorted.
    fn supported_signal_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.strategies().keys().cloned().collect();
        types.sort();
        types
    }
}

/// Object-safe view of an [`Adapter`] producing the [`Signal`] enum.
pub trait SignalAdapter: Send + Sync {
    fn decode(&self, adaptable: &Adaptable) -> Result<Signal>;

    fn signal_types(&self) -> Vec<String>;
}

impl<A> SignalAdapter for A
where
    A: Adapter,
    A::Signal: Into<Signal>,
{
    fn decode(&self, adaptable: &Adaptable) -> Result<Signal> {
        self.from_adaptable(adaptable).map(Into::into)
    }

    fn signal_types(&self) -> Vec<String> {
        self.supported_signal_types()
    }
}

/// Build a Things topic on the requested channel. Things have no `none` channel.
macro_rules! things_topic {
    ($entity_id:expr, $channel:expr, $builder:ident => $tail:expr) => {{
        let things = $crate::topic::TopicPath::builder_for($entity_id).things();
        match $channel {
            $crate::topic::Channel::Twin => {
                let $builder = things.twin();
                $tail
            }
            $crate::topic::Channel::Live => {
                let $builder = things.live();
                $tail
            }
            $crate::topic::Channel::None => Err($crate::error::ProtocolError::unknown_channel(
                $crate::topic::Channel::None.as_str(),
                &twinlink_model::Headers::new(),
            )),
        }
    }};
}
pub(crate) use things_topic;

pub(crate) fn thing_id_of(adaptable: &Adaptable) -> Result<ThingId> {
    Ok(ThingId::from(adaptable.topic_path().entity_id()?))
}

pub(crate) fn required_value(adaptable: &Adaptable) -> Result<&Value> {
    adaptable
        .payload()
        .value()
        .ok_or_else(|| ProtocolError::missing_field(fields::VALUE, &Headers::new()))
}

pub(crate) fn required_status(adaptable: &Adaptable) -> Result<HttpStatus> {
    adaptable
        .payload()
        .status()
        .ok_or_else(|| ProtocolError::missing_field(fields::STATUS, &Headers::new()))
}

/// Insert one strategy per key.
pub(crate) fn insert_all<T, I>(strategies: &mut MappingStrategies<T>, keys: I, strategy: fn(&Adaptable) -> Result<T>)
where
    I: IntoIterator<Item = String>,
{
    for key in keys {
        strategies.insert(key, strategy);
    }
}

pub(crate) fn unknown_topic(adaptable: &Adaptable) -> ProtocolError {
    ProtocolError::unknown_topic_path(adaptable.topic_path().path(), &Headers::new())
}

pub(crate) fn topic_action(adaptable: &Adaptable) -> Result<Action> {
    adaptable.topic_path().action().ok_or_else(|| unknown_topic(adaptable))
}

/// The create, modify or delete action of a command topic.
pub(crate) fn modify_action(adaptable: &Adaptable) -> Result<ModifyAction> {
    topic_action(adaptable)?
        .modify_action()
        .ok_or_else(|| unknown_topic(adaptable))
}

pub(crate) fn retrieve_action(adaptable: &Adaptable) -> Result<()> {
    match topic_action(adaptable)? {
        Action::Retrieve => Ok(()),
        _ => Err(unknown_topic(adaptable)),
    }
}
