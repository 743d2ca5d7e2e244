//! Entry point translating between adaptables and signals.

use crate::adaptable::Adaptable;
use crate::adapter::{Adapter, AdapterContext};
use crate::config::ProtocolConfig;
use crate::error::Result;
use crate::headers::HeaderTranslator;
use crate::resolver::AdapterResolver;
use crate::topic::Channel;
use std::sync::Arc;
use tracing::debug;
use twinlink_model::{Signal, SignalInfo};

/// Decodes adaptables into signals and encodes signals back.
///
/// # Example
///
/// ```rust
/// use twinlink_protocol::{Adaptable, ProtocolAdapter};
/// use twinlink_model::SignalInfo;
///
/// let adapter = ProtocolAdapter::default();
/// let adaptable = Adaptable::from_json_str(r#"{
///     "topic": "org.eclipse.ditto/lamp/things/twin/commands/modify",
///     "headers": {"correlation-id": "c-1"},
///     "path": "/attributes/location",
///     "value": "kitchen"
/// }"#).unwrap();
///
/// let signal = adapter.from_adaptable(&adaptable).unwrap();
/// assert_eq!(signal.signal_type(), "things.commands:modifyAttribute");
///
/// let back = adapter.to_adaptable(&signal).unwrap();
/// assert_eq!(back.topic_path(), adaptable.topic_path());
/// ```
pub struct ProtocolAdapter {
    translator: Arc<HeaderTranslator>,
    resolver: AdapterResolver,
}

impl ProtocolAdapter {
    pub fn new(translator: HeaderTranslator) -> Self {
        Self::with_context(AdapterContext::new(Arc::new(translator)))
    }

    pub fn from_config(config: &ProtocolConfig) -> Self {
        Self::with_context(AdapterContext::from_config(config))
    }

    fn with_context(context: AdapterContext) -> Self {
        Self {
            translator: context.translator().clone(),
            resolver: AdapterResolver::new(context),
        }
    }

    pub fn header_translator(&self) -> &HeaderTranslator {
        &self.translator
    }

    pub fn resolver(&self) -> &AdapterResolver {
        &self.resolver
    }

    pub fn from_adaptable(&self, adaptable: &Adaptable) -> Result<Signal> {
        let signal = self.resolver.resolve(adaptable)?.decode(adaptable)?;
        debug!(signal = %signal, "Decoded signal");
        Ok(signal)
    }

    /// Encode on the channel the signal belongs to.
    pub fn to_adaptable(&self, signal: &Signal) -> Result<Adaptable> {
        self.to_adaptable_with_channel(signal, default_channel(signal))
    }

    pub fn to_adaptable_with_channel(&self, signal: &Signal, channel: Channel) -> Result<Adaptable> {
        let r = &self.resolver;
        match signal {
            Signal::ThingModifyCommand(s) => r.thing_modify_commands.to_adaptable(s, channel),
            Signal::ThingQueryCommand(s) => r.thing_query_commands.to_adaptable(s, channel),
            Signal::ThingModifyCommandResponse(s) => r.thing_modify_responses.to_adaptable(s, channel),
            Signal::ThingQueryCommandResponse(s) => r.thing_query_responses.to_adaptable(s, channel),
            Signal::ThingEvent(s) => r.thing_events.to_adaptable(s, channel),
            Signal::ThingErrorResponse(s) => r.thing_errors.to_adaptable(s, channel),
            Signal::MessageCommand(s) => r.message_commands.to_adaptable(s, channel),
            Signal::MessageCommandResponse(s) => r.message_responses.to_adaptable(s, channel),
            Signal::Acknowledgement(s) => r.acknowledgements.to_adaptable(s, channel),
            Signal::PolicyModifyCommand(s) => r.policy_modify_commands.to_adaptable(s, channel),
            Signal::PolicyQueryCommand(s) => r.policy_query_commands.to_adaptable(s, channel),
            Signal::PolicyModifyCommandResponse(s) => r.policy_modify_responses.to_adaptable(s, channel),
            Signal::PolicyQueryCommandResponse(s) => r.policy_query_responses.to_adaptable(s, channel),
            Signal::PolicyErrorResponse(s) => r.policy_errors.to_adaptable(s, channel),
            Signal::SearchSubscriptionCommand(s) => r.search_commands.to_adaptable(s, channel),
            Signal::SearchSubscriptionEvent(s) => r.search_events.to_adaptable(s, channel),
        }
    }

    /// Every signal type any adapter decodes, sorted and deduplicated.
    pub fn supported_signal_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .resolver
            .adapters()
            .into_iter()
            .flat_map(|adapter| adapter.signal_types())
            .collect();
        types.sort();
        types.dedup();
        types
    }
}

impl Default for ProtocolAdapter {
    fn default() -> Self {
        Self::new(HeaderTranslator::standard())
    }
}

/// Messages are live, policies have no channel, search is twin; Thing
/// signals and acknowledgements follow their `channel` header.
fn default_channel(signal: &Signal) -> Channel {
    match signal {
        Signal::MessageCommand(_) | Signal::MessageCommandResponse(_) => Channel::Live,
        Signal::PolicyModifyCommand(_)
        | Signal::PolicyQueryCommand(_)
        | Signal::PolicyModifyCommandResponse(_)
        | Signal::PolicyQueryCommandResponse(_)
        | Signal::PolicyErrorResponse(_) => Channel::None,
        Signal::SearchSubscriptionCommand(_) | Signal::SearchSubscriptionEvent(_) => Channel::Twin,
        _ if signal.headers().is_live_channel() => Channel::Live,
        _ => Channel::Twin,
    }
}
