//! Registry of every decodable signal type and the family it belongs to.

use crate::adapter::SignalAdapter;
use crate::error::{ProtocolError, Result};
use crate::resolver::AdapterResolver;
use serde::Serialize;
use std::collections::HashMap;
use twinlink_model::Headers;

/// Coarse classification of a signal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalFamily {
    ThingCommand,
    ThingCommandResponse,
    ThingEvent,
    ThingError,
    MessageCommand,
    MessageCommandResponse,
    Acknowledgement,
    PolicyCommand,
    PolicyCommandResponse,
    PolicyError,
    SearchCommand,
    SearchEvent,
}

impl SignalFamily {
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            Self::ThingCommand | Self::MessageCommand | Self::PolicyCommand | Self::SearchCommand
        )
    }

    pub fn is_event(&self) -> bool {
        matches!(self, Self::ThingEvent | Self::SearchEvent)
    }
}

/// Lookup from signal type, e.g. `things.events:attributeModified`, to family.
#[derive(Debug, Clone)]
pub struct SignalTypeRegistry {
    families: HashMap<String, SignalFamily>,
}

impl SignalTypeRegistry {
    pub fn new(resolver: &AdapterResolver) -> Self {
        let r = resolver;
        let adapters: [(SignalFamily, &dyn SignalAdapter); 16] = [
            (SignalFamily::ThingCommand, &r.thing_modify_commands),
            (SignalFamily::ThingCommand, &r.thing_query_commands),
            (SignalFamily::ThingCommandResponse, &r.thing_modify_responses),
            (SignalFamily::ThingCommandResponse, &r.thing_query_responses),
            (SignalFamily::ThingEvent, &r.thing_events),
            (SignalFamily::ThingError, &r.thing_errors),
            (SignalFamily::MessageCommand, &r.message_commands),
            (SignalFamily::MessageCommandResponse, &r.message_responses),
            (SignalFamily::Acknowledgement, &r.acknowledgements),
            (SignalFamily::PolicyCommand, &r.policy_modify_commands),
            (SignalFamily::PolicyCommand, &r.policy_query_commands),
            (SignalFamily::PolicyCommandResponse, &r.policy_modify_responses),
            (SignalFamily::PolicyCommandResponse, &r.policy_query_responses),
            (SignalFamily::PolicyError, &r.policy_errors),
            (SignalFamily::SearchCommand, &r.search_commands),
            (SignalFamily::SearchEvent, &r.search_events),
        ];

        let families = adapters
            .iter()
            .flat_map(|(family, adapter)| adapter.signal_types().into_iter().map(move |t| (t, *family)))
            .collect();
        Self { families }
    }

    /// Family of a registered type. Unregistered types fail with the error
    /// matching what they look like.
    pub fn classify(&self, signal_type: &str) -> Result<SignalFamily> {
        self.families
            .get(signal_type)
            .copied()
            .ok_or_else(|| unknown(signal_type))
    }

    pub fn contains(&self, signal_type: &str) -> bool {
        self.families.contains_key(signal_type)
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Registered types of one family, sorted.
    pub fn types_of(&self, family: SignalFamily) -> Vec<&str> {
        let mut types: Vec<&str> = self
            .families
            .iter()
            .filter(|(_, f)| **f == family)
            .map(|(t, _)| t.as_str())
            .collect();
        types.sort_unstable();
        types
    }
}

impl Default for SignalTypeRegistry {
    fn default() -> Self {
        Self::new(&AdapterResolver::default())
    }
}

fn unknown(signal_type: &str) -> ProtocolError {
    let signal_type = signal_type.to_string();
    let headers = Headers::new();
    if signal_type.contains(".commands:") {
        ProtocolError::UnknownCommand { signal_type, headers }
    } else if signal_type.contains(".responses:") {
        ProtocolError::UnknownCommandResponse { signal_type, headers }
    } else if signal_type.contains(".events:") {
        ProtocolError::UnknownEvent { signal_type, headers }
    } else {
        ProtocolError::UnknownSignal { signal_type, headers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_registered() {
        let registry = SignalTypeRegistry::default();
        assert_eq!(
            registry.classify("things.events:attributeModified").unwrap(),
            SignalFamily::ThingEvent
        );
        assert_eq!(
            registry.classify("things.responses:retrieveThing").unwrap(),
            SignalFamily::ThingCommandResponse
        );
        assert_eq!(
            registry.classify("thing-search.commands:cancelSubscription").unwrap(),
            SignalFamily::SearchCommand
        );
        assert_eq!(registry.classify("acknowledgement").unwrap(), SignalFamily::Acknowledgement);
    }

    #[test]
    fn test_classify_unknown() {
        let registry = SignalTypeRegistry::default();
        assert!(matches!(
            registry.classify("things.commands:launchRocket"),
            Err(ProtocolError::UnknownCommand { .. })
        ));
        assert!(matches!(
            registry.classify("things.responses:launchRocket"),
            Err(ProtocolError::UnknownCommandResponse { .. })
        ));
        assert!(matches!(
            registry.classify("things.events:rocketLaunched"),
            Err(ProtocolError::UnknownEvent { .. })
        ));
        assert!(matches!(registry.classify("rocket"), Err(ProtocolError::UnknownSignal { .. })));
    }

    #[test]
    fn test_families() {
        let registry = SignalTypeRegistry::default();
        assert_eq!(registry.types_of(SignalFamily::ThingError), vec!["things.errors:error"]);
        assert_eq!(registry.types_of(SignalFamily::SearchEvent).len(), 4);
        assert!(SignalFamily::PolicyCommand.is_command());
        assert!(!SignalFamily::ThingError.is_event());
    }
}
