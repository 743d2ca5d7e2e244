//! Protocol adapter between the TwinLink wire envelope and typed signals.
//!
//! ## Layers
//!
//! - **Topic paths**: grammar-checked subjects, built with a type-state builder
//! - **Adaptables**: topic path, payload and headers; the JSON wire envelope
//! - **Headers**: inbound/outbound filtering driven by header definitions
//! - **Adapters**: one codec per signal family, resolved per adaptable
//! - **Journal**: storage contract for persisted Thing events
//!
//! ## Example
//!
//! ```rust
//! use twinlink_protocol::{Adaptable, ProtocolAdapter};
//!
//! let adapter = ProtocolAdapter::default();
//! let adaptable = Adaptable::from_json_str(r#"{
//!     "topic": "org.eclipse.ditto/lamp/things/twin/commands/retrieve",
//!     "headers": {"correlation-id": "c-1"},
//!     "path": "/"
//! }"#).unwrap();
//!
//! let signal = adapter.from_adaptable(&adaptable).unwrap();
//! println!("{}", signal);
//! ```

pub mod adaptable;
pub mod adapter;
pub mod config;
pub mod error;
pub mod headers;
pub mod journal;
pub mod path_matcher;
pub mod payload;
pub mod protocol_adapter;
pub mod resolver;
pub mod signal_types;
pub mod topic;

pub use adaptable::Adaptable;
pub use adapter::{Adapter, AdapterContext, SignalAdapter};
pub use config::{ConfigError, ProtocolConfig};
pub use error::{ProtocolError, Result};
pub use headers::HeaderTranslator;
pub use journal::{EventJournal, EventJournalCodec, JournalEntry, JournalError, MemoryJournal, Snapshot, SnapshotStore};
pub use path_matcher::PathMatcher;
pub use payload::{MessagePath, Payload};
pub use protocol_adapter::ProtocolAdapter;
pub use resolver::AdapterResolver;
pub use signal_types::{SignalFamily, SignalTypeRegistry};
pub use topic::{Action, Channel, Criterion, Group, SearchAction, TopicPath};

/// Version of the protocol crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
