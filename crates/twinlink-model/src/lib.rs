//! Domain model of the TwinLink digital-twin platform.
//!
//! ## Contents
//!
//! - **Identifiers**: `namespace:name` ids for Things and Policies
//! - **Pointers**: JSON pointers and field selectors addressing sub-resources
//! - **Headers**: the case-insensitive header map and the header-definition registry
//! - **Entities**: Thing, Feature, Policy and their parts
//! - **Signals**: commands, responses, events, errors, messages,
//!   acknowledgements and search subscriptions
//!
//! ## Example
//!
//! ```rust
//! use twinlink_model::signal::{SignalInfo, ThingModifyCommand, ThingModifyKind};
//! use twinlink_model::{Headers, JsonPointer, ThingId};
//!
//! let command = ThingModifyCommand::new(
//!     ThingId::parse("org.eclipse.ditto:lamp").unwrap(),
//!     ThingModifyKind::ModifyAttribute {
//!         pointer: JsonPointer::parse("/location").unwrap(),
//!         value: serde_json::json!("kitchen"),
//!     },
//!     Headers::new().with("correlation-id", "c-1"),
//! );
//! assert_eq!(command.signal_type(), "things.commands:modifyAttribute");
//! ```

pub mod error;
pub mod headers;
pub mod id;
pub mod pointer;
pub mod policy;
pub mod runtime_error;
pub mod signal;
pub mod status;
pub mod thing;

pub use error::{ModelError, Result};
pub use headers::{HeaderDefinition, HeaderDefinitions, HeaderValueType, Headers};
pub use id::{EntityId, PolicyId, ThingId};
pub use pointer::{JsonFieldSelector, JsonPointer};
pub use policy::{Policy, PolicyEntries, PolicyEntry, Resource, Subject};
pub use runtime_error::RuntimeError;
pub use signal::{Signal, SignalInfo};
pub use status::HttpStatus;
pub use thing::{Feature, FeatureDefinition, Features, Thing, ThingDefinition};

/// A JSON object.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Version of the model crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
