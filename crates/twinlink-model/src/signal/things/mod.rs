//! Thing signals.

mod commands;
mod errors;
mod events;
mod resource;
mod responses;

pub use commands::{ThingModifyCommand, ThingModifyKind, ThingQueryCommand, ThingQueryKind};
pub use errors::ThingErrorResponse;
pub use events::ThingEvent;
pub use resource::{ThingResource, ThingResourceKind};
pub use responses::{ThingModifyCommandResponse, ThingQueryCommandResponse};

/// Prefix of every Thing signal type.
pub const THINGS: &str = "things";
