//! Policy signals. Policies have no events and no live channel.

mod commands;
mod resource;
mod responses;

pub use commands::{PolicyModifyCommand, PolicyModifyKind, PolicyQueryCommand, PolicyQueryKind};
pub use resource::{PolicyResource, PolicyResourceKind};
pub use responses::{PolicyErrorResponse, PolicyModifyCommandResponse, PolicyQueryCommandResponse};

/// Prefix of every Policy signal type.
pub const POLICIES: &str = "policies";
