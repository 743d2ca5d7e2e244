//! Header translation between external parties and the platform.

pub mod filters;
mod translator;

pub use filters::{Direction, HeaderFilter};
pub use translator::HeaderTranslator;
