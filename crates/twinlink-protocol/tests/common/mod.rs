//! Helpers shared by the integration tests.

#![allow(dead_code)]

use serde_json::Value;
use tracing_subscriber::EnvFilter;
use twinlink_protocol::Adaptable;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_test_writer()
        .try_init();
}

pub fn adaptable(envelope: Value) -> Adaptable {
    Adaptable::from_json(&envelope).expect("valid adaptable")
}
