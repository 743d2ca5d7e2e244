//! Inbound and outbound header filtering.

mod common;

use common::init_tracing;
use twinlink_model::headers::keys;
use twinlink_model::Headers;
use twinlink_protocol::HeaderTranslator;

fn external() -> Headers {
    Headers::new()
        .with(keys::CORRELATION_ID, "c-1")
        .with(keys::AUTHORIZATION_CONTEXT, r#"{"subjects":["nginx:spoofed"]}"#)
        .with(keys::REQUESTED_ACKS, "twin-persisted,custom-ack")
        .with("x-vendor", "acme")
}

#[test]
fn test_inbound_drops_internal_headers() {
    init_tracing();
    let headers = HeaderTranslator::standard().from_external_headers(&external());

    assert_eq!(headers.correlation_id(), Some("c-1"));
    assert!(!headers.contains_key(keys::AUTHORIZATION_CONTEXT));
    assert_eq!(headers.get("x-vendor"), Some("acme"));
    assert_eq!(
        headers.requested_acks(),
        vec!["twin-persisted".to_string(), "custom-ack".to_string()]
    );
}

#[test]
fn test_outbound_is_idempotent() {
    let translator = HeaderTranslator::standard();
    let internal = Headers::new()
        .with(keys::CORRELATION_ID, "c-1")
        .with(keys::CHANNEL, "live")
        .with_requested_acks(["ditto-persisted", "custom-ack"]);

    let once = translator.to_external_headers(&internal);
    let twice = translator.to_external_headers(&once);
    assert_eq!(once, twice);
    assert!(!once.contains_key(keys::CHANNEL));
    assert_eq!(once.get(keys::REQUESTED_ACKS), Some(r#"["custom-ack"]"#));
}

#[test]
fn test_only_internal_acks_remove_header() {
    let translator = HeaderTranslator::standard();
    let internal = Headers::new().with_requested_acks(["ditto-persisted"]);
    assert!(!translator
        .to_external_headers(&internal)
        .contains_key(keys::REQUESTED_ACKS));
}

#[test]
fn test_retain_known_headers() {
    let translator = HeaderTranslator::standard();
    let internal = Headers::new()
        .with(keys::CORRELATION_ID, "c-1")
        .with("x-vendor", "acme");

    let retained = translator.to_external_and_retain_known_headers(&internal);
    assert_eq!(retained.len(), 1);
    assert_eq!(retained.correlation_id(), Some("c-1"));
}

#[test]
fn test_empty_translator_passes_everything() {
    let translator = HeaderTranslator::empty();
    let headers = external();
    assert_eq!(translator.from_external_headers(&headers), headers);
    assert_eq!(translator.to_external_headers(&headers), headers);
}
