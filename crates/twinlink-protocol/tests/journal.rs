//! Event journal contract against the in-memory backend.

mod common;

use common::init_tracing;
use serde_json::json;
use std::sync::Arc;
use twinlink_model::signal::{EventAction, ThingEvent, ThingResource};
use twinlink_model::{JsonPointer, ThingId};
use twinlink_protocol::journal::persistence_id;
use twinlink_protocol::{EventJournal, EventJournalCodec, JournalError, MemoryJournal, ProtocolAdapter};

fn thing_id() -> ThingId {
    ThingId::parse("ns:lamp").unwrap()
}

fn attribute_event(revision: u64, value: serde_json::Value) -> ThingEvent {
    ThingEvent::new(
        thing_id(),
        EventAction::Modified,
        ThingResource::Attribute(JsonPointer::parse("/brightness").unwrap()),
        Some(value),
        revision,
    )
    .unwrap()
}

#[tokio::test]
async fn test_append_and_replay() {
    init_tracing();
    let codec = EventJournalCodec::new(Arc::new(ProtocolAdapter::default()));
    let journal = MemoryJournal::new();

    let entries = (1..=3)
        .map(|revision| codec.to_entry(&attribute_event(revision, json!(revision * 10))))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    journal.append(entries).await.unwrap();

    let id = persistence_id(&thing_id());
    assert_eq!(journal.highest_revision(&id).await.unwrap(), Some(3));
    assert_eq!(journal.highest_revision("thing:ns:other").await.unwrap(), None);

    let replayed = journal.replay(&id, 2).await.unwrap();
    assert_eq!(replayed.len(), 2);

    let events: Vec<ThingEvent> = replayed.iter().map(|entry| codec.from_entry(entry).unwrap()).collect();
    assert_eq!(events[0].revision, 2);
    assert_eq!(events[1].value, Some(json!(30)));
}

#[tokio::test]
async fn test_revisions_must_increase() {
    let codec = EventJournalCodec::new(Arc::new(ProtocolAdapter::default()));
    let journal = MemoryJournal::new();

    journal
        .append(vec![codec.to_entry(&attribute_event(5, json!(1))).unwrap()])
        .await
        .unwrap();

    let stale = codec.to_entry(&attribute_event(5, json!(2))).unwrap();
    let err = journal.append(vec![stale]).await.unwrap_err();
    assert!(matches!(err, JournalError::RevisionConflict { highest: 5, .. }));

    // A rejected batch leaves nothing behind.
    let batch = vec![
        codec.to_entry(&attribute_event(6, json!(3))).unwrap(),
        codec.to_entry(&attribute_event(6, json!(4))).unwrap(),
    ];
    assert!(journal.append(batch).await.is_err());
    assert_eq!(journal.highest_revision(&persistence_id(&thing_id())).await.unwrap(), Some(5));
}

#[tokio::test]
async fn test_journal_is_shareable() {
    let journal: Arc<dyn EventJournal> = Arc::new(MemoryJournal::new());
    let codec = Arc::new(EventJournalCodec::new(Arc::new(ProtocolAdapter::default())));

    let handles: Vec<_> = (0..4u64)
        .map(|i| {
            let journal = journal.clone();
            let codec = codec.clone();
            tokio::spawn(async move {
                let event = ThingEvent::new(
                    ThingId::parse(&format!("ns:lamp-{}", i)).unwrap(),
                    EventAction::Created,
                    ThingResource::Attributes,
                    Some(json!({"index": i})),
                    1,
                )
                .unwrap();
                journal.append(vec![codec.to_entry(&event).unwrap()]).await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(journal.highest_revision("thing:ns:lamp-3").await.unwrap(), Some(1));
}
