//! Contract between the protocol layer and event-sourced storage.
//!
//! Entries store the adaptable JSON of an event together with its signal
//! type as manifest. Backends store entries as they are; no key escaping
//! happens here.

use crate::adaptable::Adaptable;
use crate::error::ProtocolError;
use crate::protocol_adapter::ProtocolAdapter;
use crate::signal_types::{SignalFamily, SignalTypeRegistry};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use twinlink_model::signal::ThingEvent;
use twinlink_model::{Signal, SignalInfo, ThingId};

/// Result type for journal operations.
pub type JournalResult<T> = std::result::Result<T, JournalError>;

#[derive(Debug, Error)]
pub enum JournalError {
    /// The entry could not be translated.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The manifest names a signal that is not an event.
    #[error("Not an event: '{0}'")]
    NotAnEvent(String),

    /// The stored payload decodes to a different signal than the manifest says.
    #[error("Manifest '{manifest}' does not match payload type '{actual}'")]
    ManifestMismatch { manifest: String, actual: String },

    /// Revisions of one persistence id must strictly increase.
    #[error("Revision {revision} of '{persistence_id}' is not above {highest}")]
    RevisionConflict {
        persistence_id: String,
        revision: u64,
        highest: u64,
    },

    /// Failure inside a storage backend.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// One persisted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub persistence_id: String,
    pub revision: u64,
    /// Signal type of the payload, e.g. `things.events:attributeModified`.
    pub manifest: String,
    /// Adaptable JSON of the event.
    pub payload: Value,
}

/// Latest known state of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub persistence_id: String,
    pub revision: u64,
    pub payload: Value,
}

/// Append-only event storage.
#[async_trait]
pub trait EventJournal: Send + Sync {
    async fn append(&self, entries: Vec<JournalEntry>) -> JournalResult<()>;

    /// Entries of `persistence_id` with revision >= `from_revision`, oldest first.
    async fn replay(&self, persistence_id: &str, from_revision: u64) -> JournalResult<Vec<JournalEntry>>;

    /// Highest stored revision, `None` for unknown ids.
    async fn highest_revision(&self, persistence_id: &str) -> JournalResult<Option<u64>>;
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save(&self, snapshot: Snapshot) -> JournalResult<()>;

    async fn load(&self, persistence_id: &str) -> JournalResult<Option<Snapshot>>;
}

/// Persistence id of a Thing.
pub fn persistence_id(thing_id: &ThingId) -> String {
    format!("thing:{}", thing_id)
}

/// Converts Thing events to journal entries and back.
pub struct EventJournalCodec {
    adapter: Arc<ProtocolAdapter>,
    registry: SignalTypeRegistry,
}

impl EventJournalCodec {
    pub fn new(adapter: Arc<ProtocolAdapter>) -> Self {
        let registry = SignalTypeRegistry::new(adapter.resolver());
        Self { adapter, registry }
    }

    pub fn to_entry(&self, event: &ThingEvent) -> JournalResult<JournalEntry> {
        let manifest = event.signal_type();
        self.check_manifest(&manifest)?;

        let adaptable = self.adapter.to_adaptable(&Signal::from(event.clone()))?;
        Ok(JournalEntry {
            persistence_id: persistence_id(&event.thing_id),
            revision: event.revision,
            manifest,
            payload: adaptable.to_json(),
        })
    }

    pub fn from_entry(&self, entry: &JournalEntry) -> JournalResult<ThingEvent> {
        self.check_manifest(&entry.manifest)?;

        let adaptable = Adaptable::from_json(&entry.payload)?;
        match self.adapter.from_adaptable(&adaptable)? {
            Signal::ThingEvent(event) if event.signal_type() == entry.manifest => Ok(event),
            other => {
                warn!(manifest = %entry.manifest, actual = %other.signal_type(), "Journal manifest mismatch");
                Err(JournalError::ManifestMismatch {
                    manifest: entry.manifest.clone(),
                    actual: other.signal_type(),
                })
            }
        }
    }

    fn check_manifest(&self, manifest: &str) -> JournalResult<()> {
        match self.registry.classify(manifest)? {
            SignalFamily::ThingEvent => Ok(()),
            _ => Err(JournalError::NotAnEvent(manifest.to_string())),
        }
    }
}

/// In-memory journal and snapshot store.
#[derive(Default)]
pub struct MemoryJournal {
    entries: RwLock<HashMap<String, Vec<JournalEntry>>>,
    snapshots: RwLock<HashMap<String, Snapshot>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventJournal for MemoryJournal {
    async fn append(&self, entries: Vec<JournalEntry>) -> JournalResult<()> {
        let mut stored = self.entries.write();

        // Validate the whole batch before writing any of it.
        let mut highest: HashMap<&str, u64> = HashMap::new();
        for entry in &entries {
            let current = match highest.get(entry.persistence_id.as_str()) {
                Some(revision) => Some(*revision),
                None => stored
                    .get(&entry.persistence_id)
                    .and_then(|list| list.last())
                    .map(|last| last.revision),
            };
            if let Some(current) = current {
                if entry.revision <= current {
                    return Err(JournalError::RevisionConflict {
                        persistence_id: entry.persistence_id.clone(),
                        revision: entry.revision,
                        highest: current,
                    });
                }
            }
            highest.insert(&entry.persistence_id, entry.revision);
        }

        debug!(count = entries.len(), "Appending journal entries");
        for entry in entries {
            stored.entry(entry.persistence_id.clone()).or_default().push(entry);
        }
        Ok(())
    }

    async fn replay(&self, persistence_id: &str, from_revision: u64) -> JournalResult<Vec<JournalEntry>> {
        Ok(self
            .entries
            .read()
            .get(persistence_id)
            .map(|list| {
                list.iter()
                    .filter(|entry| entry.revision >= from_revision)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn highest_revision(&self, persistence_id: &str) -> JournalResult<Option<u64>> {
        Ok(self
            .entries
            .read()
            .get(persistence_id)
            .and_then(|list| list.last())
            .map(|entry| entry.revision))
    }
}

#[async_trait]
impl SnapshotStore for MemoryJournal {
    async fn save(&self, snapshot: Snapshot) -> JournalResult<()> {
        let mut snapshots = self.snapshots.write();
        let newer = snapshots
            .get(&snapshot.persistence_id)
            .map_or(true, |current| snapshot.revision >= current.revision);
        if newer {
            snapshots.insert(snapshot.persistence_id.clone(), snapshot);
        }
        Ok(())
    }

    async fn load(&self, persistence_id: &str) -> JournalResult<Option<Snapshot>> {
        Ok(self.snapshots.read().get(persistence_id).cloned())
    }
}
