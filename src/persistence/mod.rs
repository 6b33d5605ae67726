//! Persisted state records.
//!
//! A host with persistence enabled writes its last changed snapshot to a
//! [`StateStorage`] backend and reads it back once when it is created, so a
//! machine resumes where it left off across restarts.

use crate::core::{Context, Snapshot, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod error;
pub mod storage;

pub use error::{PersistError, StorageError};
pub use storage::{FileStorage, MemoryStorage, StateStorage};

/// Version identifier for the persisted record format
pub const PERSIST_VERSION: u32 = 1;

/// Storage key for a machine's record: `"<machine-id> machine state - <origin>"`.
pub fn persisted_key(machine_id: &str, origin: &str) -> String {
    format!("{machine_id} machine state - {origin}")
}

/// Serializable record of a machine's last changed snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct PersistedState<S: State, C: Context> {
    /// Record format version
    pub version: u32,

    /// Machine the snapshot belongs to
    pub machine_id: String,

    /// When the record was written
    pub saved_at: DateTime<Utc>,

    /// The persisted snapshot
    pub snapshot: Snapshot<S, C>,
}

/// Fields checked before the full record is decoded.
#[derive(Deserialize)]
struct RecordHeader {
    version: u32,
    machine_id: String,
}

impl<S: State, C: Context> PersistedState<S, C> {
    pub fn new(machine_id: impl Into<String>, snapshot: Snapshot<S, C>) -> Self {
        Self {
            version: PERSIST_VERSION,
            machine_id: machine_id.into(),
            saved_at: Utc::now(),
            snapshot,
        }
    }

    /// Encode as JSON text.
    pub fn encode(&self) -> Result<String, PersistError> {
        serde_json::to_string(self).map_err(|e| PersistError::SerializationFailed(e.to_string()))
    }

    /// Decode JSON text, checking the format version and the owning machine.
    pub fn decode(text: &str, machine_id: &str) -> Result<Self, PersistError> {
        let header: RecordHeader = serde_json::from_str(text)
            .map_err(|e| PersistError::DeserializationFailed(e.to_string()))?;

        if header.version != PERSIST_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: header.version,
                supported: PERSIST_VERSION,
            });
        }

        if header.machine_id != machine_id {
            return Err(PersistError::MachineMismatch {
                expected: machine_id.to_string(),
                found: header.machine_id,
            });
        }

        serde_json::from_str(text).map_err(|e| PersistError::DeserializationFailed(e.to_string()))
    }
}

/// Read the snapshot stored under `key`, `None` if nothing was stored.
pub fn load_snapshot<S: State, C: Context>(
    storage: &dyn StateStorage,
    key: &str,
    machine_id: &str,
) -> Result<Option<Snapshot<S, C>>, PersistError> {
    let Some(text) = storage.get(key)? else {
        return Ok(None);
    };
    let record = PersistedState::<S, C>::decode(&text, machine_id)?;
    Ok(Some(record.snapshot))
}

/// Write `snapshot` under `key`.
pub fn save_snapshot<S: State, C: Context>(
    storage: &dyn StateStorage,
    key: &str,
    machine_id: &str,
    snapshot: &Snapshot<S, C>,
) -> Result<(), PersistError> {
    let text = PersistedState::new(machine_id, snapshot.clone()).encode()?;
    storage.set(key, &text)?;
    Ok(())
}
