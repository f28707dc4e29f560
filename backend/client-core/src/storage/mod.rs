//! Durable record of the last bridge we connected to.
//!
//! A single JSON file, `{data_dir}/last_connection.json`, holding
//! `{ "last_connection": { "host": ..., "port": ... } }`. Every successful
//! connect overwrites it; there is never more than one record.
//!
//! Reads and writes go through one mutex so a `save` can never interleave
//! with a `load` half-way through the rename.

use crate::error::storage::StorageError;

use common::ErrorLocation;
use models::{Endpoint, EndpointRecord};

use std::io::ErrorKind;
use std::panic::Location;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

pub const RECORD_FILE_NAME: &str = "last_connection.json";

#[derive(Debug, Serialize, Deserialize)]
struct PersistedConnection {
    last_connection: EndpointRecord,
}

pub struct ConnectionStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl ConnectionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(RECORD_FILE_NAME)
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The guarded value is (), so a poisoned lock carries no broken state
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Overwrite the record with `endpoint`.
    ///
    /// Writes to a temp file and renames it into place.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the directory cannot be created or the
    /// write/rename fails.
    pub fn save(&self, endpoint: &Endpoint) -> Result<(), StorageError> {
        let _guard = self.guard();

        std::fs::create_dir_all(&self.dir).map_err(|e| StorageError::write(&self.dir, e))?;

        let record = PersistedConnection {
            last_connection: endpoint.to_record(),
        };
        let json =
            serde_json::to_string_pretty(&record).map_err(|e| StorageError::Serialize {
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let path = self.path();
        let temp_path = self.dir.join(format!("{RECORD_FILE_NAME}.tmp"));

        std::fs::write(&temp_path, json).map_err(|e| StorageError::write(&temp_path, e))?;
        std::fs::rename(&temp_path, &path).map_err(|e| StorageError::write(&path, e))?;

        info!("Saved last connection {endpoint} to {}", path.display());
        Ok(())
    }

    /// Read the record.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(endpoint))` - A record exists and is valid
    /// * `Ok(None)` - Nothing was ever saved (or it was cleared)
    /// * `Err(StorageError)` - The file exists but cannot be read or parsed
    pub fn load(&self) -> Result<Option<Endpoint>, StorageError> {
        let _guard = self.guard();
        let path = self.path();

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No saved connection at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(StorageError::read(&path, e)),
        };

        let record: PersistedConnection = serde_json::from_str(&contents).map_err(|e| {
            warn!("Saved connection at {} is corrupt: {e}", path.display());
            StorageError::parse(&path, e.to_string())
        })?;

        let endpoint = Endpoint::try_from(record.last_connection)
            .map_err(|e| StorageError::parse(&path, e.message()))?;

        debug!("Loaded saved connection {endpoint}");
        Ok(Some(endpoint))
    }

    /// Remove the record.
    ///
    /// Returns `true` if a record existed.
    pub fn clear(&self) -> Result<bool, StorageError> {
        let _guard = self.guard();
        let path = self.path();

        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!("Cleared saved connection at {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::write(&path, e)),
        }
    }
}
