//! JSON snapshot file
//!
//! The whole scheduler state is written as one JSON document. Writes go to a
//! sibling temporary file that is synced and then renamed over the target, so
//! a crash mid-write leaves the previous snapshot intact.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::booking::api::SchedulerState;
use crate::core::version;
use crate::storage::error::{StorageError, StorageResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub format_version: u32,
    pub saved_at: NaiveDateTime,
    pub state: SchedulerState,
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read the stored state; `None` when no snapshot has been written yet
    pub fn load(&self) -> StorageResult<Option<Snapshot>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No snapshot at {}", self.path.display());
                return Ok(None);
            }
            Err(source) => return Err(self.io_error(source)),
        };

        let snapshot: Snapshot =
            serde_json::from_str(&content).map_err(|source| StorageError::Format {
                path: self.path.clone(),
                source,
            })?;
        let expected = version::snapshot_format_version();
        if snapshot.format_version != expected {
            return Err(StorageError::UnsupportedVersion {
                path: self.path.clone(),
                found: snapshot.format_version,
                expected,
            });
        }
        log::info!(
            "Loaded snapshot from {} saved {} ({} services, {} appointments)",
            self.path.display(),
            snapshot.saved_at,
            snapshot.state.services.len(),
            snapshot.state.ledger.appointments.len()
        );
        Ok(Some(snapshot))
    }

    /// Replace the stored state atomically
    pub fn save(&self, state: &SchedulerState, saved_at: NaiveDateTime) -> StorageResult<()> {
        let snapshot = Snapshot {
            format_version: version::snapshot_format_version(),
            saved_at,
            state: state.clone(),
        };
        let json = serde_json::to_string_pretty(&snapshot).map_err(|source| StorageError::Format {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let temp = self.temp_path();
        let written = fs::File::create(&temp).and_then(|mut file| {
            file.write_all(json.as_bytes())?;
            file.sync_all()
        });
        if let Err(source) = written.and_then(|()| fs::rename(&temp, &self.path)) {
            let _ = fs::remove_file(&temp);
            return Err(self.io_error(source));
        }
        log::debug!("Snapshot saved to {}", self.path.display());
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
