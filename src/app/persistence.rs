//! Saving scheduler state after changes

use std::sync::Arc;

use crate::booking::api::{Scheduler, SchedulerConfig};
use crate::core::error_handling::log_error_with_context;
use crate::core::time::Clock;
use crate::storage::{StorageError, StorageResult, SnapshotStore};

/// Writes snapshots when a data file is configured; does nothing otherwise
pub struct Persistence {
    store: Option<SnapshotStore>,
    clock: Arc<dyn Clock>,
}

impl Persistence {
    pub fn new(store: Option<SnapshotStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Restore the scheduler from the data file, if it holds a snapshot
    pub fn load(&self, config: SchedulerConfig) -> StorageResult<Option<Scheduler>> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        let Some(snapshot) = store.load()? else {
            return Ok(None);
        };
        Scheduler::from_state(config, snapshot.state, self.clock.clone())
            .map(Some)
            .map_err(|source| StorageError::Inconsistent {
                path: store.path().to_path_buf(),
                source,
            })
    }

    /// Save the current state; failures are logged, never fatal
    pub fn save(&self, scheduler: &Scheduler) {
        let Some(store) = &self.store else {
            return;
        };
        let result = scheduler
            .state()
            .map_err(|source| StorageError::Inconsistent {
                path: store.path().to_path_buf(),
                source,
            })
            .and_then(|state| store.save(&state, self.clock.now()));
        if let Err(e) = result {
            log_error_with_context(&e, "Saving salon state");
        }
    }
}
