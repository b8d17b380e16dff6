//! Lock helpers that turn poisoning into errors instead of panics
//!
//! Catalog, calendar, ledger and session state are all guarded by std locks.
//! A poisoned lock means a panic happened while the state was being mutated;
//! the state may be half-updated, so callers get an error they can report
//! rather than a second panic.

use std::sync::{LockResult, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

fn poisoned_message(kind: &str, what: &str) -> String {
    format!(
        "Internal synchronisation error ({} lock on {} poisoned). A panic occurred while holding it.",
        kind, what
    )
}

fn map_poison<G, E>(
    result: LockResult<G>,
    kind: &str,
    what: &str,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<G, E> {
    result.map_err(|_| error_constructor(poisoned_message(kind, what)))
}

/// Lock a mutex, mapping poisoning into the caller's error type
pub fn lock<'a, T, E>(
    mutex: &'a Mutex<T>,
    what: &str,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<MutexGuard<'a, T>, E> {
    map_poison(mutex.lock(), "mutex", what, error_constructor)
}

/// Take a read lock, mapping poisoning into the caller's error type
pub fn read<'a, T, E>(
    rwlock: &'a RwLock<T>,
    what: &str,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockReadGuard<'a, T>, E> {
    map_poison(rwlock.read(), "read", what, error_constructor)
}

/// Take a write lock, mapping poisoning into the caller's error type
pub fn write<'a, T, E>(
    rwlock: &'a RwLock<T>,
    what: &str,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockWriteGuard<'a, T>, E> {
    map_poison(rwlock.write(), "write", what, error_constructor)
}
