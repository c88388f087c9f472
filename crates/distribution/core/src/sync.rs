//! Lock helpers shared by the managers.
//!
//! The host process must keep running after a panic on another thread, so a
//! poisoned lock is logged and recovered instead of propagated.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) fn read<'a, T>(lock: &'a RwLock<T>, name: &str) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|poisoned: PoisonError<_>| {
        tracing::warn!(lock = name, "recovering poisoned lock");
        poisoned.into_inner()
    })
}

pub(crate) fn write<'a, T>(lock: &'a RwLock<T>, name: &str) -> RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|poisoned: PoisonError<_>| {
        tracing::warn!(lock = name, "recovering poisoned lock");
        poisoned.into_inner()
    })
}
