//! Lock helper shared by the engine's concurrency-safe containers.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if a previous holder panicked.
///
/// The engine's critical sections are pure bookkeeping (map membership,
/// counter decrements), so a poisoned guard is still internally consistent.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
