//! Operation guard
//!
//! Serializes ledger operations across threads and rejects re-entry from the
//! thread that already holds the guard (a collaborator calling back into the
//! ledger mid-operation).

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::cell::Cell;

use crate::error::{LedgerError, LedgerResult};

#[derive(Debug, Default)]
pub struct OperationGuard {
    lock: ReentrantMutex<Cell<bool>>,
}

/// Held for the full duration of one operation
pub struct ActiveOperation<'a> {
    inner: ReentrantMutexGuard<'a, Cell<bool>>,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until no other thread runs an operation; fail on re-entry
    pub fn enter(&self) -> LedgerResult<ActiveOperation<'_>> {
        let inner = self.lock.lock();
        if inner.get() {
            return Err(LedgerError::ReentrantCall);
        }
        inner.set(true);
        Ok(ActiveOperation { inner })
    }
}

impl Drop for ActiveOperation<'_> {
    fn drop(&mut self) {
        self.inner.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_reentry_rejected() {
        let guard = OperationGuard::new();
        let outer = guard.enter().unwrap();
        assert!(matches!(guard.enter(), Err(LedgerError::ReentrantCall)));
        drop(outer);
        assert!(guard.enter().is_ok());
    }

    #[test]
    fn test_other_threads_wait() {
        let guard = Arc::new(OperationGuard::new());
        let held = guard.enter().unwrap();

        let other = Arc::clone(&guard);
        let handle = std::thread::spawn(move || other.enter().is_ok());

        drop(held);
        assert!(handle.join().unwrap());
    }
}
