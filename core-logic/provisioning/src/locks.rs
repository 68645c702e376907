//! In-process locks serialising flows acting on the same runtime.
//!
//! The "one in-flight operation per runtime" rule is checked by reading the last
//! operation before inserting a new one.
//! Two flows for the same runtime running concurrently could both pass the check.
//! [`RuntimeLocks`] close this window for flows executed by the same process.
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::OwnedMutexGuard;

/// Per-runtime locks, created on demand and dropped once unused.
#[derive(Clone, Default)]
pub struct RuntimeLocks {
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl RuntimeLocks {
    fn access(&self) -> MutexGuard<'_, HashMap<String, Arc<AsyncMutex<()>>>> {
        self.locks
            .lock()
            .expect("RuntimeLocks::locks lock poisoned")
    }

    /// Wait for exclusive access to the runtime.
    ///
    /// Access is released when the returned guard is dropped.
    pub async fn lock(&self, runtime_id: &str) -> RuntimeLockGuard {
        let lock = self
            .access()
            .entry(runtime_id.to_string())
            .or_default()
            .clone();
        let guard = lock.lock_owned().await;
        RuntimeLockGuard {
            guard: Some(guard),
            locks: self.clone(),
            runtime_id: runtime_id.to_string(),
        }
    }

    /// Number of runtimes currently locked or waited on.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.access().len()
    }

    /// Check if no runtime is locked or waited on.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.access().is_empty()
    }
}

/// Exclusive access to a runtime, released on drop.
pub struct RuntimeLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: RuntimeLocks,
    runtime_id: String,
}

impl Drop for RuntimeLockGuard {
    fn drop(&mut self) {
        let mut locks = self.locks.access();
        drop(self.guard.take());

        // Waiters clone the lock while holding the map, so a single reference means none.
        let unused = locks
            .get(&self.runtime_id)
            .map(|lock| Arc::strong_count(lock) == 1)
            .unwrap_or(false);
        if unused {
            locks.remove(&self.runtime_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::RuntimeLocks;

    #[tokio::test]
    async fn lock_released_on_drop() {
        let locks = RuntimeLocks::default();
        let guard = locks.lock("runtime").await;
        assert_eq!(locks.len(), 1);
        drop(guard);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn different_runtimes_do_not_block() {
        let locks = RuntimeLocks::default();
        let _first = locks.lock("runtime-1").await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.lock("runtime-2")).await;
        assert!(second.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn same_runtime_waits() {
        let locks = RuntimeLocks::default();
        let first = locks.lock("runtime").await;
        let blocked = tokio::time::timeout(Duration::from_millis(20), locks.lock("runtime")).await;
        assert!(blocked.is_err());

        drop(first);
        let second = tokio::time::timeout(Duration::from_millis(50), locks.lock("runtime")).await;
        assert!(second.is_ok());
    }
}
