//! Per-session turn serialization.
//!
//! Turns within one session are strictly sequential: the handler holds the
//! session's lock across the whole read-modify-write turn, so two
//! concurrent messages for the same session queue rather than interleave.
//! Different sessions proceed concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

use crate::domain::foundation::SessionId;

/// Registry handing out one async mutex per session id.
///
/// The registry itself uses a std mutex held only for the map lookup;
/// the per-session lock is a `tokio::sync::Mutex` acquired outside it.
#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<SessionId, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the turn lock for a session, waiting if another turn is
    /// in flight.
    pub async fn acquire(&self, id: SessionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(id).or_default())
        };
        lock.lock_owned().await
    }

    /// Drop the lock entry for a finished session. A later `acquire` for
    /// the same id simply creates a fresh entry.
    pub fn release(&self, id: &SessionId) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.remove(id);
    }

    /// Number of sessions currently tracked.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn same_session_turns_are_serialized() {
        let locks = Arc::new(SessionLocks::new());
        let id = SessionId::new();
        let in_flight = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let in_flight = Arc::clone(&in_flight);
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(id).await;
                let now = in_flight.fetch_add(1, Ordering::SeqCst);
                assert_eq!(now, 0, "another turn was in flight under the lock");
                tokio::task::yield_now().await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn release_drops_the_tracked_entry() {
        let locks = SessionLocks::new();
        let id = SessionId::new();

        let guard = locks.acquire(id).await;
        assert_eq!(locks.len(), 1);
        drop(guard);

        locks.release(&id);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn different_sessions_do_not_block_each_other() {
        let locks = SessionLocks::new();
        let a = SessionId::new();
        let b = SessionId::new();

        let _guard_a = locks.acquire(a).await;
        // Would deadlock if sessions shared a lock.
        let _guard_b = locks.acquire(b).await;
    }
}
