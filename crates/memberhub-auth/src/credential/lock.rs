//! Per-member serialization of credential updates.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use memberhub_core::types::id::MemberId;

/// One async mutex per member with an update in flight.
///
/// Entries are created on demand and dropped once no caller holds or waits
/// on them, so the map only grows with concurrent activity.
#[derive(Debug, Clone, Default)]
pub struct MemberLocks {
    locks: Arc<DashMap<MemberId, Arc<Mutex<()>>>>,
}

/// Held for the duration of one credential update.
#[derive(Debug)]
pub struct MemberLockGuard {
    member_id: MemberId,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<DashMap<MemberId, Arc<Mutex<()>>>>,
}

impl MemberLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other update for `member_id` is running in this process.
    pub async fn acquire(&self, member_id: MemberId) -> MemberLockGuard {
        let mutex = self
            .locks
            .entry(member_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();

        MemberLockGuard {
            member_id,
            guard: Some(mutex.lock_owned().await),
            locks: self.locks.clone(),
        }
    }

    /// Members with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no member has a live lock entry.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for MemberLockGuard {
    fn drop(&mut self) {
        self.guard.take();
        // Only the map holds the mutex now; nobody is waiting on it.
        self.locks
            .remove_if(&self.member_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
