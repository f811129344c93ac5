use marquee_core::{StoreError, StoreResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;

/// Slots are pruned once the table grows past this many keys.
const PRUNE_THRESHOLD: usize = 1024;

/// Keyed async mutexes: one per theater, or one per (showtime, seat).
///
/// A guard from `acquire` stays valid after the table lock is released, so
/// holders can await while keeping their key locked.
pub(crate) struct LockTable<K> {
    slots: Mutex<HashMap<K, Arc<tokio::sync::Mutex<()>>>>,
    wait: Duration,
}

impl<K> LockTable<K>
where
    K: Eq + Hash + Clone + Debug,
{
    pub(crate) fn new(wait: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            wait,
        }
    }

    /// Waits at most the configured duration; `Busy` on timeout.
    pub(crate) async fn acquire(&self, key: &K) -> StoreResult<OwnedMutexGuard<()>> {
        let slot = {
            let mut slots = self.slots.lock();
            if slots.len() > PRUNE_THRESHOLD {
                // Only the table itself holds idle slots.
                slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            }
            slots.entry(key.clone()).or_default().clone()
        };

        tokio::time::timeout(self.wait, slot.lock_owned())
            .await
            .map_err(|_| {
                StoreError::Busy(format!(
                    "timed out after {:?} waiting for lock on {:?}",
                    self.wait, key
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_key_times_out_while_held() {
        let table = LockTable::new(Duration::from_millis(20));
        let held = table.acquire(&"theater:A".to_string()).await.unwrap();

        let err = table.acquire(&"theater:A".to_string()).await.unwrap_err();
        assert!(matches!(err, StoreError::Busy(_)));

        // Other keys are independent.
        assert!(table.acquire(&"theater:B".to_string()).await.is_ok());

        drop(held);
        assert!(table.acquire(&"theater:A".to_string()).await.is_ok());
    }
}
