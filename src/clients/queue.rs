use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Error, Result, anyhow};
use tracing::debug;
use uuid::Uuid;

use crate::models::record::NotificationRecord;

/// A claimed queue item: the deserialized record plus the id needed to
/// delete or release it.
#[derive(Debug, Clone)]
pub struct QueueItem {
    pub item_id: Uuid,
    pub record: NotificationRecord,
}

/// Durable queue boundary with at-least-once visibility. Claimed items are
/// invisible to further claims until deleted, released, or their claim lease
/// expires.
pub trait QueueStore: Send + Sync {
    fn enqueue(&self, record: &NotificationRecord) -> impl Future<Output = Result<(), Error>> + Send;
    fn claim(&self) -> impl Future<Output = Result<Option<QueueItem>, Error>> + Send;
    fn delete(&self, item: &QueueItem) -> impl Future<Output = Result<(), Error>> + Send;
    fn release(&self, item: &QueueItem) -> impl Future<Output = Result<(), Error>> + Send;
}

struct StoredItem {
    item_id: Uuid,
    /// Records are persisted serialized, exactly as a durable backend would
    /// hold them between enqueue and claim.
    payload: String,
    claimed_until: Option<Instant>,
}

impl StoredItem {
    fn is_claimable(&self, now: Instant) -> bool {
        match self.claimed_until {
            None => true,
            Some(expiry) => expiry <= now,
        }
    }
}

/// In-process queue store with lease-based claims. Handles are cheap clones
/// sharing one backing store, so the two entry points (and tests) drain the
/// same queue.
#[derive(Clone)]
pub struct MemoryQueue {
    name: String,
    claim_lease: Duration,
    items: Arc<Mutex<Vec<StoredItem>>>,
}

impl MemoryQueue {
    pub fn open(name: &str, claim_lease: Duration) -> Self {
        debug!(queue = name, "Opening notification queue");

        Self {
            name: name.to_string(),
            claim_lease,
            items: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Items visible to the next claim.
    pub fn pending_count(&self) -> usize {
        let now = Instant::now();
        let items = self.items.lock().expect("queue mutex poisoned");
        items.iter().filter(|item| item.is_claimable(now)).count()
    }

    /// Items currently held under an unexpired claim lease.
    pub fn claimed_count(&self) -> usize {
        let now = Instant::now();
        let items = self.items.lock().expect("queue mutex poisoned");
        items.iter().filter(|item| !item.is_claimable(now)).count()
    }

    pub fn len(&self) -> usize {
        self.items.lock().expect("queue mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QueueStore for MemoryQueue {
    async fn enqueue(&self, record: &NotificationRecord) -> Result<(), Error> {
        let payload = serde_json::to_string(record)
            .map_err(|e| anyhow!("Failed to serialize queue item: {}", e))?;

        let mut items = self.items.lock().expect("queue mutex poisoned");
        items.push(StoredItem {
            item_id: Uuid::new_v4(),
            payload,
            claimed_until: None,
        });

        Ok(())
    }

    async fn claim(&self) -> Result<Option<QueueItem>, Error> {
        let now = Instant::now();
        let mut items = self.items.lock().expect("queue mutex poisoned");

        let Some(stored) = items.iter_mut().find(|item| item.is_claimable(now)) else {
            return Ok(None);
        };

        let record = serde_json::from_str(&stored.payload)
            .map_err(|e| anyhow!("Failed to deserialize queue item: {}", e))?;

        stored.claimed_until = Some(now + self.claim_lease);

        Ok(Some(QueueItem {
            item_id: stored.item_id,
            record,
        }))
    }

    async fn delete(&self, item: &QueueItem) -> Result<(), Error> {
        let mut items = self.items.lock().expect("queue mutex poisoned");
        items.retain(|stored| stored.item_id != item.item_id);
        Ok(())
    }

    async fn release(&self, item: &QueueItem) -> Result<(), Error> {
        let mut items = self.items.lock().expect("queue mutex poisoned");

        let stored = items
            .iter_mut()
            .find(|stored| stored.item_id == item.item_id)
            .ok_or_else(|| anyhow!("Cannot release unknown queue item {}", item.item_id))?;

        stored.claimed_until = None;
        Ok(())
    }
}
