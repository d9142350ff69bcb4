//! Demo quota: how many messages an anonymous visitor has sent per session id.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use chat_types::{Result, api::DemoQuota};
use crate::ports::QuotaCounter;

pub struct QuotaTracker {
    counter: Arc<dyn QuotaCounter>,
    limit: u32,
}

impl QuotaTracker {
    pub fn new(counter: Arc<dyn QuotaCounter>, limit: u32) -> Self {
        Self { counter, limit }
    }

    /// Count one more message for `session_id` and return the new total.
    pub async fn track(&self, session_id: &str) -> Result<u64> {
        self.counter.increment(session_id).await
    }

    /// Messages counted so far, without counting a new one.
    pub async fn count(&self, session_id: &str) -> Result<u64> {
        self.counter.get(session_id).await
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn exceeded(&self, count: u64) -> bool {
        count > u64::from(self.limit)
    }

    /// Demo counters as they go out on the wire.
    pub fn quota(&self, count: u64) -> DemoQuota {
        DemoQuota {
            demo_mode: true,
            message_count: u32::try_from(count).unwrap_or(u32::MAX),
            message_limit: self.limit,
        }
    }
}

struct Slot {
    count: u64,
    last_seen: Instant,
}

/// Process-local counters. Lost on restart.
#[derive(Default)]
pub struct InMemoryQuotaCounter {
    slots: DashMap<String, Slot>,
}

impl InMemoryQuotaCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop counters untouched for longer than `max_idle`. Returns how many went.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.slots.len();
        let now = Instant::now();
        self.slots
            .retain(|_, slot| now.saturating_duration_since(slot.last_seen) <= max_idle);
        before.saturating_sub(self.slots.len())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[async_trait]
impl QuotaCounter for InMemoryQuotaCounter {
    async fn increment(&self, key: &str) -> Result<u64> {
        let now = Instant::now();
        // The entry guard holds the shard lock across read-increment-write.
        let mut slot = self
            .slots
            .entry(key.to_string())
            .or_insert_with(|| Slot { count: 0, last_seen: now });
        slot.count += 1;
        slot.last_seen = now;
        Ok(slot.count)
    }

    async fn get(&self, key: &str) -> Result<u64> {
        Ok(self.slots.get(key).map(|slot| slot.count).unwrap_or(0))
    }
}
