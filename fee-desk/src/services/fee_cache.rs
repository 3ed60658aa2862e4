//! Read-through cache over the fee ledger.
//!
//! Entries are immutable snapshots. Writes never patch a snapshot: after a
//! collect or revert the student's entry is dropped and the next read
//! refetches from the API.

use crate::models::{DiscountRule, FeeRecord};
use crate::services::fee_api::{FeeApiError, FeeLedger};
use crate::services::metrics;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Slot count above which a miss sweeps out idle slots.
const SWEEP_THRESHOLD: usize = 256;

struct Entry<T> {
    fetched_at: Instant,
    value: Arc<T>,
}

impl<T> Entry<T> {
    fn new(value: Arc<T>) -> Self {
        Self {
            fetched_at: Instant::now(),
            value,
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Per-student cache state. `generation` changes on every invalidation, and
/// a fetch only fills the slot if the generation it started under is still
/// current.
struct Slot {
    generation: u64,
    touched: Instant,
    entry: Option<Entry<Vec<FeeRecord>>>,
}

pub struct FeeCache {
    ledger: Arc<dyn FeeLedger>,
    ttl: Duration,
    fees: DashMap<String, Slot>,
    generations: AtomicU64,
    discounts: RwLock<Option<Entry<Vec<DiscountRule>>>>,
}

impl FeeCache {
    pub fn new(ledger: Arc<dyn FeeLedger>, ttl: Duration) -> Self {
        Self {
            ledger,
            ttl,
            fees: DashMap::new(),
            generations: AtomicU64::new(0),
            discounts: RwLock::new(None),
        }
    }

    pub fn ledger(&self) -> &Arc<dyn FeeLedger> {
        &self.ledger
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed)
    }

    /// Fee records of a student, fetched on miss or expiry.
    pub async fn student_fees(
        &self,
        student_id: &str,
        caller_token: Option<&str>,
    ) -> Result<Arc<Vec<FeeRecord>>, FeeApiError> {
        // The shard guard is released before the fetch is awaited.
        let generation = {
            let mut slot = self
                .fees
                .entry(student_id.to_string())
                .or_insert_with(|| Slot {
                    generation: self.next_generation(),
                    touched: Instant::now(),
                    entry: None,
                });

            if let Some(entry) = slot.entry.as_ref().filter(|e| e.is_fresh(self.ttl)) {
                let records = entry.value.clone();
                metrics::record_cache_lookup("student_fees", true);
                return Ok(records);
            }

            slot.entry = None;
            slot.touched = Instant::now();
            slot.generation
        };

        metrics::record_cache_lookup("student_fees", false);
        self.sweep();

        let records = Arc::new(self.ledger.student_fees(student_id, caller_token).await?);

        match self.fees.get_mut(student_id) {
            Some(mut slot) if slot.generation == generation => {
                slot.entry = Some(Entry::new(records.clone()));
            }
            _ => {
                tracing::debug!(student_id = %student_id, "Fee records changed during fetch; not cached");
            }
        }

        Ok(records)
    }

    /// The discount catalogue. Expires by TTL only.
    pub async fn discounts(
        &self,
        caller_token: Option<&str>,
    ) -> Result<Arc<Vec<DiscountRule>>, FeeApiError> {
        {
            let guard = self.discounts.read().await;
            if let Some(entry) = guard.as_ref().filter(|e| e.is_fresh(self.ttl)) {
                metrics::record_cache_lookup("fee_discounts", true);
                return Ok(entry.value.clone());
            }
        }

        metrics::record_cache_lookup("fee_discounts", false);
        let rules = Arc::new(self.ledger.fee_discounts(caller_token).await?);
        *self.discounts.write().await = Some(Entry::new(rules.clone()));
        Ok(rules)
    }

    /// Drop a student's cached fee records. A fetch already in flight for the
    /// student will not repopulate the cache.
    pub fn invalidate(&self, student_id: &str) {
        if let Some(mut slot) = self.fees.get_mut(student_id) {
            slot.generation = self.next_generation();
            slot.entry = None;
            tracing::debug!(student_id = %student_id, "Invalidated cached fee records");
        }
    }

    /// Remove slots that hold nothing fresh and saw no fetch within the TTL.
    fn sweep(&self) {
        if self.fees.len() < SWEEP_THRESHOLD {
            return;
        }

        let ttl = self.ttl;
        self.fees.retain(|_, slot| {
            slot.touched.elapsed() < ttl || slot.entry.as_ref().is_some_and(|e| e.is_fresh(ttl))
        });
    }
}
