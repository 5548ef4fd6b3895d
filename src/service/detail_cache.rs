use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::join_all;

use crate::{
    domain::{PaymentDetail, PaymentFile},
    service::resolver::PaymentDetailResolver,
};

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, PaymentDetail>,
    /// Bumped on every eviction
    evictions: u64,
    /// Eviction count at the time each id was last evicted, kept only while
    /// an older lookup may still be in flight
    evicted_at: HashMap<String, u64>,
    /// Running `ensure` calls, by the eviction count they started at
    in_flight: BTreeMap<u64, usize>,
}

impl CacheState {
    fn begin(&mut self) -> u64 {
        *self.in_flight.entry(self.evictions).or_default() += 1;
        self.evictions
    }

    fn finish(&mut self, started_at: u64) {
        if let Some(count) = self.in_flight.get_mut(&started_at) {
            *count -= 1;
            if *count == 0 {
                self.in_flight.remove(&started_at);
            }
        }
        match self.in_flight.keys().next().copied() {
            Some(oldest) => self.evicted_at.retain(|_, at| *at > oldest),
            None => self.evicted_at.clear(),
        }
    }

    fn record_eviction(&mut self, payment_id: &str) {
        self.evictions += 1;
        if !self.in_flight.is_empty() {
            self.evicted_at.insert(payment_id.to_string(), self.evictions);
        }
    }

    fn evicted_since(&self, payment_id: &str, started_at: u64) -> bool {
        self.evicted_at.get(payment_id).map_or(false, |&at| at > started_at)
    }
}

/// Registration of one running `ensure`, released even if the call is dropped.
struct InFlight<'a> {
    cache: &'a PaymentDetailCache,
    started_at: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.cache.lock().finish(self.started_at);
    }
}

/// Session-lifetime cache of resolved payment details, keyed by payment id.
///
/// Entries are never refreshed once populated; they only leave through
/// [`evict`](Self::evict) when their payment is deleted.
pub struct PaymentDetailCache {
    resolver: Arc<PaymentDetailResolver>,
    state: Mutex<CacheState>,
}

impl PaymentDetailCache {
    pub fn new(resolver: Arc<PaymentDetailResolver>) -> Self {
        Self {
            resolver,
            state: Mutex::new(CacheState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // The map stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make sure every payment in `payments` has a detail, resolving only the
    /// ones not cached yet. Lookups run concurrently and are merged in one
    /// step once all of them settled; failed lookups are left out.
    ///
    /// Returns the number of newly cached details.
    pub async fn ensure(&self, payments: &[PaymentFile]) -> usize {
        let (missing, flight) = {
            let mut state = self.lock();
            let mut seen = HashSet::new();
            let missing: Vec<&PaymentFile> = payments
                .iter()
                .filter(|p| !state.entries.contains_key(&p.id) && seen.insert(p.id.as_str()))
                .collect();
            if missing.is_empty() {
                return 0;
            }
            let started_at = state.begin();
            (missing, InFlight { cache: self, started_at })
        };

        let resolved = join_all(missing.into_iter().map(|payment| async move {
            let detail = self.resolver.resolve_payment(payment).await;
            (payment.id.clone(), detail)
        }))
        .await;

        let mut state = self.lock();
        let mut merged = 0;
        for (id, detail) in resolved {
            let Some(detail) = detail else { continue };
            // Deleted while the lookup was in flight
            if state.evicted_since(&id, flight.started_at) {
                continue;
            }
            state.entries.insert(id, detail);
            merged += 1;
        }
        tracing::debug!("Merged {} payment details into cache ({} total)", merged, state.entries.len());
        drop(state);
        merged
    }

    /// Cached detail for one payment of `payments`, resolving it on a miss.
    pub async fn get_or_resolve(&self, payments: &[PaymentFile], payment_id: &str) -> Option<PaymentDetail> {
        if let Some(detail) = self.get(payment_id) {
            return Some(detail);
        }
        let payment = payments.iter().find(|p| p.id == payment_id)?;
        self.ensure(std::slice::from_ref(payment)).await;
        self.get(payment_id)
    }

    pub fn get(&self, payment_id: &str) -> Option<PaymentDetail> {
        self.lock().entries.get(payment_id).cloned()
    }

    pub fn contains(&self, payment_id: &str) -> bool {
        self.lock().entries.contains_key(payment_id)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the detail of a deleted payment. Lookups for it that are still
    /// in flight will not be merged.
    pub fn evict(&self, payment_id: &str) -> bool {
        let mut state = self.lock();
        state.record_eviction(payment_id);
        state.entries.remove(payment_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eviction_marks_are_dropped_once_lookups_finish() {
        let mut state = CacheState::default();

        // Nothing in flight, nothing to remember
        state.record_eviction("p0");
        assert!(state.evicted_at.is_empty());

        let first = state.begin();
        state.record_eviction("p1");
        let second = state.begin();
        state.record_eviction("p2");
        assert!(state.evicted_since("p1", first));
        assert!(!state.evicted_since("p1", second));
        assert!(state.evicted_since("p2", second));

        state.finish(first);
        assert!(!state.evicted_at.contains_key("p1"));
        assert!(state.evicted_since("p2", second));

        state.finish(second);
        assert!(state.evicted_at.is_empty());
        assert!(state.in_flight.is_empty());
    }

    #[test]
    fn test_concurrent_lookups_from_the_same_epoch() {
        let mut state = CacheState::default();
        let a = state.begin();
        let b = state.begin();
        assert_eq!(a, b);
        state.record_eviction("p1");

        state.finish(a);
        assert!(state.evicted_since("p1", b));
        state.finish(b);
        assert!(state.evicted_at.is_empty());
    }
}
