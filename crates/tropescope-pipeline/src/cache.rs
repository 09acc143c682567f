//! Single-flight result cache keyed by exact input text
//!
//! The map lock is held only to look up or insert a slot. The computation
//! runs outside it, on the slot's `OnceCell`, so concurrent requests for the
//! same text share one execution and slow oracle calls never block other keys.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;
use tracing::debug;
use tropescope_domain::RiskResult;

type Slot = Arc<OnceCell<Arc<RiskResult>>>;

struct Entry {
    slot: Slot,
    last_used: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, Entry>,
    clock: u64,
}

/// How a lookup was answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// This call ran the computation
    Computed,
    /// The result was cached or computed by a concurrent caller
    Shared,
}

/// Cache of completed results with get-or-begin-compute semantics
pub struct ResultCache {
    capacity: Option<usize>,
    state: Mutex<CacheState>,
}

impl ResultCache {
    /// Create a cache; `capacity` bounds completed entries, `None` is unbounded
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            state: Mutex::new(CacheState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomic check-then-insert: the existing slot for `key`, or a fresh one
    fn slot(&self, key: &str) -> Slot {
        let mut state = self.state();
        state.clock += 1;
        let now = state.clock;

        if let Some(entry) = state.entries.get_mut(key) {
            entry.last_used = now;
            return Arc::clone(&entry.slot);
        }

        let slot: Slot = Arc::new(OnceCell::new());
        state.entries.insert(
            key.to_string(),
            Entry {
                slot: Arc::clone(&slot),
                last_used: now,
            },
        );

        if let Some(capacity) = self.capacity {
            evict(&mut state, capacity, key);
        }

        slot
    }

    /// Return the cached result for `key`, or run `compute` to produce it
    ///
    /// Concurrent callers with the same key wait for the first computation.
    /// A failed computation is not cached; the next caller tries again.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, compute: F) -> (Result<Arc<RiskResult>, E>, Lookup)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<RiskResult>, E>>,
    {
        let slot = self.slot(key);

        if let Some(result) = slot.get() {
            return (Ok(Arc::clone(result)), Lookup::Shared);
        }

        let ran = AtomicBool::new(false);
        let outcome = slot
            .get_or_try_init(|| {
                ran.store(true, Ordering::Relaxed);
                compute()
            })
            .await
            .map(Arc::clone);

        if outcome.is_err() {
            self.forget_failed(key, &slot);
        }

        let lookup = if ran.load(Ordering::Relaxed) {
            Lookup::Computed
        } else {
            Lookup::Shared
        };
        (outcome, lookup)
    }

    /// Drop `slot` if it is still the uninitialized entry for `key`
    fn forget_failed(&self, key: &str, slot: &Slot) {
        let mut state = self.state();
        let stale = state
            .entries
            .get(key)
            .is_some_and(|entry| Arc::ptr_eq(&entry.slot, slot) && !entry.slot.initialized());
        if stale {
            state.entries.remove(key);
        }
    }

    /// Completed results currently cached
    pub fn len(&self) -> usize {
        self.state()
            .entries
            .values()
            .filter(|entry| entry.slot.initialized())
            .count()
    }

    /// Whether no completed result is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry; in-flight computations finish but are not retained
    pub fn clear(&self) {
        self.state().entries.clear();
    }
}

/// Evict least recently used completed entries until within `capacity`
///
/// In-flight entries and the entry just inserted are never evicted, so the
/// map may briefly exceed `capacity` while computations are running.
fn evict(state: &mut CacheState, capacity: usize, keep: &str) {
    while state.entries.len() > capacity {
        let victim = state
            .entries
            .iter()
            .filter(|(key, entry)| key.as_str() != keep && entry.slot.initialized())
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());

        match victim {
            Some(key) => {
                debug!(text_len = key.len(), "Evicting cached result");
                state.entries.remove(&key);
            }
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tropescope_domain::{ClaimRecord, CounterfactualResult, Explicitness, Target, TropeMatch};

    fn result(label: &str) -> Arc<RiskResult> {
        Arc::new(RiskResult::new(
            0.0,
            TropeMatch::none(label, ""),
            ClaimRecord::new(label, label, Target::Unclear, Explicitness::Implicit),
            CounterfactualResult::new("", true, ""),
        ))
    }

    async fn fill(cache: &ResultCache, key: &str) -> Lookup {
        let (outcome, lookup) = cache
            .get_or_compute(key, || async { Ok::<_, String>(result(key)) })
            .await;
        assert!(outcome.is_ok());
        lookup
    }

    #[tokio::test]
    async fn test_second_lookup_is_shared() {
        let cache = ResultCache::new(None);

        assert_eq!(fill(&cache, "a").await, Lookup::Computed);
        assert_eq!(fill(&cache, "a").await, Lookup::Shared);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = ResultCache::new(None);

        let (outcome, _) = cache
            .get_or_compute("a", || async { Err::<Arc<RiskResult>, _>("boom".to_string()) })
            .await;
        assert_eq!(outcome.unwrap_err(), "boom");
        assert!(cache.is_empty());

        assert_eq!(fill(&cache, "a").await, Lookup::Computed);
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_compute_once() {
        let cache = Arc::new(ResultCache::new(None));
        let runs = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let runs = Arc::clone(&runs);
                tokio::spawn(async move {
                    cache
                        .get_or_compute("same", || async move {
                            runs.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok::<_, String>(result("same"))
                        })
                        .await
                })
            })
            .collect();

        let mut results = Vec::new();
        for task in tasks {
            let (outcome, _) = task.await.unwrap();
            results.push(outcome.unwrap());
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(results.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = ResultCache::new(Some(2));

        fill(&cache, "a").await;
        fill(&cache, "b").await;
        // Touch "a" so "b" becomes least recently used
        fill(&cache, "a").await;
        fill(&cache, "c").await;

        assert_eq!(cache.len(), 2);
        assert_eq!(fill(&cache, "a").await, Lookup::Shared);
        assert_eq!(fill(&cache, "c").await, Lookup::Shared);
        assert_eq!(fill(&cache, "b").await, Lookup::Computed);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = ResultCache::new(None);
        fill(&cache, "a").await;
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(fill(&cache, "a").await, Lookup::Computed);
    }
}
