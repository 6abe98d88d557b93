use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// TtlCache – process-wide cache with expiry and fetch coalescing
// ---------------------------------------------------------------------------

enum Slot<V> {
    /// A fetch for this key is running on some thread.
    InFlight,
    Ready { value: Arc<V>, fetched_at: Instant },
}

/// Keyed cache holding (value, fetch timestamp) per entry.
///
/// A lookup returns the cached value while it is younger than the TTL and
/// refetches otherwise. Concurrent lookups of one expired key coalesce into a
/// single fetch: at most one fetch is in flight per key, everyone else waits
/// for its result.
pub struct TtlCache<K, V> {
    ttl: Duration,
    inner: Mutex<HashMap<K, Slot<V>>>,
    cond: Condvar,
}

impl<K: Eq + Hash + Clone, V> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache {
            ttl,
            inner: Mutex::new(HashMap::new()),
            cond: Condvar::new(),
        }
    }

    /// Return the fresh cached value for `key`, or run `fetch` to produce it.
    ///
    /// When the fetch fails, the slot is released so the next caller retries;
    /// waiting callers are woken and one of them takes over the fetch.
    pub fn get_or_fetch<F, E>(&self, key: K, fetch: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let mut guard = self.inner.lock().unwrap();
        loop {
            match guard.get(&key) {
                Some(Slot::Ready { value, fetched_at }) if fetched_at.elapsed() < self.ttl => {
                    return Ok(Arc::clone(value));
                }
                Some(Slot::InFlight) => {
                    guard = self.cond.wait(guard).unwrap();
                }
                // Missing or expired: this caller performs the fetch.
                _ => break,
            }
        }
        guard.insert(key.clone(), Slot::InFlight);
        drop(guard);

        let result = fetch();

        let mut guard = self.inner.lock().unwrap();
        match result {
            Ok(v) => {
                let value = Arc::new(v);
                guard.insert(
                    key,
                    Slot::Ready {
                        value: Arc::clone(&value),
                        fetched_at: Instant::now(),
                    },
                );
                self.cond.notify_all();
                Ok(value)
            }
            Err(e) => {
                guard.remove(&key);
                self.cond.notify_all();
                Err(e)
            }
        }
    }

    /// Fresh cached value without fetching, if any.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        let guard = self.inner.lock().unwrap();
        match guard.get(key) {
            Some(Slot::Ready { value, fetched_at }) if fetched_at.elapsed() < self.ttl => {
                Some(Arc::clone(value))
            }
            _ => None,
        }
    }

    /// Drop the entry so the next lookup refetches.
    pub fn invalidate(&self, key: &K) {
        self.inner.lock().unwrap().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn second_lookup_within_ttl_hits_the_cache() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        let fetches = AtomicUsize::new(0);
        let fetch = || -> Result<u32, ()> {
            fetches.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        };

        assert_eq!(*cache.get_or_fetch("k", fetch).unwrap(), 7);
        assert_eq!(*cache.get_or_fetch("k", || Err(())).unwrap(), 7);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn expired_entry_triggers_a_refetch() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_millis(20));
        cache.get_or_fetch("k", || Ok::<_, ()>(1)).unwrap();
        std::thread::sleep(Duration::from_millis(40));
        let v = cache.get_or_fetch("k", || Ok::<_, ()>(2)).unwrap();
        assert_eq!(*v, 2);
    }

    #[test]
    fn concurrent_lookups_coalesce_into_one_fetch() {
        let cache: Arc<TtlCache<&str, u32>> = Arc::new(TtlCache::new(Duration::from_secs(60)));
        let fetches = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let fetches = Arc::clone(&fetches);
                std::thread::spawn(move || {
                    cache
                        .get_or_fetch("bundle", || {
                            fetches.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(Duration::from_millis(30));
                            Ok::<_, ()>(42)
                        })
                        .unwrap()
                })
            })
            .collect();

        for h in handles {
            assert_eq!(*h.join().unwrap(), 42);
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_fetch_releases_the_slot() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        assert!(cache.get_or_fetch("k", || Err::<u32, &str>("down")).is_err());
        assert_eq!(*cache.get_or_fetch("k", || Ok::<_, &str>(3)).unwrap(), 3);
    }

    #[test]
    fn peek_never_fetches() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        assert!(cache.peek(&"k").is_none());
        cache.get_or_fetch("k", || Ok::<_, ()>(5)).unwrap();
        assert_eq!(*cache.peek(&"k").unwrap(), 5);
        cache.invalidate(&"k");
        assert!(cache.peek(&"k").is_none());
    }
}
