use dashmap::DashMap;
use std::borrow::Borrow;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct Entry<V> {
    value: V,
    inserted: Instant,
}

/// Thread-safe map whose entries expire `ttl` after insertion.
///
/// A `None` TTL keeps entries until they are evicted for space. With a
/// capacity set, an insert into a full cache first purges stale entries and
/// then drops the oldest ones. Clones share storage.
///
/// ```
/// use brief_web::TtlCache;
/// use std::time::Duration;
///
/// let cache: TtlCache<String, u32> = TtlCache::new(Some(Duration::from_secs(60)));
/// cache.insert("answer".to_string(), 42);
/// assert_eq!(cache.get("answer"), Some(42));
/// assert_eq!(cache.get("missing"), None);
/// ```
#[derive(Clone)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    entries: Arc<DashMap<K, Entry<V>>>,
    ttl: Option<Duration>,
    capacity: Option<usize>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
            capacity: None,
        }
    }

    /// Bound the cache to `max` entries (at least one).
    pub fn with_capacity(mut self, max: usize) -> Self {
        self.capacity = Some(max.max(1));
        self
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    fn expired(&self, entry: &Entry<V>, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => now.saturating_duration_since(entry.inserted) >= ttl,
            None => false,
        }
    }

    /// Fresh value for `key`; a stale entry is evicted and reported missing.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if !self.expired(&entry, now) {
                return Some(entry.value.clone());
            }
        }
        self.entries.remove_if(key, |_, e| self.expired(e, now));
        None
    }

    pub fn insert(&self, key: K, value: V) {
        self.make_room(&key);
        self.entries.insert(
            key,
            Entry {
                value,
                inserted: Instant::now(),
            },
        );
    }

    pub fn invalidate<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key);
    }

    /// Number of stored entries, stale ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn make_room(&self, key: &K) {
        let Some(cap) = self.capacity else {
            return;
        };
        if self.entries.len() < cap || self.entries.contains_key(key) {
            return;
        }
        self.purge_expired();
        while self.entries.len() >= cap {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|e| e.value().inserted)
                .map(|e| e.key().clone());
            match oldest {
                Some(k) => {
                    self.entries.remove(&k);
                    tracing::trace!(target: "cache", "cache.evicted");
                }
                None => break,
            }
        }
    }

    /// Drop every stale entry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, e| !self.expired(e, now));
        before.saturating_sub(self.entries.len())
    }

    /// Return the cached value or compute, store, and return it.
    ///
    /// Errors are returned as-is and nothing is cached. Concurrent misses for
    /// the same key may both compute; the last writer wins.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(v) = self.get(&key) {
            tracing::trace!(target: "cache", "cache.hit");
            return Ok(v);
        }
        tracing::trace!(target: "cache", "cache.miss");
        let value = f().await?;
        self.insert(key, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn zero_ttl_expires_immediately_and_evicts() {
        let cache: TtlCache<&str, u8> = TtlCache::new(Some(Duration::ZERO));
        cache.insert("k", 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn no_ttl_never_expires() {
        let cache: TtlCache<String, u8> = TtlCache::new(None);
        cache.insert("k".into(), 1);
        assert_eq!(cache.purge_expired(), 0);
        assert_eq!(cache.get("k"), Some(1));
    }

    #[test]
    fn purge_counts_removed_entries() {
        let cache: TtlCache<u32, u32> = TtlCache::new(Some(Duration::ZERO));
        for i in 0..3 {
            cache.insert(i, i);
        }
        assert_eq!(cache.purge_expired(), 3);
        assert!(cache.is_empty());
    }

    #[test]
    fn full_cache_purges_stale_entries_first() {
        let cache: TtlCache<u32, u32> = TtlCache::new(Some(Duration::ZERO)).with_capacity(2);
        cache.insert(1, 1);
        cache.insert(2, 2);
        cache.insert(3, 3);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn full_cache_evicts_oldest() {
        let cache: TtlCache<u32, u32> = TtlCache::new(None).with_capacity(2);
        cache.insert(1, 1);
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(2, 2);
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(3, 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&3), Some(3));

        // Overwriting a present key never evicts.
        cache.insert(3, 30);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&2), Some(2));
    }

    #[test]
    fn invalidate_removes_entry() {
        let cache: TtlCache<String, u8> = TtlCache::new(None);
        cache.insert("k".into(), 1);
        cache.invalidate("k");
        assert_eq!(cache.get("k"), None);
    }

    #[tokio::test]
    async fn get_or_try_insert_computes_once() {
        let cache: TtlCache<String, usize> = TtlCache::new(Some(Duration::from_secs(60)));
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let v = cache
                .get_or_try_insert_with("k".to_string(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(7)
                })
                .await
                .unwrap();
            assert_eq!(v, 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache: TtlCache<String, usize> = TtlCache::new(None);
        let err = cache
            .get_or_try_insert_with("k".to_string(), || async { Err::<usize, _>("boom") })
            .await
            .unwrap_err();
        assert_eq!(err, "boom");
        assert!(cache.get("k").is_none());
    }
}
