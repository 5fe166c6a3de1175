use std::{
    collections::HashMap,
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;
use tracing::debug;

use crate::api::ConfessionRoom;

/// Room lookups by code. `None` is a cached "room does not exist".
pub type RoomCache = QueryCache<Option<ConfessionRoom>>;

struct Slot<V> {
    value: Option<V>,
    fetched_at: Instant,
    last_used: Instant,
    stale: bool,
    /// Bumped on every invalidation.
    generation: u64,
}

impl<V> Slot<V> {
    fn empty(now: Instant) -> Self {
        Slot {
            value: None,
            fetched_at: now,
            last_used: now,
            stale: true,
            generation: 0,
        }
    }
}

/// Keyed query cache with explicit invalidation.
///
/// A value is served while it is younger than the stale time and has not been
/// invalidated, otherwise it is fetched again. A fetch that was already running
/// when its key got invalidated still returns its result to the caller but does
/// not store it. Concurrent fetches of one key are not deduplicated.
#[derive(Clone)]
pub struct QueryCache<V> {
    slots: Arc<RwLock<HashMap<String, Slot<V>>>>,
    stale_time: Duration,
    gc_time: Duration,
}

impl<V: Clone> QueryCache<V> {
    pub fn new(stale_time: Duration, gc_time: Duration) -> Self {
        Self {
            slots: Arc::new(RwLock::new(HashMap::new())),
            stale_time,
            gc_time,
        }
    }

    /// The cached value, if it is still fresh.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut slots = self.slots.write().await;
        let slot = slots.get_mut(key)?;
        if slot.stale || slot.fetched_at.elapsed() >= self.stale_time {
            return None;
        }
        slot.last_used = Instant::now();
        slot.value.clone()
    }

    pub async fn fetch_with<F, Fut, E>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            debug!("cache hit for {key}");
            return Ok(value);
        }

        let generation = self.generation(key).await;
        debug!("fetching {key}");
        let value = fetch().await?;
        self.store(key, value.clone(), generation).await;
        Ok(value)
    }

    /// Marks `key` stale so the next read refetches it.
    pub async fn invalidate(&self, key: &str) {
        let mut slots = self.slots.write().await;
        let slot = slots
            .entry(key.to_owned())
            .or_insert_with(|| Slot::empty(Instant::now()));
        slot.stale = true;
        slot.generation += 1;
        debug!("invalidated {key}");
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    async fn generation(&self, key: &str) -> u64 {
        self.slots
            .read()
            .await
            .get(key)
            .map(|slot| slot.generation)
            .unwrap_or(0)
    }

    async fn store(&self, key: &str, value: V, generation: u64) {
        let now = Instant::now();
        let mut slots = self.slots.write().await;

        let slot = slots.entry(key.to_owned()).or_insert_with(|| Slot::empty(now));
        if slot.generation != generation {
            debug!("dropping fetch of {key} that raced an invalidation");
        } else {
            slot.value = Some(value);
            slot.fetched_at = now;
            slot.last_used = now;
            slot.stale = false;
        }

        let gc_time = self.gc_time;
        slots.retain(|key, slot| {
            let keep = now.duration_since(slot.last_used) < gc_time;
            if !keep {
                debug!("evicting {key}");
            }
            keep
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn cache() -> QueryCache<Option<String>> {
        QueryCache::new(Duration::from_secs(60), Duration::from_secs(300))
    }

    async fn ok(value: Option<&str>) -> Result<Option<String>, ()> {
        Ok(value.map(str::to_owned))
    }

    #[tokio::test]
    async fn serves_fresh_values_without_refetching() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .fetch_with("ab12cd", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    ok(Some("Friends"))
                })
                .await
                .unwrap();
            assert_eq!(value.as_deref(), Some("Friends"));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn caches_missing_rooms() {
        let cache = cache();
        cache.fetch_with("nope", || ok(None)).await.unwrap();
        assert_eq!(cache.get("nope").await, Some(None));
    }

    #[tokio::test]
    async fn invalidation_forces_a_refetch() {
        let cache = cache();
        cache.fetch_with("ab12cd", || ok(Some("old"))).await.unwrap();

        cache.invalidate("ab12cd").await;
        assert_eq!(cache.get("ab12cd").await, None);

        let value = cache.fetch_with("ab12cd", || ok(Some("new"))).await.unwrap();
        assert_eq!(value.as_deref(), Some("new"));
        assert_eq!(cache.get("ab12cd").await, Some(Some("new".to_owned())));
    }

    #[tokio::test]
    async fn invalidation_only_touches_its_key() {
        let cache = cache();
        cache.fetch_with("a", || ok(Some("a"))).await.unwrap();
        cache.fetch_with("b", || ok(Some("b"))).await.unwrap();

        cache.invalidate("a").await;
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("b").await, Some(Some("b".to_owned())));
    }

    #[tokio::test]
    async fn fetch_racing_an_invalidation_is_not_stored() {
        let cache = cache();
        let racing = cache.clone();

        let value = cache
            .fetch_with("ab12cd", || async move {
                racing.invalidate("ab12cd").await;
                Ok::<_, ()>(Some("before mutation".to_owned()))
            })
            .await
            .unwrap();

        assert_eq!(value.as_deref(), Some("before mutation"));
        assert_eq!(cache.get("ab12cd").await, None);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = cache();
        let err = cache
            .fetch_with("ab12cd", || async { Err::<Option<String>, _>("boom") })
            .await;
        assert_eq!(err, Err("boom"));
        assert_eq!(cache.get("ab12cd").await, None);
    }

    #[tokio::test]
    async fn zero_stale_time_always_refetches() {
        let cache = QueryCache::new(Duration::ZERO, Duration::from_secs(300));
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            cache
                .fetch_with("ab12cd", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    ok(Some("x"))
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unused_entries_are_evicted() {
        let cache = QueryCache::new(Duration::from_secs(60), Duration::ZERO);
        cache.fetch_with("a", || ok(Some("a"))).await.unwrap();
        cache.fetch_with("b", || ok(Some("b"))).await.unwrap();
        assert_eq!(cache.len().await, 0);
    }
}
