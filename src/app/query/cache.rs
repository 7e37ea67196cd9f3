//! Keyed, deduplicating query cache
//!
//! Each key owns one entry holding its latest state, a `watch` channel that
//! broadcasts state changes to subscribers, and the loader used to (re)fetch it.
//! Loads run as spawned tasks; the entry map lock is only held while state is
//! read or written, never while a loader runs.
//!
//! Every load is stamped with a generation number taken from a cache-wide
//! counter. When a load finishes, its result is applied only if its generation
//! is still the entry's latest; otherwise a newer load has superseded it and
//! the response is dropped.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

use crate::errors::{QueryError, QueryResult};

use super::config::QueryConfig;
use super::key::CacheKey;
use super::state::{QueryState, QueryStatus};
use super::stats::{QueryCounters, QueryStats};

type Loader<V> = Arc<dyn Fn() -> BoxFuture<'static, QueryResult<V>> + Send + Sync>;

/// How a refetch interacts with a load already in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefetchMode {
    /// Attach to the in-flight load instead of starting another
    #[default]
    Dedupe,
    /// Start a new load; the in-flight one's response will be discarded
    Replace,
}

/// Subscriber bookkeeping shared between an entry and its subscriptions
#[derive(Debug)]
struct EntryActivity {
    subscribers: AtomicUsize,
    last_active: Mutex<Instant>,
}

impl EntryActivity {
    fn new() -> Self {
        Self {
            subscribers: AtomicUsize::new(0),
            last_active: Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        if let Ok(mut last_active) = self.last_active.lock() {
            *last_active = Instant::now();
        }
    }

    fn idle_for(&self) -> Duration {
        self.last_active
            .lock()
            .map(|last_active| last_active.elapsed())
            .unwrap_or_default()
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::SeqCst)
    }
}

/// Decrements the subscriber count when a subscription is dropped
#[derive(Debug)]
struct SubscriberGuard(Arc<EntryActivity>);

impl SubscriberGuard {
    fn attach(activity: &Arc<EntryActivity>) -> Self {
        activity.subscribers.fetch_add(1, Ordering::SeqCst);
        activity.touch();
        Self(Arc::clone(activity))
    }
}

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        self.0.subscribers.fetch_sub(1, Ordering::SeqCst);
        self.0.touch();
    }
}

struct CacheEntry<V> {
    state: watch::Sender<QueryState<V>>,
    loader: Loader<V>,
    /// Generation of the most recently issued load
    generation: u64,
    /// Whether the load with `generation` is still running
    in_flight: bool,
    last_fetched: Option<Instant>,
    activity: Arc<EntryActivity>,
}

impl<V> CacheEntry<V> {
    fn new(loader: Loader<V>) -> Self {
        let (state, _) = watch::channel(QueryState::idle());
        Self {
            state,
            loader,
            generation: 0,
            in_flight: false,
            last_fetched: None,
            activity: Arc::new(EntryActivity::new()),
        }
    }

    fn status(&self) -> QueryStatus {
        self.state.borrow().status
    }

    /// Whether a new subscriber should trigger a load
    fn needs_load(&self, stale_time: Duration) -> bool {
        if self.in_flight {
            return false;
        }
        match self.status() {
            QueryStatus::Idle | QueryStatus::Failed => true,
            QueryStatus::Resolved => self
                .last_fetched
                .map_or(true, |fetched| fetched.elapsed() >= stale_time),
            QueryStatus::Pending => false,
        }
    }
}

struct CacheInner<K, V> {
    config: QueryConfig,
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    next_generation: AtomicU64,
    counters: QueryCounters,
}

impl<K: CacheKey, V: Send + Sync + 'static> CacheInner<K, V> {
    /// Apply a finished load, unless a newer load for the key was issued since
    async fn complete(&self, key: &K, generation: u64, outcome: QueryResult<V>) {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(key) else {
            debug!("Dropping response for evicted query {}", key);
            return;
        };

        if generation != entry.generation {
            self.counters.record_discard();
            debug!(
                "Discarding stale response for {} (generation {}, latest {})",
                key, generation, entry.generation
            );
            return;
        }

        entry.in_flight = false;
        match outcome {
            Ok(value) => {
                entry.last_fetched = Some(Instant::now());
                entry.state.send_modify(|state| state.resolve(value));
                debug!("Query {} resolved", key);
            }
            Err(e) => {
                warn!("Query {} failed: {}", key, e);
                entry.state.send_modify(|state| state.fail(e.to_string()));
            }
        }
    }
}

/// Process-scoped query cache, cheap to clone and share
pub struct QueryCache<K, V> {
    inner: Arc<CacheInner<K, V>>,
}

impl<K, V> Clone for QueryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> fmt::Debug for QueryCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl<K: CacheKey, V: Send + Sync + 'static> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self::new(QueryConfig::default())
    }
}

impl<K: CacheKey, V: Send + Sync + 'static> QueryCache<K, V> {
    /// Create an empty cache
    pub fn new(config: QueryConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                config,
                entries: RwLock::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
                counters: QueryCounters::default(),
            }),
        }
    }

    /// Get the cache configuration
    pub fn config(&self) -> &QueryConfig {
        &self.inner.config
    }

    /// Subscribe to a key, loading it if needed
    ///
    /// The first subscriber of a key starts a load. Later subscribers attach to
    /// the in-flight load or the cached value; a resolved value older than the
    /// stale time, or a failed entry, is reloaded in the background. Disabled
    /// keys return an idle subscription and never call `loader`.
    pub async fn get<F, Fut>(&self, key: K, loader: F) -> QuerySubscription<K, V>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = QueryResult<V>> + Send + 'static,
    {
        if !key.is_enabled() {
            debug!("Query {} is disabled", key);
            return QuerySubscription::disabled(key);
        }

        self.collect_garbage().await;

        let loader: Loader<V> = Arc::new(move || loader().boxed());
        let mut entries = self.inner.entries.write().await;
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::new(Arc::clone(&loader)));
        entry.loader = loader;

        let receiver = entry.state.subscribe();
        let guard = SubscriberGuard::attach(&entry.activity);

        if entry.needs_load(self.inner.config.stale_time) {
            self.start_load(&key, entry);
        } else if entry.in_flight {
            debug!("Attaching to in-flight load for {}", key);
        }

        QuerySubscription {
            key,
            receiver,
            cache: Some(self.clone()),
            _guard: Some(guard),
        }
    }

    /// Force a new load cycle for a cached key
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Disabled` for disabled keys and
    /// `QueryError::NotFound` if the key has never been requested.
    pub async fn refetch(&self, key: &K, mode: RefetchMode) -> QueryResult<()> {
        if !key.is_enabled() {
            return Err(QueryError::Disabled {
                key: key.to_string(),
            });
        }

        let mut entries = self.inner.entries.write().await;
        let entry = entries.get_mut(key).ok_or_else(|| QueryError::NotFound {
            key: key.to_string(),
        })?;
        entry.activity.touch();

        if entry.in_flight && mode == RefetchMode::Dedupe {
            debug!("Refetch of {} joins the load already in flight", key);
            return Ok(());
        }

        self.start_load(key, entry);
        Ok(())
    }

    /// Current state of a key without subscribing
    pub async fn peek(&self, key: &K) -> Option<QueryState<V>> {
        let entries = self.inner.entries.read().await;
        entries.get(key).map(|entry| entry.state.borrow().clone())
    }

    /// Drop an entry that no subscriber is attached to. A load still in
    /// flight for it is discarded on arrival.
    ///
    /// Subscribed entries are kept, since their subscribers would otherwise
    /// stop receiving updates; use [`refetch`](Self::refetch) to reload them.
    /// Returns whether the entry was removed.
    pub async fn invalidate(&self, key: &K) -> bool {
        let mut entries = self.inner.entries.write().await;
        let subscribers = match entries.get(key) {
            Some(entry) => entry.activity.subscriber_count(),
            None => return false,
        };
        if subscribers > 0 {
            debug!(
                "Not invalidating {}: {} subscriber(s) attached",
                key, subscribers
            );
            return false;
        }

        entries.remove(key);
        debug!("Invalidated query {}", key);
        true
    }

    /// Evict entries with no subscribers, no load in flight, and no activity
    /// for longer than the gc time. Returns the number evicted.
    pub async fn collect_garbage(&self) -> usize {
        let gc_time = self.inner.config.gc_time;
        let mut entries = self.inner.entries.write().await;
        let before = entries.len();

        entries.retain(|key, entry| {
            let keep = entry.in_flight
                || entry.activity.subscriber_count() > 0
                || entry.activity.idle_for() < gc_time;
            if !keep {
                debug!("Evicting idle query {}", key);
            }
            keep
        });

        let evicted = before - entries.len();
        if evicted > 0 {
            self.inner.counters.record_evictions(evicted as u64);
        }
        evicted
    }

    /// Number of subscribers currently attached to a key
    pub async fn subscriber_count(&self, key: &K) -> usize {
        let entries = self.inner.entries.read().await;
        entries
            .get(key)
            .map_or(0, |entry| entry.activity.subscriber_count())
    }

    /// Snapshot of entry counts and load counters
    pub async fn stats(&self) -> QueryStats {
        let entries = self.inner.entries.read().await;
        let mut stats = QueryStats {
            entries: entries.len(),
            ..Default::default()
        };
        for entry in entries.values() {
            match entry.status() {
                QueryStatus::Pending => stats.pending += 1,
                QueryStatus::Resolved => stats.resolved += 1,
                QueryStatus::Failed => stats.failed += 1,
                QueryStatus::Idle => {}
            }
        }
        self.inner.counters.fill(&mut stats);
        stats
    }

    /// Spawn a load for `entry`, superseding any load already in flight
    fn start_load(&self, key: &K, entry: &mut CacheEntry<V>) {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        entry.generation = generation;
        entry.in_flight = true;
        entry.state.send_modify(QueryState::begin_load);
        self.inner.counters.record_load();

        let load = (entry.loader)();
        let inner = Arc::clone(&self.inner);
        let key = key.clone();
        let timeout = inner.config.load_timeout;
        debug!("Loading {} (generation {})", key, generation);

        tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, load).await {
                Ok(result) => result,
                Err(_) => Err(QueryError::Timeout { timeout }),
            };
            inner.complete(&key, generation, outcome).await;
        });
    }
}

/// A subscriber's view of one key
///
/// Reads never block. `settled()` waits for the in-flight load, if any.
#[derive(Debug)]
pub struct QuerySubscription<K, V> {
    key: K,
    receiver: watch::Receiver<QueryState<V>>,
    cache: Option<QueryCache<K, V>>,
    _guard: Option<SubscriberGuard>,
}

impl<K: CacheKey, V: Send + Sync + 'static> QuerySubscription<K, V> {
    fn disabled(key: K) -> Self {
        let (_sender, receiver) = watch::channel(QueryState::idle());
        Self {
            key,
            receiver,
            cache: None,
            _guard: None,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    /// Whether the key had all its parameters when subscribed
    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Latest broadcast state
    pub fn state(&self) -> QueryState<V> {
        self.receiver.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.receiver.borrow().is_loading()
    }

    pub fn is_error(&self) -> bool {
        self.receiver.borrow().is_error()
    }

    pub fn data(&self) -> Option<Arc<V>> {
        self.receiver.borrow().data()
    }

    /// Wait until no load is in flight and return that state
    pub async fn settled(&mut self) -> QueryState<V> {
        loop {
            {
                let state = self.receiver.borrow_and_update();
                if state.is_settled() {
                    return state.clone();
                }
            }
            if self.receiver.changed().await.is_err() {
                return self.state();
            }
        }
    }

    /// Wait for the next state change. Returns false once the entry is gone.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    /// Refetch this subscription's key
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Disabled` for a disabled subscription
    pub async fn refetch(&self, mode: RefetchMode) -> QueryResult<()> {
        match &self.cache {
            Some(cache) => cache.refetch(&self.key, mode).await,
            None => Err(QueryError::Disabled {
                key: self.key.to_string(),
            }),
        }
    }
}
