//! Process-wide query cache
//!
//! Entries are keyed by [`QueryKey`] and stay valid until a write
//! invalidates them; there is no time-based expiry. Concurrent reads of a
//! key share one in-flight request.

mod key;

pub use key::{QueryFamily, QueryKey};

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

type CachedValue = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<CachedValue, Arc<ClientError>>>>;

/// Outcome shared by every consumer of a read
pub type SharedResult<T> = Result<Arc<T>, Arc<ClientError>>;

struct InFlight {
    id: u64,
    future: SharedFetch,
    /// Consumers currently awaiting `future`
    waiters: usize,
}

#[derive(Default)]
struct Entry {
    value: Option<CachedValue>,
    stale: bool,
    /// Bumped by every invalidation
    epoch: u64,
    /// Epoch at which the stored value's request started
    value_epoch: u64,
    in_flight: Option<InFlight>,
}

#[derive(Default)]
struct CacheInner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    next_fetch: AtomicU64,
}

impl CacheInner {
    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the outcome of request `id`, started at `start_epoch`
    fn settle(&self, key: &QueryKey, id: u64, start_epoch: u64, result: &Result<CachedValue, Arc<ClientError>>) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if entry.in_flight.as_ref().is_some_and(|f| f.id == id) {
            entry.in_flight = None;
        }
        match result {
            Ok(value) if entry.value.is_none() || start_epoch >= entry.value_epoch => {
                entry.value = Some(value.clone());
                entry.value_epoch = start_epoch;
                entry.stale = start_epoch != entry.epoch;
                if entry.stale {
                    debug!(%key, "stored result of a request that started before invalidation");
                }
            }
            Ok(_) => debug!(%key, "discarded result older than the cached value"),
            Err(e) => warn!(%key, error = %e, "query failed, cached value kept"),
        }
    }
}

/// One consumer's interest in request `id`. When the last consumer is
/// dropped before the request settles, the request is dropped with it.
struct Waiter {
    cache: Weak<CacheInner>,
    key: QueryKey,
    id: u64,
}

impl Drop for Waiter {
    fn drop(&mut self) {
        let Some(cache) = self.cache.upgrade() else {
            return;
        };
        let mut entries = cache.lock();
        let Some(entry) = entries.get_mut(&self.key) else {
            return;
        };
        let abandoned = match entry.in_flight.as_mut() {
            Some(flight) if flight.id == self.id => {
                flight.waiters = flight.waiters.saturating_sub(1);
                flight.waiters == 0
            }
            _ => false,
        };
        if abandoned {
            debug!(key = %self.key, "all consumers gone, request dropped");
            entry.in_flight = None;
        }
    }
}

/// Cheap-to-clone handle to the shared cache
#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache").field("entries", &self.len()).finish()
    }
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, value: CachedValue) -> SharedResult<T> {
    value
        .downcast::<T>()
        .map_err(|_| Arc::new(ClientError::CacheTypeMismatch(key.to_string())))
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key` unless it is missing or stale.
    /// Otherwise run `fetcher`, or join the request already running for
    /// the same key, and cache its successful result.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> SharedResult<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let (request, id) = {
            let mut entries = self.inner.lock();
            let entry = entries.entry(key.clone()).or_default();

            if let (Some(value), false) = (&entry.value, entry.stale) {
                debug!(%key, "cache hit");
                return downcast(key, value.clone());
            }

            match entry.in_flight.as_mut() {
                Some(flight) => {
                    debug!(%key, "joining in-flight request");
                    flight.waiters += 1;
                    (flight.future.clone(), flight.id)
                }
                None => {
                    debug!(%key, stale = entry.value.is_some(), "cache miss");
                    let id = self.inner.next_fetch.fetch_add(1, Ordering::Relaxed);
                    let start_epoch = entry.epoch;
                    let cache = Arc::downgrade(&self.inner);
                    let owned_key = key.clone();

                    let future = async move {
                        let result = fetcher()
                            .await
                            .map(|value| Arc::new(value) as CachedValue)
                            .map_err(Arc::new);
                        if let Some(cache) = cache.upgrade() {
                            cache.settle(&owned_key, id, start_epoch, &result);
                        }
                        result
                    }
                    .boxed()
                    .shared();

                    entry.in_flight = Some(InFlight {
                        id,
                        future: future.clone(),
                        waiters: 1,
                    });
                    (future, id)
                }
            }
        };

        let _waiter = Waiter {
            cache: Arc::downgrade(&self.inner),
            key: key.clone(),
            id,
        };
        downcast(key, request.await?)
    }

    /// Mark every entry under `prefix` stale. Requests already running
    /// for those entries are detached, so the next read starts a new one.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.inner.lock();
        let mut count = 0;
        for (_, entry) in entries.iter_mut().filter(|(key, _)| key.matches(prefix)) {
            entry.stale = true;
            entry.epoch += 1;
            entry.in_flight = None;
            count += 1;
        }
        debug!(%prefix, count, "invalidated");
        count
    }

    pub fn invalidate_all(&self, prefixes: &[QueryKey]) -> usize {
        prefixes.iter().map(|prefix| self.invalidate(prefix)).sum()
    }

    /// Last successful value, fresh or stale
    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let value = self.inner.lock().get(key)?.value.clone()?;
        value.downcast::<T>().ok()
    }

    /// `None` when nothing has been cached for `key`
    pub fn is_stale(&self, key: &QueryKey) -> Option<bool> {
        let entries = self.inner.lock();
        let entry = entries.get(key)?;
        entry.value.as_ref().map(|_| entry.stale)
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.inner
            .lock()
            .get(key)
            .is_some_and(|entry| entry.in_flight.is_some())
    }

    /// Seed a fresh value, e.g. one returned by a write
    pub fn insert<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) {
        let mut entries = self.inner.lock();
        let entry = entries.entry(key).or_default();
        entry.value = Some(Arc::new(value));
        entry.value_epoch = entry.epoch;
        entry.stale = false;
    }

    /// Number of entries holding a value
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .values()
            .filter(|entry| entry.value.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}
