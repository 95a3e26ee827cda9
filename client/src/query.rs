//! Read hook: a cached query bound to a consumer's lifetime

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::{QueryCache, QueryKey, SharedResult};
use crate::error::ClientResult;
use crate::status::Status;

/// Produces the request for a query; called once per network fetch
pub type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, ClientResult<T>> + Send + Sync>;

pub fn fetcher<T, F, Fut>(f: F) -> Fetcher<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ClientResult<T>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

struct Binding<T> {
    key: Option<QueryKey>,
    fetcher: Option<Fetcher<T>>,
    status: Status<T>,
    /// Bumped on every key change; results for older generations are dropped
    generation: u64,
    token: CancellationToken,
}

/// A read hook. Idle while its required parameters are missing.
///
/// Dropping the query, or rebinding it to another key, abandons any
/// request still running for the old key.
pub struct Query<T> {
    cache: QueryCache,
    binding: Mutex<Binding<T>>,
}

impl<T: Send + Sync + 'static> Query<T> {
    pub fn new(cache: QueryCache, key: QueryKey, fetcher: Fetcher<T>) -> Self {
        Self::bind(cache, Some((key, fetcher)))
    }

    /// A query with nothing to fetch yet
    pub fn idle(cache: QueryCache) -> Self {
        Self::bind(cache, None)
    }

    pub fn bind(cache: QueryCache, target: Option<(QueryKey, Fetcher<T>)>) -> Self {
        let (key, fetcher) = target.unzip();
        Self {
            cache,
            binding: Mutex::new(Binding {
                key,
                fetcher,
                status: Status::Idle,
                generation: 0,
                token: CancellationToken::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Binding<T>> {
        self.binding.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn key(&self) -> Option<QueryKey> {
        self.lock().key.clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.lock().key.is_some()
    }

    pub fn status(&self) -> Status<T> {
        self.lock().status.clone()
    }

    /// Latest data for the bound key. While a refetch is pending, or after
    /// it failed, the last successful value is still returned.
    pub fn data(&self) -> Option<Arc<T>> {
        let binding = self.lock();
        if let Some(data) = binding.status.data() {
            return Some(data.clone());
        }
        binding.key.as_ref().and_then(|key| self.cache.peek(key))
    }

    /// Read through the cache. Returns `None` when the query is idle or
    /// the result belongs to a key this query no longer serves.
    pub async fn fetch(&self) -> Option<SharedResult<T>> {
        let (key, fetcher, generation, token) = {
            let mut binding = self.lock();
            let (Some(key), Some(fetcher)) = (binding.key.clone(), binding.fetcher.clone()) else {
                return None;
            };
            binding.status = Status::Pending;
            (key, fetcher, binding.generation, binding.token.clone())
        };

        let result = tokio::select! {
            _ = token.cancelled() => {
                debug!(%key, "query abandoned");
                return None;
            }
            result = self.cache.fetch(&key, move || fetcher()) => result,
        };

        let mut binding = self.lock();
        if binding.generation != generation {
            debug!(%key, "discarding result for a previous key");
            return None;
        }
        binding.status = Status::from(result.clone());
        Some(result)
    }

    /// Point the query at a new key, or disable it with `None`.
    /// Rebinding to the current key keeps the existing state.
    pub fn rebind(&self, target: Option<(QueryKey, Fetcher<T>)>) {
        let mut binding = self.lock();
        let (key, fetcher) = target.unzip();
        if key.is_some() && key == binding.key {
            binding.fetcher = fetcher;
            return;
        }
        binding.token.cancel();
        binding.token = CancellationToken::new();
        binding.generation += 1;
        binding.status = Status::Idle;
        binding.key = key;
        binding.fetcher = fetcher;
    }
}

impl<T> Drop for Query<T> {
    fn drop(&mut self) {
        self.binding
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .cancel();
    }
}
