//! Read and write hooks over one shared cache
//!
//! Every read hook comes in two forms: `x(..)` builds a [`Query`] bound to
//! its key, `x_target(..)` returns the key and fetcher so an existing query
//! can be pointed at new parameters with [`Query::rebind`]. Passing `None`
//! for a required parameter yields an idle query.

mod analytics;
mod keys;
mod restaurants;
mod sales;
mod wines;

pub use keys::*;

use std::future::Future;

use tokio::sync::broadcast;

use crate::api::ApiClient;
use crate::cache::{QueryCache, QueryKey};
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::mutation::{Mutation, MutationKind, MutationOutput};
use crate::notify::{Notification, Notifier};
use crate::query::{Fetcher, Query};

/// What a read hook should fetch, or `None` while it must stay idle
pub type Target<T> = Option<(QueryKey, Fetcher<T>)>;

/// Entry point bundling the API client, the query cache and notifications
#[derive(Debug, Clone)]
pub struct SommelierClient {
    api: ApiClient,
    cache: QueryCache,
    notifier: Notifier,
}

impl SommelierClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self::from_parts(
            ApiClient::new(config)?,
            QueryCache::new(),
            Notifier::new(config.notifications.capacity),
        ))
    }

    pub fn from_parts(api: ApiClient, cache: QueryCache, notifier: Notifier) -> Self {
        Self {
            api,
            cache,
            notifier,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Receive every notification emitted by write hooks from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    fn query<T: Send + Sync + 'static>(&self, target: Target<T>) -> Query<T> {
        Query::bind(self.cache.clone(), target)
    }

    fn mutation<I, O, F, Fut>(&self, kind: MutationKind, run: F) -> Mutation<I, O>
    where
        I: Send + 'static,
        O: MutationOutput,
        F: Fn(ApiClient, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<O>> + Send + 'static,
    {
        Mutation::new(
            kind,
            self.api.clone(),
            self.cache.clone(),
            self.notifier.clone(),
            run,
        )
    }
}
