//! Write hooks and the cache invalidation table

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt};
use shared::{Restaurant, Sale, SaleUploadResult, Wine, WineUploadResult};
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::cache::{QueryCache, QueryFamily, QueryKey};
use crate::error::{ClientError, ClientResult};
use crate::notify::{Notification, Notifier};
use crate::status::Status;

const SALE_WRITE: &[QueryFamily] = &[
    QueryFamily::Sales,
    QueryFamily::Wines,
    QueryFamily::Dashboard,
    QueryFamily::SalesTrends,
    QueryFamily::TopBottomWines,
];

const WINE_WRITE: &[QueryFamily] = &[QueryFamily::Wines, QueryFamily::Dashboard];

const RESTAURANT_WRITE: &[QueryFamily] = &[QueryFamily::Restaurants];

/// Every write the client can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    CreateWine,
    UpdateWine,
    DeleteWine,
    BulkUploadWines,
    CreateSale,
    DeleteSale,
    BulkUploadSales,
    CreateRestaurant,
}

impl MutationKind {
    pub const ALL: [MutationKind; 8] = [
        MutationKind::CreateWine,
        MutationKind::UpdateWine,
        MutationKind::DeleteWine,
        MutationKind::BulkUploadWines,
        MutationKind::CreateSale,
        MutationKind::DeleteSale,
        MutationKind::BulkUploadSales,
        MutationKind::CreateRestaurant,
    ];

    /// Query families whose cached reads a successful write makes stale
    pub fn invalidated_families(&self) -> &'static [QueryFamily] {
        match self {
            MutationKind::CreateWine
            | MutationKind::UpdateWine
            | MutationKind::DeleteWine
            | MutationKind::BulkUploadWines => WINE_WRITE,
            MutationKind::CreateSale | MutationKind::DeleteSale | MutationKind::BulkUploadSales => {
                SALE_WRITE
            }
            MutationKind::CreateRestaurant => RESTAURANT_WRITE,
        }
    }

    /// Key prefixes to invalidate. `subject` is the id of the entity the
    /// write targeted, if any.
    pub fn invalidations(&self, subject: Option<Uuid>) -> Vec<QueryKey> {
        let mut keys: Vec<QueryKey> = self
            .invalidated_families()
            .iter()
            .copied()
            .map(QueryKey::from)
            .collect();
        if let (MutationKind::UpdateWine, Some(wine_id)) = (self, subject) {
            keys.push(QueryKey::new(QueryFamily::Wine).with(wine_id));
        }
        keys
    }

    /// Fixed success text; uploads report their counts instead
    pub fn success_message(&self) -> Option<&'static str> {
        match self {
            MutationKind::CreateWine => Some("Wine created successfully"),
            MutationKind::UpdateWine => Some("Wine updated successfully"),
            MutationKind::DeleteWine => Some("Wine deleted successfully"),
            MutationKind::CreateSale => Some("Sale recorded successfully"),
            MutationKind::DeleteSale => Some("Sale deleted successfully"),
            MutationKind::CreateRestaurant => Some("Restaurant created successfully"),
            MutationKind::BulkUploadWines | MutationKind::BulkUploadSales => None,
        }
    }

    /// Shown when the server gave no reason for a failure
    pub fn failure_message(&self) -> &'static str {
        match self {
            MutationKind::CreateWine => "Failed to create wine",
            MutationKind::UpdateWine => "Failed to update wine",
            MutationKind::DeleteWine => "Failed to delete wine",
            MutationKind::BulkUploadWines => "Failed to upload wines",
            MutationKind::CreateSale => "Failed to record sale",
            MutationKind::DeleteSale => "Failed to delete sale",
            MutationKind::BulkUploadSales => "Failed to upload sales",
            MutationKind::CreateRestaurant => "Failed to create restaurant",
        }
    }
}

/// Result of a write, and what to tell the user about it
pub trait MutationOutput: Send + Sync + 'static {
    fn notifications(&self, kind: MutationKind) -> Vec<Notification> {
        kind.success_message()
            .map(Notification::success)
            .into_iter()
            .collect()
    }
}

impl MutationOutput for () {}
impl MutationOutput for Wine {}
impl MutationOutput for Sale {}
impl MutationOutput for Restaurant {}

fn upload_notifications(created: u32, noun: &str, rejected: usize) -> Vec<Notification> {
    let mut notes = vec![Notification::success(format!(
        "Successfully uploaded {created} {noun}"
    ))];
    if rejected > 0 {
        notes.push(Notification::warning(format!("{rejected} rows had errors")));
    }
    notes
}

impl MutationOutput for WineUploadResult {
    fn notifications(&self, _kind: MutationKind) -> Vec<Notification> {
        upload_notifications(self.wines_created, "wines", self.rejected_rows())
    }
}

impl MutationOutput for SaleUploadResult {
    fn notifications(&self, _kind: MutationKind) -> Vec<Notification> {
        upload_notifications(self.sales_created, "sales", self.rejected_rows())
    }
}

type Runner<I, O> = Arc<dyn Fn(ApiClient, I) -> BoxFuture<'static, ClientResult<O>> + Send + Sync>;

struct MutationState<O> {
    status: Status<O>,
    generation: u64,
}

/// A write hook.
///
/// Each call to [`Mutation::mutate`] sends exactly one request. On success
/// the affected cache entries are invalidated before any notification goes
/// out; on failure the cache is left as it was.
pub struct Mutation<I, O> {
    kind: MutationKind,
    api: ApiClient,
    cache: QueryCache,
    notifier: Notifier,
    run: Runner<I, O>,
    subject: fn(&I) -> Option<Uuid>,
    state: Mutex<MutationState<O>>,
}

fn no_subject<I>(_: &I) -> Option<Uuid> {
    None
}

impl<I: Send + 'static, O: MutationOutput> Mutation<I, O> {
    pub fn new<F, Fut>(
        kind: MutationKind,
        api: ApiClient,
        cache: QueryCache,
        notifier: Notifier,
        run: F,
    ) -> Self
    where
        F: Fn(ApiClient, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<O>> + Send + 'static,
    {
        Self {
            kind,
            api,
            cache,
            notifier,
            run: Arc::new(move |api, input| run(api, input).boxed()),
            subject: no_subject::<I>,
            state: Mutex::new(MutationState {
                status: Status::Idle,
                generation: 0,
            }),
        }
    }

    /// Name the entity a write targets, for entry-level invalidation
    pub fn with_subject(mut self, subject: fn(&I) -> Option<Uuid>) -> Self {
        self.subject = subject;
        self
    }

    fn lock(&self) -> MutexGuard<'_, MutationState<O>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    pub fn status(&self) -> Status<O> {
        self.lock().status.clone()
    }

    /// Back to `Idle`, e.g. when the form is closed
    pub fn reset(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.status = Status::Idle;
    }

    pub async fn mutate(&self, input: I) -> Result<Arc<O>, Arc<ClientError>> {
        let targets = self.kind.invalidations((self.subject)(&input));
        let generation = {
            let mut state = self.lock();
            state.generation += 1;
            state.status = Status::Pending;
            state.generation
        };
        debug!(kind = ?self.kind, "mutation started");

        let result = (self.run)(self.api.clone(), input)
            .await
            .map(Arc::new)
            .map_err(Arc::new);

        match &result {
            Ok(output) => {
                let stale = self.cache.invalidate_all(&targets);
                info!(kind = ?self.kind, stale, "mutation succeeded");
                for notification in output.notifications(self.kind) {
                    self.notifier.notify(notification);
                }
            }
            // Field errors belong to the form, not a toast
            Err(error) if error.is_validation() => {
                debug!(kind = ?self.kind, %error, "mutation rejected locally");
            }
            Err(error) => {
                let message = error
                    .server_message()
                    .unwrap_or_else(|| self.kind.failure_message());
                self.notifier.notify(Notification::error(message));
            }
        }

        let mut state = self.lock();
        if state.generation == generation {
            state.status = Status::from(result.clone());
        }
        result
    }
}
