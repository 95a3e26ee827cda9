//! Sommelier analytics client
//!
//! Typed access to the Sommelier REST API, plus the data-access layer the
//! dashboard is built on:
//!
//! - [`QueryCache`]: process-wide cache with request de-duplication
//! - [`Query`]: read hook with an `idle / pending / success / error` status
//! - [`Mutation`]: write hook that invalidates affected reads and notifies
//! - [`SommelierClient`]: one method per read and write hook
//!
//! # Example
//!
//! ```ignore
//! let client = SommelierClient::new(&ClientConfig::load()?)?;
//! let dashboard = client.dashboard_summary(Some(restaurant_id));
//! dashboard.fetch().await;
//!
//! let create = client.create_sale();
//! create.mutate(SaleCreate::new(restaurant_id, form)).await?;
//! // the dashboard entry is now stale; the next fetch goes to the network
//! dashboard.fetch().await;
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod hooks;
pub mod mutation;
pub mod notify;
pub mod query;
pub mod status;
pub mod telemetry;
pub mod upload;

pub use api::{ApiClient, Schema};
pub use cache::{QueryCache, QueryFamily, QueryKey, SharedResult};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ClientResult};
pub use hooks::{SommelierClient, Target};
pub use mutation::{Mutation, MutationKind, MutationOutput};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use query::{fetcher, Fetcher, Query};
pub use status::Status;
pub use upload::UploadFile;

// Re-export the shared models so callers need one dependency
pub use shared;
