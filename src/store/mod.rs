use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::config::{Config, StoreBackend};
use crate::db;
use crate::error::StoreError;
use crate::model::{AttendanceEvent, Employee, TimeRange};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// Read-only view of the employee directory.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    async fn find_employee(&self, identifier: &str) -> Result<Option<Employee>, StoreError>;

    async fn count_employees(&self) -> Result<u64, StoreError>;

    /// Every employee, streamed in directory order.
    fn employees(&self) -> BoxStream<'_, Result<Employee, StoreError>>;
}

/// Append-only attendance log.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Earliest event for `employee_id` inside `window`.
    async fn find_event(
        &self,
        employee_id: &str,
        window: TimeRange,
    ) -> Result<Option<AttendanceEvent>, StoreError>;

    /// Fails with [`StoreError::Duplicate`] when the employee already has an
    /// event on the same calendar day.
    async fn append_event(&self, event: &AttendanceEvent) -> Result<(), StoreError>;

    /// Newest first, at most `limit` events.
    async fn list_recent(
        &self,
        window: TimeRange,
        limit: usize,
    ) -> Result<Vec<AttendanceEvent>, StoreError>;

    async fn count(&self, window: Option<TimeRange>) -> Result<u64, StoreError>;

    /// Newest first.
    async fn list_for_employee(
        &self,
        employee_id: &str,
        window: TimeRange,
    ) -> Result<Vec<AttendanceEvent>, StoreError>;
}

/// The two collaborators, shared between the camera path and manual entry.
#[derive(Clone)]
pub struct Stores {
    pub directory: Arc<dyn DirectoryService>,
    pub events: Arc<dyn EventStore>,
}

/// Builds the configured backend.
pub fn open(config: &Config) -> anyhow::Result<Stores> {
    match config.store_backend {
        StoreBackend::Mysql => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for the mysql backend")?;
            let pool = db::init_pool(url, config.store_timeout)?;
            let store = Arc::new(MySqlStore::new(pool));

            Ok(Stores {
                directory: store.clone(),
                events: store,
            })
        }
        StoreBackend::Memory => {
            let store = match &config.seed_employees {
                Some(path) => MemoryStore::from_seed_file(path)?,
                None => MemoryStore::default(),
            };
            let store = Arc::new(store);

            Ok(Stores {
                directory: store.clone(),
                events: store,
            })
        }
    }
}

/// Bounds a store call; expiry becomes [`StoreError::Timeout`].
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}
