use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use moka::future::Cache;

use crate::error::StoreError;
use crate::model::Employee;
use crate::store::DirectoryService;

/// Upper bound on cached employee records.
const CACHE_CAPACITY: u64 = 50_000;

/// Directory decorator that keeps recently seen employees in memory.
///
/// Only hits are cached: an identifier that was unknown a second ago may be
/// registered by the time the badge is presented again.
pub struct CachedDirectory {
    inner: Arc<dyn DirectoryService>,
    cache: Cache<String, Employee>,
}

impl CachedDirectory {
    pub fn new(inner: Arc<dyn DirectoryService>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Batch insert employees into the cache
    async fn batch_insert(&self, employees: &[Employee]) {
        let futures: Vec<_> = employees
            .iter()
            .map(|e| self.cache.insert(e.employee_id.clone(), e.clone()))
            .collect();

        futures::future::join_all(futures).await;
    }

    /// Load the whole directory into the cache, `batch_size` records at a time.
    pub async fn warmup(&self, batch_size: usize) -> Result<usize> {
        let batch_size = batch_size.max(1);
        let mut stream = self.inner.employees();

        let mut batch = Vec::with_capacity(batch_size);
        let mut total_count = 0usize;

        while let Some(row) = stream.next().await {
            batch.push(row?);
            total_count += 1;

            if batch.len() >= batch_size {
                self.batch_insert(&batch).await;
                batch.clear();
            }
        }

        if !batch.is_empty() {
            self.batch_insert(&batch).await;
        }

        tracing::info!(employees = total_count, "Employee cache warmup complete");
        Ok(total_count)
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

#[async_trait]
impl DirectoryService for CachedDirectory {
    async fn find_employee(&self, identifier: &str) -> Result<Option<Employee>, StoreError> {
        if let Some(employee) = self.cache.get(identifier).await {
            return Ok(Some(employee));
        }

        let found = self.inner.find_employee(identifier).await?;
        if let Some(employee) = &found {
            self.cache
                .insert(employee.employee_id.clone(), employee.clone())
                .await;
        }

        Ok(found)
    }

    async fn count_employees(&self) -> Result<u64, StoreError> {
        self.inner.count_employees().await
    }

    fn employees(&self) -> BoxStream<'_, Result<Employee, StoreError>> {
        self.inner.employees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn cached(store: &Arc<MemoryStore>) -> CachedDirectory {
        CachedDirectory::new(store.clone(), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn hits_are_served_after_the_source_changes() {
        let store = Arc::new(MemoryStore::with_employees([Employee::new("E100", "Asha")]));
        let directory = cached(&store);

        assert!(directory.find_employee("E100").await.unwrap().is_some());

        // rename in the source; the cached record is still served
        store.insert_employee(Employee::new("E100", "Asha K")).unwrap();
        let employee = directory.find_employee("E100").await.unwrap().unwrap();
        assert_eq!(employee.name, "Asha");

        directory.invalidate_all();
        let employee = directory.find_employee("E100").await.unwrap().unwrap();
        assert_eq!(employee.name, "Asha K");
    }

    #[tokio::test]
    async fn misses_are_not_cached() {
        let store = Arc::new(MemoryStore::default());
        let directory = cached(&store);

        assert!(directory.find_employee("E300").await.unwrap().is_none());

        store.insert_employee(Employee::new("E300", "Noor")).unwrap();
        assert!(directory.find_employee("E300").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn warmup_loads_every_employee() {
        let store = Arc::new(MemoryStore::with_employees(
            (0..7).map(|i| Employee::new(format!("E{i:03}"), format!("Staff {i}"))),
        ));
        let directory = cached(&store);

        assert_eq!(directory.warmup(3).await.unwrap(), 7);
        directory.cache.run_pending_tasks().await;
        assert_eq!(directory.cache.entry_count(), 7);
    }
}
