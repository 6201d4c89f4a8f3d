use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};

use crate::error::StoreError;
use crate::model::{AttendanceEvent, Employee, TimeRange};
use crate::store::{DirectoryService, EventStore};

/// In-process directory and attendance log.
///
/// Used by offline kiosks (`STORE_BACKEND=memory`) and by the test suites.
/// Appends check the same-day rule and insert under one lock, so concurrent
/// check-ins for the same employee cannot both land.
#[derive(Default)]
pub struct MemoryStore {
    employees: RwLock<BTreeMap<String, Employee>>,
    events: Mutex<Vec<AttendanceEvent>>,
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("memory store lock poisoned".into())
}

impl MemoryStore {
    pub fn with_employees(employees: impl IntoIterator<Item = Employee>) -> Self {
        let store = Self::default();
        {
            let mut directory = store
                .employees
                .write()
                .unwrap_or_else(|e| e.into_inner());
            for employee in employees {
                directory.insert(employee.employee_id.clone(), employee);
            }
        }
        store
    }

    /// Loads a JSON array of employees.
    pub fn from_seed_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read employee seed file {}", path.display()))?;
        let employees: Vec<Employee> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid employee seed file {}", path.display()))?;

        tracing::info!(count = employees.len(), path = %path.display(), "Seeded memory directory");
        Ok(Self::with_employees(employees))
    }

    pub fn insert_employee(&self, employee: Employee) -> Result<(), StoreError> {
        self.employees
            .write()
            .map_err(|_| poisoned())?
            .insert(employee.employee_id.clone(), employee);
        Ok(())
    }

    /// Snapshot of every stored event, in insertion order.
    pub fn events(&self) -> Result<Vec<AttendanceEvent>, StoreError> {
        Ok(self.events.lock().map_err(|_| poisoned())?.clone())
    }

    fn matching(
        &self,
        mut keep: impl FnMut(&AttendanceEvent) -> bool,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        let events = self.events.lock().map_err(|_| poisoned())?;
        let mut found: Vec<_> = events.iter().filter(|e| keep(e)).cloned().collect();
        found.sort_by(|a, b| b.check_in_time.cmp(&a.check_in_time));
        Ok(found)
    }
}

#[async_trait]
impl DirectoryService for MemoryStore {
    async fn find_employee(&self, identifier: &str) -> Result<Option<Employee>, StoreError> {
        Ok(self
            .employees
            .read()
            .map_err(|_| poisoned())?
            .get(identifier)
            .cloned())
    }

    async fn count_employees(&self) -> Result<u64, StoreError> {
        Ok(self.employees.read().map_err(|_| poisoned())?.len() as u64)
    }

    fn employees(&self) -> BoxStream<'_, Result<Employee, StoreError>> {
        let snapshot: Vec<Result<Employee, StoreError>> = match self.employees.read() {
            Ok(directory) => directory.values().cloned().map(Ok).collect(),
            Err(_) => vec![Err(poisoned())],
        };
        stream::iter(snapshot).boxed()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn find_event(
        &self,
        employee_id: &str,
        window: TimeRange,
    ) -> Result<Option<AttendanceEvent>, StoreError> {
        let events = self.events.lock().map_err(|_| poisoned())?;
        Ok(events
            .iter()
            .filter(|e| e.employee_id == employee_id && window.contains(e.check_in_time))
            .min_by_key(|e| e.check_in_time)
            .cloned())
    }

    async fn append_event(&self, event: &AttendanceEvent) -> Result<(), StoreError> {
        let mut events = self.events.lock().map_err(|_| poisoned())?;

        let day = event.day();
        if events
            .iter()
            .any(|e| e.employee_id == event.employee_id && e.day() == day)
        {
            return Err(StoreError::Duplicate {
                employee_id: event.employee_id.clone(),
                day,
            });
        }

        events.push(event.clone());
        Ok(())
    }

    async fn list_recent(
        &self,
        window: TimeRange,
        limit: usize,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        let mut found = self.matching(|e| window.contains(e.check_in_time))?;
        found.truncate(limit);
        Ok(found)
    }

    async fn count(&self, window: Option<TimeRange>) -> Result<u64, StoreError> {
        let events = self.events.lock().map_err(|_| poisoned())?;
        let total = match window {
            Some(window) => events
                .iter()
                .filter(|e| window.contains(e.check_in_time))
                .count(),
            None => events.len(),
        };
        Ok(total as u64)
    }

    async fn list_for_employee(
        &self,
        employee_id: &str,
        window: TimeRange,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        self.matching(|e| e.employee_id == employee_id && window.contains(e.check_in_time))
    }
}
