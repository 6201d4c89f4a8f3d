#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use futures::stream::BoxStream;

use attendance_kiosk::error::StoreError;
use attendance_kiosk::kiosk::{FixedClock, Kiosk, PresenterEvent, PresenterHandle};
use attendance_kiosk::model::{AttendanceEvent, Employee, TimeRange};
use attendance_kiosk::store::{DirectoryService, EventStore, MemoryStore, Stores};
use tokio::sync::mpsc;

pub const STORE_TIMEOUT: Duration = Duration::from_millis(200);

pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, min, sec))
        .unwrap()
}

pub fn directory() -> Vec<Employee> {
    vec![
        Employee::new("E100", "Asha").with_department("Engineering"),
        Employee::new("E200", "Bilal"),
    ]
}

pub fn memory_stores() -> (Arc<MemoryStore>, Stores) {
    let store = Arc::new(MemoryStore::with_employees(directory()));
    let stores = Stores {
        directory: store.clone(),
        events: store.clone(),
    };
    (store, stores)
}

pub fn kiosk(stores: &Stores, clock: Arc<FixedClock>) -> (Kiosk, mpsc::Receiver<PresenterEvent>) {
    let (presenter, rx) = PresenterHandle::channel(64);
    (Kiosk::new(stores, presenter, clock, STORE_TIMEOUT, 10), rx)
}

/// Memory store that can be switched off.
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub down: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::with_employees(directory()),
            down: AtomicBool::new(false),
        }
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DirectoryService for FlakyStore {
    async fn find_employee(&self, identifier: &str) -> Result<Option<Employee>, StoreError> {
        self.check()?;
        self.inner.find_employee(identifier).await
    }

    async fn count_employees(&self) -> Result<u64, StoreError> {
        self.check()?;
        self.inner.count_employees().await
    }

    fn employees(&self) -> BoxStream<'_, Result<Employee, StoreError>> {
        self.inner.employees()
    }
}

#[async_trait]
impl EventStore for FlakyStore {
    async fn find_event(
        &self,
        employee_id: &str,
        window: TimeRange,
    ) -> Result<Option<AttendanceEvent>, StoreError> {
        self.check()?;
        self.inner.find_event(employee_id, window).await
    }

    async fn append_event(&self, event: &AttendanceEvent) -> Result<(), StoreError> {
        self.check()?;
        self.inner.append_event(event).await
    }

    async fn list_recent(
        &self,
        window: TimeRange,
        limit: usize,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        self.check()?;
        self.inner.list_recent(window, limit).await
    }

    async fn count(&self, window: Option<TimeRange>) -> Result<u64, StoreError> {
        self.check()?;
        self.inner.count(window).await
    }

    async fn list_for_employee(
        &self,
        employee_id: &str,
        window: TimeRange,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        self.check()?;
        self.inner.list_for_employee(employee_id, window).await
    }
}

/// Event store where another writer always wins between check and insert.
pub struct ContendedEvents;

#[async_trait]
impl EventStore for ContendedEvents {
    async fn find_event(
        &self,
        _employee_id: &str,
        _window: TimeRange,
    ) -> Result<Option<AttendanceEvent>, StoreError> {
        Ok(None)
    }

    async fn append_event(&self, event: &AttendanceEvent) -> Result<(), StoreError> {
        Err(StoreError::Duplicate {
            employee_id: event.employee_id.clone(),
            day: event.day(),
        })
    }

    async fn list_recent(
        &self,
        _window: TimeRange,
        _limit: usize,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        Ok(Vec::new())
    }

    async fn count(&self, _window: Option<TimeRange>) -> Result<u64, StoreError> {
        Ok(0)
    }

    async fn list_for_employee(
        &self,
        _employee_id: &str,
        _window: TimeRange,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        Ok(Vec::new())
    }
}

/// Directory that never answers in time.
pub struct StalledDirectory;

#[async_trait]
impl DirectoryService for StalledDirectory {
    async fn find_employee(&self, _identifier: &str) -> Result<Option<Employee>, StoreError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(None)
    }

    async fn count_employees(&self) -> Result<u64, StoreError> {
        Ok(0)
    }

    fn employees(&self) -> BoxStream<'_, Result<Employee, StoreError>> {
        Box::pin(futures::stream::empty())
    }
}
