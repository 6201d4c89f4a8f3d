use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::attendance::{AttendanceQueries, AttendanceRecorder, Debouncer, Outcome};
use crate::error::StoreError;
use crate::model::ScanMethod;
use crate::store::Stores;

pub mod clock;
pub mod pipeline;
pub mod presenter;
pub mod source;

pub use clock::{Clock, FixedClock, SystemClock};
pub use pipeline::Pipeline;
pub use presenter::{Dashboard, DashboardSnapshot, PresenterEvent, PresenterHandle, Severity};
pub use source::{Detection, Payload, ScannerFeed, badge_payload, parse_payload};

/// Wiring shared by the camera pipeline and the HTTP handlers.
#[derive(Clone)]
pub struct Kiosk {
    recorder: Arc<AttendanceRecorder>,
    queries: Arc<AttendanceQueries>,
    presenter: PresenterHandle,
    clock: Arc<dyn Clock>,
    recent_limit: usize,
}

impl Kiosk {
    pub fn new(
        stores: &Stores,
        presenter: PresenterHandle,
        clock: Arc<dyn Clock>,
        store_timeout: Duration,
        recent_limit: usize,
    ) -> Self {
        let recorder = AttendanceRecorder::new(
            stores.directory.clone(),
            stores.events.clone(),
            store_timeout,
        );
        let queries = AttendanceQueries::new(
            stores.directory.clone(),
            stores.events.clone(),
            store_timeout,
        );

        Self {
            recorder: Arc::new(recorder),
            queries: Arc::new(queries),
            presenter,
            clock,
            recent_limit,
        }
    }

    /// Manual-entry fallback: records immediately, no cooldown.
    pub async fn check_in_manual(&self, identifier: &str) -> Outcome {
        let outcome = self
            .recorder
            .record(identifier, self.clock.now(), ScanMethod::Manual)
            .await;
        self.presenter.on_outcome(outcome.clone());
        outcome
    }

    /// Reloads today's check-ins into the dashboard.
    pub async fn refresh_dashboard(&self) -> Result<usize, StoreError> {
        let events = self
            .queries
            .recent_today(self.clock.now(), self.recent_limit)
            .await?;
        let loaded = events.len();
        self.presenter.recent_loaded(events);
        Ok(loaded)
    }

    pub fn pipeline(&self, cooldown: Duration) -> Pipeline {
        Pipeline::new(
            self.recorder.clone(),
            Debouncer::new(cooldown),
            self.presenter.clone(),
        )
    }

    pub fn queries(&self) -> &AttendanceQueries {
        &self.queries
    }

    pub fn presenter(&self) -> &PresenterHandle {
        &self.presenter
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn recent_limit(&self) -> usize {
        self.recent_limit
    }
}
