use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use strum::Display;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use utoipa::ToSchema;

use crate::attendance::Outcome;
use crate::model::{AttendanceEvent, Employee, ScanMethod};

pub const READY_STATUS: &str = "Ready - Please scan QR code";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Messages marshaled from the kiosk paths to the presentation task.
#[derive(Debug, Clone)]
pub enum PresenterEvent {
    Outcome(Outcome),
    Status { message: String, severity: Severity },
    /// Today's events as read back from the store
    RecentLoaded(Vec<AttendanceEvent>),
}

/// Core → UI callbacks.
pub trait Presenter {
    fn on_outcome(&mut self, outcome: &Outcome);

    fn on_status(&mut self, message: &str, severity: Severity);
}

/// Status line for an outcome.
pub fn status_for(outcome: &Outcome) -> (String, Severity) {
    match outcome {
        Outcome::Recorded { employee, event } => {
            let message = match event.verification_method {
                ScanMethod::Scan => format!("Attendance marked for {}", employee.name),
                ScanMethod::Manual => format!("Manual attendance marked for {}", employee.name),
            };
            (message, Severity::Success)
        }
        Outcome::AlreadyMarked { employee, .. } => (
            format!("Attendance already marked for {} today", employee.name),
            Severity::Warning,
        ),
        Outcome::RaceLost { employee } => (
            format!("Attendance for {} was just recorded elsewhere", employee.name),
            Severity::Warning,
        ),
        Outcome::NotFound { .. } => ("Employee not found in database".to_string(), Severity::Error),
        Outcome::StoreError { detail } => (format!("Error: {detail}"), Severity::Error),
    }
}

/// Cloneable sending side of the presenter channel.
///
/// Sends never wait: when the channel is full the update is dropped so the
/// camera path keeps its pace.
#[derive(Debug, Clone)]
pub struct PresenterHandle {
    tx: mpsc::Sender<PresenterEvent>,
}

impl PresenterHandle {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PresenterEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub fn on_outcome(&self, outcome: Outcome) {
        self.publish(PresenterEvent::Outcome(outcome));
    }

    pub fn on_status(&self, message: impl Into<String>, severity: Severity) {
        self.publish(PresenterEvent::Status {
            message: message.into(),
            severity,
        });
    }

    pub fn recent_loaded(&self, events: Vec<AttendanceEvent>) {
        self.publish(PresenterEvent::RecentLoaded(events));
    }

    fn publish(&self, event: PresenterEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => tracing::warn!("Presenter channel full, dropping update"),
            Err(TrySendError::Closed(_)) => tracing::debug!("Presenter closed, dropping update"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LastScan {
    pub employee: Employee,
    #[schema(value_type = String, format = "date-time")]
    pub at: NaiveDateTime,
}

/// What the kiosk screen shows.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardSnapshot {
    pub status: String,
    pub severity: Severity,
    pub last_employee: Option<LastScan>,
    /// Today's check-ins, newest first
    pub recent: Vec<AttendanceEvent>,
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        Self {
            status: READY_STATUS.to_string(),
            severity: Severity::Info,
            last_employee: None,
            recent: Vec::new(),
        }
    }
}

impl DashboardSnapshot {
    /// Drops check-ins from other days; the list is only refilled by the next
    /// check-in or refresh.
    pub fn for_day(mut self, day: NaiveDate) -> Self {
        self.recent.retain(|e| e.day() == day);
        self
    }
}

/// Presentation state, owned by a single task that drains the presenter
/// channel in order and publishes a snapshot after every update.
pub struct Dashboard {
    snapshot: DashboardSnapshot,
    recent_limit: usize,
    publish: watch::Sender<DashboardSnapshot>,
}

impl Dashboard {
    pub fn new(recent_limit: usize) -> (Self, watch::Receiver<DashboardSnapshot>) {
        let (publish, snapshots) = watch::channel(DashboardSnapshot::default());
        let dashboard = Self {
            snapshot: DashboardSnapshot::default(),
            recent_limit: recent_limit.max(1),
            publish,
        };
        (dashboard, snapshots)
    }

    pub async fn run(mut self, mut updates: mpsc::Receiver<PresenterEvent>) {
        while let Some(update) = updates.recv().await {
            self.apply(update);
        }
        tracing::info!("Presenter channel closed, dashboard stopped");
    }

    pub fn apply(&mut self, update: PresenterEvent) {
        match update {
            PresenterEvent::Outcome(outcome) => self.on_outcome(&outcome),
            PresenterEvent::Status { message, severity } => self.on_status(&message, severity),
            PresenterEvent::RecentLoaded(events) => {
                self.snapshot.recent = events;
                self.snapshot.recent.truncate(self.recent_limit);
            }
        }
        self.publish.send_replace(self.snapshot.clone());
    }

    pub fn snapshot(&self) -> &DashboardSnapshot {
        &self.snapshot
    }

    fn push_recent(&mut self, event: &AttendanceEvent) {
        let day = event.day();
        // a new day starts with an empty list
        self.snapshot.recent.retain(|e| e.day() == day);
        self.snapshot.recent.insert(0, event.clone());
        self.snapshot.recent.truncate(self.recent_limit);
    }
}

impl Presenter for Dashboard {
    fn on_outcome(&mut self, outcome: &Outcome) {
        let (message, severity) = status_for(outcome);
        self.on_status(&message, severity);

        if let Outcome::Recorded { employee, event } = outcome {
            self.snapshot.last_employee = Some(LastScan {
                employee: employee.clone(),
                at: event.check_in_time,
            });
            self.push_recent(event);
        }
    }

    fn on_status(&mut self, message: &str, severity: Severity) {
        self.snapshot.status = message.to_string();
        self.snapshot.severity = severity;
    }
}
