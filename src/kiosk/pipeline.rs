use std::sync::Arc;

use tokio::sync::mpsc;

use crate::attendance::{AttendanceRecorder, Debouncer, Outcome};
use crate::kiosk::presenter::PresenterHandle;
use crate::kiosk::source::Detection;
use crate::model::ScanMethod;

/// Camera-side loop: detection → cooldown gate → recorder → presenter.
///
/// The pipeline task is the only owner of the debouncer. Manual entries skip
/// the gate.
pub struct Pipeline {
    recorder: Arc<AttendanceRecorder>,
    debouncer: Debouncer,
    presenter: PresenterHandle,
}

impl Pipeline {
    pub fn new(recorder: Arc<AttendanceRecorder>, debouncer: Debouncer, presenter: PresenterHandle) -> Self {
        Self {
            recorder,
            debouncer,
            presenter,
        }
    }

    pub async fn run(mut self, mut detections: mpsc::Receiver<Detection>) {
        while let Some(detection) = detections.recv().await {
            self.handle(detection).await;
        }
        tracing::info!("Detection channel closed, pipeline stopped");
    }

    /// `None` when the cooldown swallowed the detection.
    pub async fn handle(&mut self, detection: Detection) -> Option<Outcome> {
        if detection.method == ScanMethod::Scan
            && !self
                .debouncer
                .accept(&detection.identifier, detection.detected_at)
        {
            return None;
        }

        let outcome = self
            .recorder
            .record(&detection.identifier, detection.detected_at, detection.method)
            .await;
        self.presenter.on_outcome(outcome.clone());

        Some(outcome)
    }
}
