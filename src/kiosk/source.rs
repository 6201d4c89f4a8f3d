use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde_json::{Value, json};
use strum::Display;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

use crate::kiosk::clock::Clock;
use crate::kiosk::presenter::{PresenterHandle, Severity};
use crate::model::ScanMethod;

/// A recognized identifier on its way to the recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub identifier: String,
    pub detected_at: NaiveDateTime,
    pub method: ScanMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum IgnoreReason {
    NotUtf8,
    NotJson,
    NotAnObject,
    MissingEmployeeId,
}

/// Decoded QR payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Identifier(String),
    /// Skipped without surfacing an error
    Ignored(IgnoreReason),
}

/// Badges carry `{"employee_id": "..."}`. Anything else is ignored.
pub fn parse_payload(raw: &[u8]) -> Payload {
    let Ok(text) = std::str::from_utf8(raw) else {
        return Payload::Ignored(IgnoreReason::NotUtf8);
    };

    let value: Value = match serde_json::from_str(text.trim()) {
        Ok(v) => v,
        Err(_) => return Payload::Ignored(IgnoreReason::NotJson),
    };

    let Some(fields) = value.as_object() else {
        return Payload::Ignored(IgnoreReason::NotAnObject);
    };

    match fields
        .get("employee_id")
        .and_then(Value::as_str)
        .map(str::trim)
    {
        Some(id) if !id.is_empty() => Payload::Identifier(id.to_string()),
        _ => Payload::Ignored(IgnoreReason::MissingEmployeeId),
    }
}

/// QR payload printed on an employee's badge; `parse_payload` reads it back.
pub fn badge_payload(employee_id: &str) -> String {
    json!({ "employee_id": employee_id }).to_string()
}

/// Camera side of the kiosk.
///
/// Frame capture and QR decoding run in an external process that prints one
/// decoded payload per line (`zbarcam --raw` and friends). The child is
/// spawned with `kill_on_drop`, so the camera is released on every exit path,
/// and restarted after `restart_delay` whenever it exits. Without a command
/// the feed reads payload lines from stdin once.
pub struct ScannerFeed {
    command: Option<String>,
    restart_delay: Duration,
    clock: Arc<dyn Clock>,
    detections: mpsc::Sender<Detection>,
    presenter: PresenterHandle,
}

impl ScannerFeed {
    pub fn new(
        command: Option<String>,
        restart_delay: Duration,
        clock: Arc<dyn Clock>,
        detections: mpsc::Sender<Detection>,
        presenter: PresenterHandle,
    ) -> Self {
        Self {
            command,
            restart_delay,
            clock,
            detections,
            presenter,
        }
    }

    /// Runs until the pipeline goes away.
    pub async fn run(self) {
        let Some(command) = self.command.clone() else {
            info!("No SCANNER_COMMAND configured, reading QR payloads from stdin");
            self.pump(BufReader::new(tokio::io::stdin())).await;
            info!("Stdin scanner feed closed");
            return;
        };

        loop {
            match spawn_scanner(&command) {
                Ok(mut child) => {
                    info!(command = %command, "Scanner started");
                    if let Some(stdout) = child.stdout.take() {
                        if !self.pump(BufReader::new(stdout)).await {
                            return;
                        }
                    }
                    match child.try_wait() {
                        Ok(Some(status)) => warn!(%status, "Scanner exited"),
                        _ => warn!("Scanner output closed"),
                    }
                    // dropping the child kills it
                }
                Err(e) => {
                    error!(error = %e, command = %command, "Failed to start scanner");
                    self.presenter
                        .on_status(format!("Camera not available: {e}"), Severity::Error);
                }
            }

            if self.detections.is_closed() {
                return;
            }
            tokio::time::sleep(self.restart_delay).await;
        }
    }

    /// Forwards every decodable line. Returns false once the pipeline is gone.
    pub async fn pump<R>(&self, mut reader: R) -> bool
    where
        R: AsyncBufRead + Unpin,
    {
        let mut line = Vec::new();

        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line).await {
                Ok(0) => return true,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "Scanner read failed");
                    return true;
                }
            }

            let raw = line.trim_ascii();
            if raw.is_empty() {
                continue;
            }

            let identifier = match parse_payload(raw) {
                Payload::Identifier(id) => id,
                Payload::Ignored(reason) => {
                    debug!(%reason, "Ignoring undecodable QR payload");
                    continue;
                }
            };

            let detection = Detection {
                identifier,
                detected_at: self.clock.now(),
                method: ScanMethod::Scan,
            };

            match self.detections.try_send(detection) {
                Ok(()) => {}
                // the badge is still in front of the camera; a later frame will do
                Err(TrySendError::Full(_)) => debug!("Detection queue full, frame dropped"),
                Err(TrySendError::Closed(_)) => return false,
            }
        }
    }
}

fn spawn_scanner(command: &str) -> std::io::Result<Child> {
    let mut parts = command.split_whitespace();
    let program = parts.next().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty scanner command")
    })?;

    Command::new(program)
        .args(parts)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
}
