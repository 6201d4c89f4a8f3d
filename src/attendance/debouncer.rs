use std::time::Duration;

use chrono::NaiveDateTime;

/// Global cooldown gate in front of the recorder.
///
/// A badge held up to the camera decodes on many consecutive frames; the gate
/// lets one detection through and then suppresses every detection, whatever
/// identifier it carries, until `cooldown` has passed. It is not keyed per
/// identifier: the recorder's same-day check is what prevents duplicates.
#[derive(Debug, Clone)]
pub struct Debouncer {
    cooldown: Duration,
    last_accepted: Option<NaiveDateTime>,
}

impl Debouncer {
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(3);

    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: None,
        }
    }

    /// True when the gate is open; an accepted detection closes it again.
    pub fn accept(&mut self, identifier: &str, now: NaiveDateTime) -> bool {
        let open = match self.last_accepted {
            None => true,
            // a negative elapsed time means the clock was stepped back
            Some(last) => (now - last)
                .to_std()
                .map_or(true, |elapsed| elapsed >= self.cooldown),
        };

        if open {
            self.last_accepted = Some(now);
            tracing::trace!(identifier, "Detection accepted");
        } else {
            tracing::trace!(identifier, "Detection suppressed by cooldown");
        }

        open
    }

    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COOLDOWN)
    }
}
