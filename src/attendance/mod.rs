pub mod debouncer;
pub mod outcome;
pub mod queries;
pub mod recorder;

pub use debouncer::Debouncer;
pub use outcome::Outcome;
pub use queries::{AttendanceQueries, DailyStats};
pub use recorder::AttendanceRecorder;
