pub mod attendance;
pub mod employee;
pub mod time_range;

pub use attendance::{AttendanceEvent, ScanMethod};
pub use employee::Employee;
pub use time_range::TimeRange;
