pub mod application_api;
pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod notify;
pub mod status;
pub mod storage;
pub mod task_api;

use time::{OffsetDateTime, UtcOffset};

/// Current wall-clock time in the local offset, falling back to UTC when the
/// offset cannot be determined.
pub fn local_now() -> OffsetDateTime {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset)
}
