use crate::error::AppError;
use crate::model::{JobApplication, Task};

pub mod json_store;
pub mod memory;

pub use json_store::JsonStore;
pub use memory::MemoryStore;

/// Persistence seam for coaching tasks.
///
/// Implementations only move rows in and out; every rule about which rows may
/// be written lives in `task_api`.
pub trait TaskStore {
    fn tasks(&self) -> Result<Vec<Task>, AppError>;

    fn task(&self, id: &str) -> Result<Option<Task>, AppError> {
        Ok(self.tasks()?.into_iter().find(|task| task.id == id))
    }

    fn insert_task(&mut self, task: Task) -> Result<(), AppError>;

    /// Overwrites the row with the same id. Fails with `not_found` when absent.
    fn replace_task(&mut self, task: Task) -> Result<(), AppError>;

    fn remove_task(&mut self, id: &str) -> Result<Task, AppError>;
}

/// Persistence seam for job applications.
pub trait ApplicationStore {
    fn applications(&self) -> Result<Vec<JobApplication>, AppError>;

    fn application(&self, id: &str) -> Result<Option<JobApplication>, AppError> {
        Ok(self.applications()?.into_iter().find(|app| app.id == id))
    }

    fn insert_application(&mut self, application: JobApplication) -> Result<(), AppError>;

    fn replace_application(&mut self, application: JobApplication) -> Result<(), AppError>;

    fn remove_application(&mut self, id: &str) -> Result<JobApplication, AppError>;
}

/// Allocates `<prefix>-<unix nanos>`, stepping forward past ids already taken.
pub(crate) fn next_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    loop {
        let id = format!("{prefix}-{nanos}");
        if !taken(&id) {
            return id;
        }
        nanos += 1;
    }
}

pub(crate) fn task_not_found(id: &str) -> AppError {
    AppError::not_found(format!("task '{id}' not found"))
}

pub(crate) fn application_not_found(id: &str) -> AppError {
    AppError::not_found(format!("application '{id}' not found"))
}
