use super::{ApplicationStore, TaskStore, application_not_found, task_not_found};
use crate::error::AppError;
use crate::model::{JobApplication, Task};

/// Store that lives for one session, e.g. a request or a test.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tasks: Vec<Task>,
    applications: Vec<JobApplication>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            applications: Vec::new(),
        }
    }

    pub fn with_applications(applications: Vec<JobApplication>) -> Self {
        Self {
            tasks: Vec::new(),
            applications,
        }
    }
}

impl TaskStore for MemoryStore {
    fn tasks(&self) -> Result<Vec<Task>, AppError> {
        Ok(self.tasks.clone())
    }

    fn task(&self, id: &str) -> Result<Option<Task>, AppError> {
        Ok(self.tasks.iter().find(|task| task.id == id).cloned())
    }

    fn insert_task(&mut self, task: Task) -> Result<(), AppError> {
        if self.tasks.iter().any(|existing| existing.id == task.id) {
            return Err(AppError::invalid_data(format!(
                "task '{}' already exists",
                task.id
            )));
        }
        self.tasks.push(task);
        Ok(())
    }

    fn replace_task(&mut self, task: Task) -> Result<(), AppError> {
        let slot = self
            .tasks
            .iter_mut()
            .find(|existing| existing.id == task.id)
            .ok_or_else(|| task_not_found(&task.id))?;
        *slot = task;
        Ok(())
    }

    fn remove_task(&mut self, id: &str) -> Result<Task, AppError> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| task_not_found(id))?;
        Ok(self.tasks.remove(index))
    }
}

impl ApplicationStore for MemoryStore {
    fn applications(&self) -> Result<Vec<JobApplication>, AppError> {
        Ok(self.applications.clone())
    }

    fn application(&self, id: &str) -> Result<Option<JobApplication>, AppError> {
        Ok(self.applications.iter().find(|app| app.id == id).cloned())
    }

    fn insert_application(&mut self, application: JobApplication) -> Result<(), AppError> {
        if self.applications.iter().any(|app| app.id == application.id) {
            return Err(AppError::invalid_data(format!(
                "application '{}' already exists",
                application.id
            )));
        }
        self.applications.push(application);
        Ok(())
    }

    fn replace_application(&mut self, application: JobApplication) -> Result<(), AppError> {
        let slot = self
            .applications
            .iter_mut()
            .find(|app| app.id == application.id)
            .ok_or_else(|| application_not_found(&application.id))?;
        *slot = application;
        Ok(())
    }

    fn remove_application(&mut self, id: &str) -> Result<JobApplication, AppError> {
        let index = self
            .applications
            .iter()
            .position(|app| app.id == id)
            .ok_or_else(|| application_not_found(id))?;
        Ok(self.applications.remove(index))
    }
}
