use super::{ApplicationStore, TaskStore, application_not_found, task_not_found};
use crate::error::AppError;
use crate::model::{ApplicationStatus, JobApplication, Task};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "store.json";
const STORE_ENV_VAR: &str = "COACHDESK_STORE_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredState {
    schema_version: u32,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    applications: Vec<JobApplication>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct StoreState {
    pub tasks: Vec<Task>,
    pub applications: Vec<JobApplication>,
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("coachdesk")
            .join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("coachdesk")
            .join(STORE_FILE_NAME))
    }
}

pub fn load_state(path: &Path) -> Result<StoreState, AppError> {
    if !path.exists() {
        return Ok(StoreState::default());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredState =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    ensure_unique(stored.tasks.iter().map(|task| task.id.as_str()), "task")?;
    ensure_unique(
        stored.applications.iter().map(|app| app.id.as_str()),
        "application",
    )?;

    for app in &stored.applications {
        let hired = app.status == ApplicationStatus::Hired;
        if hired != app.hired.is_some() {
            return Err(AppError::invalid_data(format!(
                "application '{}' hire details do not match status '{}'",
                app.id, app.status
            )));
        }
    }

    Ok(StoreState {
        tasks: stored.tasks,
        applications: stored.applications,
    })
}

pub fn save_state(path: &Path, state: &StoreState) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredState {
        schema_version: SCHEMA_VERSION,
        tasks: state.tasks.clone(),
        applications: state.applications.clone(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;

    // Readers see either the old file or the new one, never a partial write.
    let staging = staging_path(path);
    if let Err(err) = write_private(&staging, &content)
        .and_then(|()| std::fs::rename(&staging, path))
    {
        std::fs::remove_file(&staging).ok();
        return Err(AppError::io(err.to_string()));
    }

    tracing::trace!(path = %path.display(), "store saved");
    Ok(())
}

/// Sibling of `path` in the same directory, so the rename stays on one filesystem.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("store.json"));
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    std::fs::write(path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

fn ensure_unique<'a>(ids: impl Iterator<Item = &'a str>, kind: &str) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(AppError::invalid_data(format!("duplicate {kind} id '{id}'")));
        }
    }
    Ok(())
}

/// File-backed store. Every call re-reads the file, so each mutation is a
/// complete read-modify-write of one JSON document.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(store_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modify<T>(
        &self,
        change: impl FnOnce(&mut StoreState) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut state = load_state(&self.path)?;
        let result = change(&mut state)?;
        save_state(&self.path, &state)?;
        Ok(result)
    }
}

impl TaskStore for JsonStore {
    fn tasks(&self) -> Result<Vec<Task>, AppError> {
        Ok(load_state(&self.path)?.tasks)
    }

    fn insert_task(&mut self, task: Task) -> Result<(), AppError> {
        self.modify(|state| {
            if state.tasks.iter().any(|existing| existing.id == task.id) {
                return Err(AppError::invalid_data(format!(
                    "task '{}' already exists",
                    task.id
                )));
            }
            state.tasks.push(task);
            Ok(())
        })
    }

    fn replace_task(&mut self, task: Task) -> Result<(), AppError> {
        self.modify(|state| {
            let slot = state
                .tasks
                .iter_mut()
                .find(|existing| existing.id == task.id)
                .ok_or_else(|| task_not_found(&task.id))?;
            *slot = task;
            Ok(())
        })
    }

    fn remove_task(&mut self, id: &str) -> Result<Task, AppError> {
        self.modify(|state| {
            let index = state
                .tasks
                .iter()
                .position(|task| task.id == id)
                .ok_or_else(|| task_not_found(id))?;
            Ok(state.tasks.remove(index))
        })
    }
}

impl ApplicationStore for JsonStore {
    fn applications(&self) -> Result<Vec<JobApplication>, AppError> {
        Ok(load_state(&self.path)?.applications)
    }

    fn insert_application(&mut self, application: JobApplication) -> Result<(), AppError> {
        self.modify(|state| {
            if state.applications.iter().any(|app| app.id == application.id) {
                return Err(AppError::invalid_data(format!(
                    "application '{}' already exists",
                    application.id
                )));
            }
            state.applications.push(application);
            Ok(())
        })
    }

    fn replace_application(&mut self, application: JobApplication) -> Result<(), AppError> {
        self.modify(|state| {
            let slot = state
                .applications
                .iter_mut()
                .find(|app| app.id == application.id)
                .ok_or_else(|| application_not_found(&application.id))?;
            *slot = application;
            Ok(())
        })
    }

    fn remove_application(&mut self, id: &str) -> Result<JobApplication, AppError> {
        self.modify(|state| {
            let index = state
                .applications
                .iter()
                .position(|app| app.id == id)
                .ok_or_else(|| application_not_found(id))?;
            Ok(state.applications.remove(index))
        })
    }
}
