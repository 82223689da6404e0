use crate::error::AppError;
use crate::model::{JobApplication, Task};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

const APP_NAME: &str = "coachdesk";
const DISABLE_ENV_VAR: &str = "COACHDESK_DISABLE_NOTIFICATIONS";
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Desktop notification sink for task reminders and hire celebrations.
pub trait Notifier {
    fn remind(&self, task: &Task) -> Result<(), AppError>;

    fn remind_with_action(&self, task: &Task, action: &str) -> Result<(), AppError> {
        let _ = action;
        self.remind(task)
    }

    fn celebrate(&self, application: &JobApplication) -> Result<(), AppError>;

    /// Blocks until click handlers registered by `remind_with_action` have
    /// settled or `timeout` elapsed. Returns how many are still waiting.
    fn wait_for_actions(&self, timeout: Duration) -> usize {
        let _ = timeout;
        0
    }
}

/// Click handlers that outlive the call which showed their notification.
#[derive(Debug, Default)]
pub struct PendingActions {
    flags: Mutex<Vec<Arc<AtomicBool>>>,
}

impl PendingActions {
    /// Registers a handler. Set the returned flag once it has run or given up.
    pub fn track(&self) -> Arc<AtomicBool> {
        let flag = Arc::new(AtomicBool::new(false));
        if let Ok(mut flags) = self.flags.lock() {
            flags.push(Arc::clone(&flag));
        }
        flag
    }

    pub fn outstanding(&self) -> usize {
        self.flags
            .lock()
            .map(|flags| {
                flags
                    .iter()
                    .filter(|flag| !flag.load(Ordering::Acquire))
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn wait(&self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = self.outstanding();
            let left = deadline.saturating_duration_since(Instant::now());
            if remaining == 0 || left.is_zero() {
                return remaining;
            }
            std::thread::sleep(POLL_INTERVAL.min(left));
        }
    }
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn remind(&self, _task: &Task) -> Result<(), AppError> {
        Ok(())
    }

    fn celebrate(&self, _application: &JobApplication) -> Result<(), AppError> {
        Ok(())
    }
}

/// Any value other than empty, `0`, `false`, `no` or `off` disables notifications.
pub fn disabled_by(value: Option<&str>) -> bool {
    match value.map(|raw| raw.trim().to_ascii_lowercase()) {
        None => false,
        Some(flag) => !matches!(flag.as_str(), "" | "0" | "false" | "no" | "off"),
    }
}

pub fn notifier_from_env() -> Result<Box<dyn Notifier>, AppError> {
    if disabled_by(std::env::var(DISABLE_ENV_VAR).ok().as_deref()) {
        return Ok(Box::new(NoopNotifier));
    }

    match platform_notifier() {
        Ok(notifier) => Ok(notifier),
        Err(err) => match err {
            AppError::InvalidData(_) => {
                tracing::debug!(error = %err, "desktop notifications unavailable");
                Ok(Box::new(NoopNotifier))
            }
            other => Err(other),
        },
    }
}

pub fn reminder_body(task: &Task) -> String {
    let due_time = task
        .due_time
        .and_then(|time| time.format(crate::model::TIME_FORMAT).ok());
    match due_time {
        Some(due_time) => format!("{} (due {} {})", task.title, task.due_date, due_time),
        None => format!("{} (due {})", task.title, task.due_date),
    }
}

pub fn celebration_body(application: &JobApplication) -> String {
    let who = application
        .seeker
        .as_ref()
        .map(|seeker| seeker.name.as_str())
        .unwrap_or("Your client");
    let title = application
        .hired
        .as_ref()
        .map(|hired| hired.job_title.as_str())
        .unwrap_or(application.job.title.as_str());
    format!("{who} was hired as {title} at {}!", application.job.company)
}

const ACTION_PREFIX: &str = "show:";

pub fn activation_argument(task_id: &str) -> String {
    format!("{ACTION_PREFIX}{task_id}")
}

pub fn parse_activation_argument(argument: &str) -> Option<String> {
    argument
        .strip_prefix(ACTION_PREFIX)
        .map(|id| id.to_string())
}

/// Opens the task in a fresh `coachdesk task show <id>` process.
pub fn launch_show(task_id: &str) -> Result<(), AppError> {
    let exe = std::env::current_exe().map_err(|err| AppError::io(err.to_string()))?;
    std::process::Command::new(exe)
        .args(["task", "show", task_id])
        .spawn()
        .map_err(|err| AppError::io(err.to_string()))?;
    Ok(())
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier::default()))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier::default()))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}
