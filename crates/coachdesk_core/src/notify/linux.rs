use crate::error::AppError;
use crate::model::{JobApplication, Task};
use crate::notify::{
    APP_NAME, Notifier, PendingActions, celebration_body, launch_show, reminder_body,
};
use notify_rust::Notification;
use std::sync::atomic::Ordering;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct LinuxNotifier {
    pending: PendingActions,
}

impl Notifier for LinuxNotifier {
    fn remind(&self, task: &Task) -> Result<(), AppError> {
        self.remind_with_action(task, "")
    }

    fn remind_with_action(&self, task: &Task, action: &str) -> Result<(), AppError> {
        let mut notification = Notification::new();
        notification.summary(&format!("{APP_NAME}: task reminder"));
        notification.body(&reminder_body(task));
        if !action.trim().is_empty() {
            notification.action(action, "Open");
        }

        let handle = notification
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;

        if !action.trim().is_empty() {
            let action_key = action.to_string();
            let task_id = task.id.clone();
            let settled = self.pending.track();
            // Returns when the action fires or the server closes the notification.
            std::thread::spawn(move || {
                handle.wait_for_action(|selected| {
                    if (selected == action_key || selected == "default")
                        && let Err(err) = launch_show(&task_id)
                    {
                        tracing::warn!(task_id = %task_id, error = %err, "failed to open task");
                    }
                });
                settled.store(true, Ordering::Release);
            });
        }

        Ok(())
    }

    fn celebrate(&self, application: &JobApplication) -> Result<(), AppError> {
        Notification::new()
            .summary(&format!("{APP_NAME}: new hire"))
            .body(&celebration_body(application))
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }

    fn wait_for_actions(&self, timeout: Duration) -> usize {
        self.pending.wait(timeout)
    }
}
