use crate::error::AppError;
use crate::model::{JobApplication, Task};
use crate::notify::{
    APP_NAME, Notifier, PendingActions, celebration_body, launch_show, parse_activation_argument,
    reminder_body,
};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tauri_winrt_notification::Toast;

#[derive(Debug, Default)]
pub struct WindowsNotifier {
    pending: PendingActions,
}

impl Notifier for WindowsNotifier {
    fn remind(&self, task: &Task) -> Result<(), AppError> {
        self.remind_with_action(task, "")
    }

    fn remind_with_action(&self, task: &Task, action: &str) -> Result<(), AppError> {
        let task_id = task.id.clone();
        let action_value = action.to_string();
        let mut toast = Toast::new(Toast::POWERSHELL_APP_ID)
            .title(APP_NAME)
            .text1(&reminder_body(task))
            .text2(&task.id);

        if !action_value.trim().is_empty() {
            toast = toast.add_button("Open", &action_value);
        }
        let settled = self.pending.track();

        toast
            .on_activated(move |args| {
                let target = match args.as_deref() {
                    Some(args) if args == action_value || args.trim().is_empty() => {
                        Some(task_id.clone())
                    }
                    Some(args) => parse_activation_argument(args),
                    None => Some(task_id.clone()),
                };
                if let Some(id) = target
                    && let Err(err) = launch_show(&id)
                {
                    tracing::warn!(task_id = %id, error = %err, "failed to open task");
                }
                settled.store(true, Ordering::Release);
                Ok(())
            })
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }

    fn celebrate(&self, application: &JobApplication) -> Result<(), AppError> {
        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(APP_NAME)
            .text1("New hire")
            .text2(&celebration_body(application))
            .show()
            .map_err(|err| AppError::io(err.to_string()))
    }

    fn wait_for_actions(&self, timeout: Duration) -> usize {
        self.pending.wait(timeout)
    }
}
