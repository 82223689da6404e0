use crate::classify;
use crate::error::AppError;
use crate::model::{CoachIdentity, LeadTime, Priority, Recurrence, SeekerRef, Task, TaskStatus};
use crate::notify::{Notifier, activation_argument};
use crate::storage::{TaskStore, next_id, task_not_found};
use std::collections::HashSet;
use time::{Date, OffsetDateTime, Time};

/// Form data for a new task.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: Option<Date>,
    pub due_time: Option<Time>,
    pub notify_before: Option<LeadTime>,
    pub assigned_seekers: Vec<SeekerRef>,
    pub priority: Priority,
    pub recurrence: Option<Recurrence>,
}

/// Fields to change on an existing task. `None` leaves a field untouched; the
/// nested options clear the field when set to `Some(None)`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Date>,
    pub due_time: Option<Option<Time>>,
    pub notify_before: Option<Option<LeadTime>>,
    pub assigned_seekers: Option<Vec<SeekerRef>>,
    pub priority: Option<Priority>,
    pub recurrence: Option<Option<Recurrence>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn touches_schedule(&self) -> bool {
        self.due_date.is_some() || self.due_time.is_some()
    }
}

#[derive(Debug)]
pub struct NotificationOutcome {
    pub tasks: Vec<Task>,
    pub failures: Vec<NotificationFailure>,
}

#[derive(Debug)]
pub struct NotificationFailure {
    pub task_id: String,
    pub error: AppError,
}

pub fn create_task<S: TaskStore + ?Sized>(
    store: &mut S,
    input: NewTask,
    coach: &CoachIdentity,
    now: OffsetDateTime,
) -> Result<Task, AppError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(AppError::validation("title is required"));
    }
    let due_date = input
        .due_date
        .ok_or_else(|| AppError::validation("due date is required"))?;
    let created_by = coach
        .handle()
        .ok_or_else(|| AppError::validation("coach identity is required"))?
        .to_string();
    validate_lead_time(input.notify_before)?;
    validate_recurrence(input.recurrence, due_date)?;
    let assigned_seekers = normalize_seekers(input.assigned_seekers)?;

    let existing: HashSet<String> = store.tasks()?.into_iter().map(|task| task.id).collect();
    let task = Task {
        id: next_id("task", |id| existing.contains(id)),
        title: title.to_string(),
        description: input.description.trim().to_string(),
        due_date,
        due_time: input.due_time,
        notify_before: input.notify_before,
        assigned_seekers,
        priority: input.priority,
        status: TaskStatus::Pending,
        recurrence: input.recurrence,
        created_at: now,
        created_by,
        completed_at: None,
    };

    store.insert_task(task.clone())?;
    tracing::debug!(task_id = %task.id, due_date = %task.due_date, "task created");
    Ok(task)
}

pub fn get_task<S: TaskStore + ?Sized>(store: &S, id: &str) -> Result<Task, AppError> {
    let trimmed_id = required_id(id)?;
    store.task(trimmed_id)?.ok_or_else(|| task_not_found(trimmed_id))
}

/// Every task, ordered by due date then due time.
pub fn list_tasks<S: TaskStore + ?Sized>(store: &S) -> Result<Vec<Task>, AppError> {
    let mut tasks = store.tasks()?;
    classify::sort_by_due(&mut tasks);
    Ok(tasks)
}

pub fn update_task<S: TaskStore + ?Sized>(
    store: &mut S,
    id: &str,
    patch: TaskPatch,
    now: OffsetDateTime,
) -> Result<Task, AppError> {
    let trimmed_id = required_id(id)?;
    let mut task = store
        .task(trimmed_id)?
        .ok_or_else(|| task_not_found(trimmed_id))?;
    let reschedule = patch.touches_schedule();

    if let Some(title) = patch.title {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::validation("title is required"));
        }
        task.title = title.to_string();
    }
    if let Some(description) = patch.description {
        task.description = description.trim().to_string();
    }
    if let Some(due_date) = patch.due_date {
        task.due_date = due_date;
    }
    if let Some(due_time) = patch.due_time {
        task.due_time = due_time;
    }
    if let Some(notify_before) = patch.notify_before {
        validate_lead_time(notify_before)?;
        task.notify_before = notify_before;
    }
    if let Some(seekers) = patch.assigned_seekers {
        task.assigned_seekers = normalize_seekers(seekers)?;
    }
    if let Some(priority) = patch.priority {
        task.priority = priority;
    }
    if let Some(recurrence) = patch.recurrence {
        task.recurrence = recurrence;
    }
    validate_recurrence(task.recurrence, task.due_date)?;

    if reschedule && !task.is_completed() {
        task.status = if task.due_at(now.offset()) < now {
            TaskStatus::Overdue
        } else {
            TaskStatus::Pending
        };
    }

    store.replace_task(task.clone())?;
    tracing::debug!(task_id = %task.id, status = task.status.as_str(), "task updated");
    Ok(task)
}

/// Marks a task completed. Completing a completed task changes nothing.
pub fn complete_task<S: TaskStore + ?Sized>(
    store: &mut S,
    id: &str,
    now: OffsetDateTime,
) -> Result<Task, AppError> {
    let trimmed_id = required_id(id)?;
    let mut task = store
        .task(trimmed_id)?
        .ok_or_else(|| task_not_found(trimmed_id))?;

    if task.is_completed() {
        return Ok(task);
    }

    task.status = TaskStatus::Completed;
    task.completed_at = Some(now);
    store.replace_task(task.clone())?;
    tracing::debug!(task_id = %task.id, "task completed");
    Ok(task)
}

pub fn delete_task<S: TaskStore + ?Sized>(store: &mut S, id: &str) -> Result<Task, AppError> {
    let trimmed_id = required_id(id)?;
    let removed = store.remove_task(trimmed_id)?;
    tracing::debug!(task_id = %removed.id, "task deleted");
    Ok(removed)
}

/// Sends a reminder for every open task that is overdue, inside its
/// `notify_before` window, or urgent and due today.
pub fn notify_due_tasks<S: TaskStore + ?Sized>(
    store: &S,
    notifier: &dyn Notifier,
    now: OffsetDateTime,
) -> Result<NotificationOutcome, AppError> {
    let mut tasks = store.tasks()?;
    classify::sort_by_due(&mut tasks);
    let mut notified = Vec::new();
    let mut failures = Vec::new();

    for task in tasks {
        if !needs_reminder(&task, now) {
            continue;
        }

        let action = activation_argument(&task.id);
        match notifier.remind_with_action(&task, &action) {
            Ok(()) => notified.push(task),
            Err(err) => {
                tracing::warn!(task_id = %task.id, error = %err, "reminder failed");
                failures.push(NotificationFailure {
                    task_id: task.id,
                    error: err,
                });
            }
        }
    }

    Ok(NotificationOutcome {
        tasks: notified,
        failures,
    })
}

fn needs_reminder(task: &Task, now: OffsetDateTime) -> bool {
    classify::is_overdue(task, now)
        || classify::reminder_due(task, now)
        || (task.is_urgent() && classify::is_due_today(task, now))
}

fn required_id(id: &str) -> Result<&str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("id is required"));
    }
    Ok(trimmed)
}

fn validate_lead_time(lead: Option<LeadTime>) -> Result<(), AppError> {
    match lead {
        Some(lead) if lead.value == 0 => Err(AppError::validation(
            "notify_before must be a positive number",
        )),
        _ => Ok(()),
    }
}

fn validate_recurrence(recurrence: Option<Recurrence>, due_date: Date) -> Result<(), AppError> {
    match recurrence.and_then(|recurrence| recurrence.end_date) {
        Some(end_date) if end_date < due_date => Err(AppError::validation(
            "recurring end date must not precede the due date",
        )),
        _ => Ok(()),
    }
}

/// Trims seeker ids and drops repeats, keeping the first occurrence.
fn normalize_seekers(seekers: Vec<SeekerRef>) -> Result<Vec<SeekerRef>, AppError> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(seekers.len());
    for mut seeker in seekers {
        seeker.id = seeker.id.trim().to_string();
        if seeker.id.is_empty() {
            return Err(AppError::validation("seeker id is required"));
        }
        if seen.insert(seeker.id.clone()) {
            normalized.push(seeker);
        }
    }
    Ok(normalized)
}
