//! Time buckets for the task list and the dashboard widgets.
//!
//! Buckets are always derived from `due_date`/`due_time` against the supplied
//! `now`. The stored `status` only matters for `completed`, which removes a task
//! from every time bucket, and for `upcoming`, which only considers `pending`.

use crate::model::{END_OF_DAY, Task, TaskStatus};
use serde::Serialize;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, Time};

/// Days after today still counted as upcoming.
pub const UPCOMING_WINDOW_DAYS: i64 = 3;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub total: usize,
    pub due_today: usize,
    pub overdue: usize,
    pub upcoming: usize,
    pub completed: usize,
    pub urgent: usize,
}

pub fn due_today(tasks: &[Task], now: OffsetDateTime) -> Vec<&Task> {
    tasks.iter().filter(|task| is_due_today(task, now)).collect()
}

pub fn overdue(tasks: &[Task], now: OffsetDateTime) -> Vec<&Task> {
    tasks.iter().filter(|task| is_overdue(task, now)).collect()
}

pub fn upcoming(tasks: &[Task], now: OffsetDateTime) -> Vec<&Task> {
    tasks.iter().filter(|task| is_upcoming(task, now)).collect()
}

pub fn completed(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|task| task.is_completed()).collect()
}

pub fn for_seeker<'a>(tasks: &'a [Task], seeker_id: &str) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| task.is_assigned_to(seeker_id))
        .collect()
}

pub fn is_due_today(task: &Task, now: OffsetDateTime) -> bool {
    !task.is_completed() && task.due_date == now.date()
}

pub fn is_overdue(task: &Task, now: OffsetDateTime) -> bool {
    !task.is_completed() && task.due_at(now.offset()) < now
}

/// Pending tasks whose due day starts within the next three days.
///
/// The due day is compared at its start, so a task due later today counts as
/// due today rather than upcoming once the day has begun.
pub fn is_upcoming(task: &Task, now: OffsetDateTime) -> bool {
    if task.status != TaskStatus::Pending {
        return false;
    }
    let day_start =
        PrimitiveDateTime::new(task.due_date, Time::MIDNIGHT).assume_offset(now.offset());
    if day_start < now {
        return false;
    }
    match now.checked_add(Duration::days(UPCOMING_WINDOW_DAYS)) {
        Some(horizon) => day_start <= horizon,
        None => true,
    }
}

/// True once a pending task's `notify_before` lead window has opened.
pub fn reminder_due(task: &Task, now: OffsetDateTime) -> bool {
    if task.is_completed() {
        return false;
    }
    let Some(lead) = task.notify_before else {
        return false;
    };
    let due = task.due_at(now.offset());
    match due.checked_sub(lead.duration()) {
        Some(opens_at) => opens_at <= now,
        None => true,
    }
}

/// Ascending by due date, then due time. Tasks without a time sort last within their day.
pub fn sort_by_due<T: AsRef<Task>>(tasks: &mut [T]) {
    tasks.sort_by_key(|task| {
        let task = task.as_ref();
        (task.due_date, task.due_time.unwrap_or(END_OF_DAY))
    });
}

pub fn summarize(tasks: &[Task], now: OffsetDateTime) -> TaskSummary {
    tasks.iter().fold(
        TaskSummary {
            total: tasks.len(),
            ..TaskSummary::default()
        },
        |mut summary, task| {
            if is_due_today(task, now) {
                summary.due_today += 1;
            }
            if is_overdue(task, now) {
                summary.overdue += 1;
            }
            if is_upcoming(task, now) {
                summary.upcoming += 1;
            }
            if task.is_completed() {
                summary.completed += 1;
            } else if task.is_urgent() {
                summary.urgent += 1;
            }
            summary
        },
    )
}

impl AsRef<Task> for Task {
    fn as_ref(&self) -> &Task {
        self
    }
}
