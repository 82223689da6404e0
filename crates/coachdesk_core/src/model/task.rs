use super::people::SeekerRef;
use super::{calendar_date, time_of_day};
use serde::{Deserialize, Serialize};
use time::macros::time;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Due time assumed for tasks that only carry a date.
pub const END_OF_DAY: Time = time!(23:59:59);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "calendar_date")]
    pub due_date: Date,
    #[serde(default, with = "time_of_day::option")]
    pub due_time: Option<Time>,
    #[serde(default)]
    pub notify_before: Option<LeadTime>,
    #[serde(default)]
    pub assigned_seekers: Vec<SeekerRef>,
    #[serde(default)]
    pub priority: Priority,
    pub status: TaskStatus,
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub created_by: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
}

impl Task {
    /// The instant the task falls due, reading its wall-clock fields in `offset`.
    pub fn due_at(&self, offset: UtcOffset) -> OffsetDateTime {
        PrimitiveDateTime::new(self.due_date, self.due_time.unwrap_or(END_OF_DAY))
            .assume_offset(offset)
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    pub fn is_urgent(&self) -> bool {
        self.priority == Priority::Urgent
    }

    pub fn is_assigned_to(&self, seeker_id: &str) -> bool {
        self.assigned_seekers.iter().any(|seeker| seeker.id == seeker_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
    Overdue,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Default,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadUnit {
    Hours,
    Days,
}

/// How long before the due instant a reminder becomes relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadTime {
    pub value: u32,
    pub unit: LeadUnit,
}

impl LeadTime {
    pub fn hours(value: u32) -> Self {
        Self {
            value,
            unit: LeadUnit::Hours,
        }
    }

    pub fn days(value: u32) -> Self {
        Self {
            value,
            unit: LeadUnit::Days,
        }
    }

    pub fn duration(&self) -> Duration {
        match self.unit {
            LeadUnit::Hours => Duration::hours(i64::from(self.value)),
            LeadUnit::Days => Duration::days(i64::from(self.value)),
        }
    }

    /// Parses the short form used on the command line: `2h`, `1d`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim().to_ascii_lowercase();
        let (digits, unit) = if let Some(digits) = trimmed.strip_suffix('h') {
            (digits, LeadUnit::Hours)
        } else if let Some(digits) = trimmed.strip_suffix('d') {
            (digits, LeadUnit::Days)
        } else {
            return None;
        };
        let value = digits.trim().parse().ok()?;
        Some(Self { value, unit })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurringFrequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl RecurringFrequency {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "biweekly" => Some(Self::Biweekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

/// Series metadata. One task row stands for the whole series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: RecurringFrequency,
    #[serde(default, with = "calendar_date::option")]
    pub end_date: Option<Date>,
}
