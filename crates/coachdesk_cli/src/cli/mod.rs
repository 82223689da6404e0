use clap::{Parser, Subcommand, ValueEnum};
use coachdesk_core::config::{ConfigOverrides, canonicalize_key};
use coachdesk_core::error::AppError;

#[derive(Parser, Debug)]
#[command(name = "coachdesk", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage coaching tasks
    Task {
        #[command(subcommand)]
        task: TaskCommand,
    },
    /// Track job applications through the hiring pipeline
    App {
        #[command(subcommand)]
        app: AppCommand,
    },
    /// Show task counters and the application pipeline
    ///
    /// Example: coachdesk dashboard
    Dashboard,
    /// Send reminders for overdue, urgent and soon-due tasks
    ///
    /// Example: coachdesk notify
    /// Example: coachdesk notify --wait 0
    Notify {
        /// Seconds to stay alive so an "Open" click can launch the task view
        #[arg(long, value_name = "SECS", default_value_t = DEFAULT_ACTION_WAIT_SECS)]
        wait: u64,
    },
    /// List application statuses with their labels and colors
    ///
    /// Example: coachdesk statuses
    Statuses,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Create a task
    ///
    /// Example: coachdesk task add "Call client" --due 2025-01-10 --time 09:00
    /// Example: coachdesk task add "Weekly check-in" --due 2025-01-06 --recurring weekly
    Add {
        title: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
        /// Due time of day (HH:MM)
        #[arg(long, value_name = "HH:MM")]
        time: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        urgent: bool,
        /// Assign a job seeker; repeatable
        #[arg(long = "seeker", value_name = "ID[:NAME]")]
        seekers: Vec<String>,
        /// Reminder lead time such as 2h or 1d
        #[arg(long = "notify-before", value_name = "LEAD")]
        notify_before: Option<String>,
        /// daily, weekly, biweekly or monthly
        #[arg(long, value_name = "FREQUENCY")]
        recurring: Option<String>,
        /// Last date of the recurring series (YYYY-MM-DD)
        #[arg(long, value_name = "DATE", requires = "recurring")]
        until: Option<String>,
    },
    /// Edit fields of a task
    ///
    /// Example: coachdesk task edit task-1 --due 2025-01-12 --time 14:00
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
        #[arg(long, value_name = "HH:MM", conflicts_with = "clear_time")]
        time: Option<String>,
        /// Remove the due time so the task is due by the end of its day
        #[arg(long)]
        clear_time: bool,
        #[arg(long, value_enum)]
        priority: Option<PriorityArg>,
        /// Replace the assigned job seekers; repeatable
        #[arg(long = "seeker", value_name = "ID[:NAME]", conflicts_with = "clear_seekers")]
        seekers: Vec<String>,
        #[arg(long)]
        clear_seekers: bool,
        #[arg(long = "notify-before", value_name = "LEAD", conflicts_with = "clear_notify")]
        notify_before: Option<String>,
        #[arg(long)]
        clear_notify: bool,
        /// Change the frequency; an existing end date is kept
        #[arg(long, value_name = "FREQUENCY", conflicts_with = "no_recurring")]
        recurring: Option<String>,
        /// Change the end date of a recurring task
        #[arg(long, value_name = "DATE", conflicts_with_all = ["no_recurring", "clear_until"])]
        until: Option<String>,
        /// Remove the end date so the series repeats indefinitely
        #[arg(long, conflicts_with = "no_recurring")]
        clear_until: bool,
        /// Stop treating the task as recurring
        #[arg(long)]
        no_recurring: bool,
    },
    /// Mark a task completed
    ///
    /// Example: coachdesk task done task-1
    Done { id: String },
    /// Delete a task permanently
    ///
    /// Example: coachdesk task delete task-1
    Delete { id: String },
    /// Show details of a task
    ///
    /// Example: coachdesk task show task-1
    Show { id: String },
    /// List tasks, ordered by due date and time
    ///
    /// Example: coachdesk task list overdue
    /// Example: coachdesk task list --seeker seeker-7
    List {
        #[arg(value_enum, default_value_t = TaskBucket::All)]
        bucket: TaskBucket,
        /// Only tasks assigned to this job seeker
        #[arg(long, value_name = "ID")]
        seeker: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskBucket {
    All,
    Today,
    Overdue,
    Upcoming,
    Completed,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriorityArg {
    Default,
    Urgent,
}

#[derive(Subcommand, Debug)]
pub enum AppCommand {
    /// Record a new job application
    ///
    /// Example: coachdesk app add "Line Cook" "Harbor Diner" --source Indeed
    Add {
        title: String,
        company: String,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long, value_name = "ID[:NAME]")]
        seeker: Option<String>,
        /// Date applied (YYYY-MM-DD), defaults to today
        #[arg(long, value_name = "DATE")]
        applied: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Move an application to another status
    ///
    /// Example: coachdesk app status app-1 first-interview
    /// Example: coachdesk app status app-1 hired --start-date 2025-02-01 --job-title "Cook" --hours 32
    Status {
        id: String,
        status: String,
        #[arg(long, value_name = "DATE")]
        start_date: Option<String>,
        #[arg(long)]
        job_title: Option<String>,
        #[arg(long, value_name = "AMOUNT")]
        wage: Option<f64>,
        #[arg(long, value_name = "HOURS")]
        hours: Option<u32>,
    },
    /// Attach a success story to a hired application
    ///
    /// Example: coachdesk app story app-1 "Promoted to shift lead"
    Story { id: String, story: String },
    /// Replace the notes of an application
    Notes { id: String, notes: String },
    /// Delete an application
    Delete { id: String },
    /// Show details of an application
    Show { id: String },
    /// List applications, most recently updated first
    ///
    /// Example: coachdesk app list --status offered
    List {
        #[arg(long)]
        status: Option<String>,
    },
}

pub const DEFAULT_ACTION_WAIT_SECS: u64 = 30;

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    CoachName,
    CoachEmail,
    Alias(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field = canonicalize_key(field);
    if canonical_field.is_empty() {
        return Err("override key cannot be empty".to_string());
    }

    let target = match (canonical_field.as_str(), remainder) {
        ("theme", None) => ConfigOverrideTarget::Theme,
        ("theme", Some(_)) => return Err("theme override cannot have subfields".to_string()),
        ("coach", Some(sub)) => match canonicalize_key(sub).as_str() {
            "name" => ConfigOverrideTarget::CoachName,
            "email" => ConfigOverrideTarget::CoachEmail,
            other => return Err(format!("unknown coach field '{other}'")),
        },
        ("coach", None) => return Err("coach override requires name or email".to_string()),
        ("aliases" | "alias", _) => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            ConfigOverrideTarget::Alias(alias_name.to_string())
        }
        (other, _) => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)
            .map_err(|message| AppError::validation(format!("{CONFIG_OVERRIDE_FLAG}: {message}")))?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::CoachName => overrides.coach_name = Some(parsed.value),
            ConfigOverrideTarget::CoachEmail => overrides.coach_email = Some(parsed.value),
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, parsed.value);
            }
        }
    }
    Ok(overrides)
}
