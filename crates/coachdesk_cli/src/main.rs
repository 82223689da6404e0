use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use coachdesk_cli::cli::{
    AppCommand, CONFIG_OVERRIDE_FLAG, Cli, Command, PriorityArg, TaskBucket, TaskCommand,
    collect_overrides,
};
use coachdesk_core::application_api::{self, NewApplication};
use coachdesk_core::classify;
use coachdesk_core::config::{self, Config, Palette};
use coachdesk_core::error::AppError;
use coachdesk_core::model::{
    ApplicationStatus, DATE_FORMAT, HireRequest, JobApplication, LeadTime, Priority, Recurrence,
    RecurringFrequency, SeekerRef, TIME_FORMAT, Task,
};
use coachdesk_core::notify;
use coachdesk_core::status;
use coachdesk_core::storage::JsonStore;
use coachdesk_core::task_api::{self, NewTask, NotificationOutcome, TaskPatch};
use serde_json::{Value, json};
use std::time::Duration;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::{Date, OffsetDateTime, Time};
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "COACHDESK_LOG";

struct Context {
    config: Config,
    palette: Palette,
    json: bool,
    now: OffsetDateTime,
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Seekers")]
    seekers: String,
}

#[derive(Tabled)]
struct ApplicationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Job")]
    job: String,
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Seeker")]
    seeker: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Applied")]
    applied: String,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Count")]
    count: String,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::validation(message)
}

/// Raw `--config-override` values, read before clap so aliases can come from them.
fn raw_overrides(args: &[String]) -> Vec<String> {
    let mut values = Vec::new();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == CONFIG_OVERRIDE_FLAG {
            if let Some(value) = iter.next() {
                values.push(value.clone());
            }
        } else if let Some(value) = arg
            .strip_prefix(CONFIG_OVERRIDE_FLAG)
            .and_then(|rest| rest.strip_prefix('='))
        {
            values.push(value.to_string());
        }
    }
    values
}

/// Replaces the first command word with its alias expansion, unless it names
/// a built-in command.
fn expand_alias(args: Vec<String>, config: &Config) -> Vec<String> {
    let mut index = 1;
    while let Some(arg) = args.get(index) {
        if arg == CONFIG_OVERRIDE_FLAG {
            index += 2;
        } else if arg.starts_with('-') {
            index += 1;
        } else {
            break;
        }
    }

    let Some(word) = args.get(index) else {
        return args;
    };
    let builtin = Cli::command()
        .get_subcommands()
        .any(|sub| sub.get_name() == word)
        || word == "help";
    if builtin {
        return args;
    }

    match config.expand_alias(word) {
        Some(expansion) => {
            let mut expanded = Vec::with_capacity(args.len() + expansion.len());
            expanded.extend_from_slice(&args[..index]);
            expanded.extend(expansion);
            expanded.extend_from_slice(&args[index + 1..]);
            expanded
        }
        None => args,
    }
}

fn parse_date(raw: &str, field: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), DATE_FORMAT)
        .map_err(|_| AppError::validation(format!("{field} must be YYYY-MM-DD, got '{raw}'")))
}

fn parse_time(raw: &str) -> Result<Time, AppError> {
    Time::parse(raw.trim(), TIME_FORMAT)
        .map_err(|_| AppError::validation(format!("time must be HH:MM, got '{raw}'")))
}

fn parse_lead_time(raw: &str) -> Result<LeadTime, AppError> {
    LeadTime::parse(raw).ok_or_else(|| {
        AppError::validation(format!("notify-before must look like 2h or 1d, got '{raw}'"))
    })
}

fn parse_recurrence(
    frequency: Option<&str>,
    until: Option<&str>,
) -> Result<Option<Recurrence>, AppError> {
    let Some(raw) = frequency else {
        return Ok(None);
    };
    let frequency = parse_frequency(raw)?;
    let end_date = until.map(|raw| parse_date(raw, "until")).transpose()?;
    Ok(Some(Recurrence {
        frequency,
        end_date,
    }))
}

fn parse_frequency(raw: &str) -> Result<RecurringFrequency, AppError> {
    RecurringFrequency::parse(raw)
        .ok_or_else(|| AppError::validation(format!("unknown frequency '{raw}'")))
}

/// Applies edit flags on top of the task's current series. Fields not named
/// by a flag keep their stored value.
fn merge_recurrence(
    current: Option<Recurrence>,
    frequency: Option<&str>,
    until: Option<&str>,
    clear_until: bool,
) -> Result<Recurrence, AppError> {
    let frequency = match frequency {
        Some(raw) => parse_frequency(raw)?,
        None => current.map(|series| series.frequency).ok_or_else(|| {
            AppError::validation("task is not recurring; pass --recurring to set a frequency")
        })?,
    };
    let end_date = match until {
        _ if clear_until => None,
        Some(raw) => Some(parse_date(raw, "until")?),
        None => current.and_then(|series| series.end_date),
    };
    Ok(Recurrence {
        frequency,
        end_date,
    })
}

fn parse_seeker(raw: &str) -> Result<SeekerRef, AppError> {
    let (id, name) = match raw.split_once(':') {
        Some((id, name)) => (id.trim(), name.trim()),
        None => (raw.trim(), ""),
    };
    if id.is_empty() {
        return Err(AppError::validation("seeker id is required"));
    }
    Ok(SeekerRef::new(id, if name.is_empty() { id } else { name }))
}

fn parse_seekers(raw: &[String]) -> Result<Vec<SeekerRef>, AppError> {
    raw.iter().map(|entry| parse_seeker(entry)).collect()
}

fn priority_from(arg: PriorityArg) -> Priority {
    match arg {
        PriorityArg::Default => Priority::Default,
        PriorityArg::Urgent => Priority::Urgent,
    }
}

fn format_due(task: &Task) -> String {
    let date = task
        .due_date
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| task.due_date.to_string());
    match task.due_time.and_then(|time| time.format(TIME_FORMAT).ok()) {
        Some(time) => format!("{date} {time}"),
        None => date,
    }
}

/// Stored status, with open tasks past their due instant reported as overdue.
fn task_state(task: &Task, now: OffsetDateTime) -> &'static str {
    if classify::is_overdue(task, now) {
        "overdue"
    } else {
        task.status.as_str()
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value)
        .map_err(|err| AppError::invalid_data(format!("failed to encode output: {err}")))
}

fn task_json(task: &Task, now: OffsetDateTime) -> Result<Value, AppError> {
    let mut value = to_json(task)?;
    if let Value::Object(map) = &mut value {
        map.insert("state".into(), Value::from(task_state(task, now)));
        map.insert(
            "overdue".into(),
            Value::from(classify::is_overdue(task, now)),
        );
    }
    Ok(value)
}

fn application_json(application: &JobApplication) -> Result<Value, AppError> {
    let mut value = to_json(application)?;
    if let Value::Object(map) = &mut value {
        map.insert(
            "status_label".into(),
            Value::from(status::info(application.status).label),
        );
    }
    Ok(value)
}

fn print_task(ctx: &Context, verb: &str, task: &Task) -> Result<(), AppError> {
    if ctx.json {
        println!("{}", task_json(task, ctx.now)?);
    } else {
        println!(
            "{verb} task: {} ({}) due {}",
            ctx.palette.accentize(&task.title),
            task.id,
            format_due(task)
        );
    }
    Ok(())
}

fn print_task_details(ctx: &Context, task: &Task) -> Result<(), AppError> {
    if ctx.json {
        println!("{}", task_json(task, ctx.now)?);
        return Ok(());
    }

    println!("{}", ctx.palette.accentize(&task.title));
    println!("  id:          {}", task.id);
    println!("  due:         {}", format_due(task));
    println!("  status:      {}", task_state(task, ctx.now));
    println!("  priority:    {}", priority_label(task.priority));
    if !task.description.is_empty() {
        println!("  description: {}", task.description);
    }
    if let Some(lead) = task.notify_before {
        println!("  reminder:    {} before", lead_label(lead));
    }
    if let Some(recurrence) = task.recurrence {
        let until = recurrence
            .end_date
            .map(|date| format!(" until {date}"))
            .unwrap_or_default();
        println!("  repeats:     {:?}{until}", recurrence.frequency);
    }
    if !task.assigned_seekers.is_empty() {
        println!("  seekers:     {}", seeker_names(&task.assigned_seekers));
    }
    println!("  created by:  {}", task.created_by);
    if let Some(completed_at) = task.completed_at {
        println!("  completed:   {completed_at}");
    }
    Ok(())
}

fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::Default => "default",
        Priority::Urgent => "urgent",
    }
}

fn lead_label(lead: LeadTime) -> String {
    let hours = lead.duration().whole_hours();
    if hours % 24 == 0 {
        format!("{}d", hours / 24)
    } else {
        format!("{hours}h")
    }
}

fn seeker_names(seekers: &[SeekerRef]) -> String {
    seekers
        .iter()
        .map(|seeker| seeker.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_tasks(ctx: &Context, tasks: &[&Task]) -> Result<(), AppError> {
    if ctx.json {
        let payload = tasks
            .iter()
            .map(|task| task_json(task, ctx.now))
            .collect::<Result<Vec<_>, _>>()?;
        println!("{}", Value::Array(payload));
        return Ok(());
    }

    if tasks.is_empty() {
        println!("{}", ctx.palette.mutedize("No tasks."));
        return Ok(());
    }

    let rows = tasks.iter().map(|task| TaskRow {
        id: task.id.clone(),
        title: task.title.clone(),
        due: format_due(task),
        status: task_state(task, ctx.now).to_string(),
        priority: priority_label(task.priority).to_string(),
        seekers: seeker_names(&task.assigned_seekers),
    });
    println!("{}", Table::new(rows).with(Style::sharp()));
    Ok(())
}

fn print_application(ctx: &Context, verb: &str, application: &JobApplication) -> Result<(), AppError> {
    if ctx.json {
        println!("{}", application_json(application)?);
    } else {
        println!(
            "{verb} application: {} at {} ({}) [{}]",
            ctx.palette.accentize(&application.job.title),
            application.job.company,
            application.id,
            ctx.palette.status_label(status::info(application.status))
        );
    }
    Ok(())
}

fn print_application_details(ctx: &Context, application: &JobApplication) -> Result<(), AppError> {
    if ctx.json {
        println!("{}", application_json(application)?);
        return Ok(());
    }

    println!(
        "{} at {}",
        ctx.palette.accentize(&application.job.title),
        application.job.company
    );
    println!("  id:       {}", application.id);
    println!(
        "  status:   {}",
        ctx.palette.status_label(status::info(application.status))
    );
    println!("  applied:  {}", application.applied_date);
    println!("  updated:  {}", application.last_updated);
    if let Some(seeker) = &application.seeker {
        println!("  seeker:   {} ({})", seeker.name, seeker.id);
    }
    if let Some(source) = &application.job.source {
        println!("  source:   {source}");
    }
    if let Some(url) = &application.job.url {
        println!("  url:      {url}");
    }
    if !application.notes.is_empty() {
        println!("  notes:    {}", application.notes);
    }
    if let Some(hired) = &application.hired {
        println!("  hired as: {} from {}", hired.job_title, hired.start_date);
        println!("  hours:    {} per week", hired.hours_per_week);
        if let Some(wage) = hired.hourly_wage {
            println!("  wage:     {wage:.2} per hour");
        }
        if let Some(story) = &hired.success_story {
            println!("  story:    {story}");
        }
    }
    Ok(())
}

fn print_applications(ctx: &Context, applications: &[JobApplication]) -> Result<(), AppError> {
    if ctx.json {
        let payload = applications
            .iter()
            .map(application_json)
            .collect::<Result<Vec<_>, _>>()?;
        println!("{}", Value::Array(payload));
        return Ok(());
    }

    if applications.is_empty() {
        println!("{}", ctx.palette.mutedize("No applications."));
        return Ok(());
    }

    let rows = applications.iter().map(|application| ApplicationRow {
        id: application.id.clone(),
        job: application.job.title.clone(),
        company: application.job.company.clone(),
        seeker: application
            .seeker
            .as_ref()
            .map(|seeker| seeker.name.clone())
            .unwrap_or_else(|| "-".to_string()),
        status: ctx.palette.status_label(status::info(application.status)),
        applied: application.applied_date.to_string(),
    });
    println!("{}", Table::new(rows).with(Style::sharp()));
    Ok(())
}

fn run_task(ctx: &Context, store: &mut JsonStore, command: TaskCommand) -> Result<(), AppError> {
    match command {
        TaskCommand::Add {
            title,
            due,
            time,
            description,
            urgent,
            seekers,
            notify_before,
            recurring,
            until,
        } => {
            let input = NewTask {
                title: title.unwrap_or_default(),
                description: description.unwrap_or_default(),
                due_date: due.as_deref().map(|raw| parse_date(raw, "due")).transpose()?,
                due_time: time.as_deref().map(parse_time).transpose()?,
                notify_before: notify_before.as_deref().map(parse_lead_time).transpose()?,
                assigned_seekers: parse_seekers(&seekers)?,
                priority: if urgent {
                    Priority::Urgent
                } else {
                    Priority::Default
                },
                recurrence: parse_recurrence(recurring.as_deref(), until.as_deref())?,
            };
            let task = task_api::create_task(store, input, &ctx.config.coach, ctx.now)?;
            print_task(ctx, "Added", &task)?;
        }
        TaskCommand::Edit {
            id,
            title,
            description,
            due,
            time,
            clear_time,
            priority,
            seekers,
            clear_seekers,
            notify_before,
            clear_notify,
            recurring,
            until,
            clear_until,
            no_recurring,
        } => {
            let recurrence = if no_recurring {
                Some(None)
            } else if recurring.is_some() || until.is_some() || clear_until {
                let current = task_api::get_task(store, &id)?.recurrence;
                Some(Some(merge_recurrence(
                    current,
                    recurring.as_deref(),
                    until.as_deref(),
                    clear_until,
                )?))
            } else {
                None
            };
            let patch = TaskPatch {
                title,
                description,
                due_date: due.as_deref().map(|raw| parse_date(raw, "due")).transpose()?,
                due_time: if clear_time {
                    Some(None)
                } else {
                    time.as_deref().map(parse_time).transpose()?.map(Some)
                },
                notify_before: if clear_notify {
                    Some(None)
                } else {
                    notify_before
                        .as_deref()
                        .map(parse_lead_time)
                        .transpose()?
                        .map(Some)
                },
                assigned_seekers: if clear_seekers {
                    Some(Vec::new())
                } else if seekers.is_empty() {
                    None
                } else {
                    Some(parse_seekers(&seekers)?)
                },
                priority: priority.map(priority_from),
                recurrence,
            };
            if patch.is_empty() {
                return Err(AppError::validation("nothing to update"));
            }
            let task = task_api::update_task(store, &id, patch, ctx.now)?;
            print_task(ctx, "Updated", &task)?;
        }
        TaskCommand::Done { id } => {
            let task = task_api::complete_task(store, &id, ctx.now)?;
            print_task(ctx, "Completed", &task)?;
        }
        TaskCommand::Delete { id } => {
            let task = task_api::delete_task(store, &id)?;
            print_task(ctx, "Deleted", &task)?;
        }
        TaskCommand::Show { id } => {
            let task = task_api::get_task(store, &id)?;
            print_task_details(ctx, &task)?;
        }
        TaskCommand::List { bucket, seeker } => {
            let mut tasks = task_api::list_tasks(store)?;
            if let Some(seeker_id) = seeker.as_deref().map(str::trim) {
                tasks = classify::for_seeker(&tasks, seeker_id)
                    .into_iter()
                    .cloned()
                    .collect();
            }
            let mut selected = match bucket {
                TaskBucket::All => tasks.iter().collect(),
                TaskBucket::Today => classify::due_today(&tasks, ctx.now),
                TaskBucket::Overdue => classify::overdue(&tasks, ctx.now),
                TaskBucket::Upcoming => classify::upcoming(&tasks, ctx.now),
                TaskBucket::Completed => classify::completed(&tasks),
            };
            classify::sort_by_due(&mut selected);
            print_tasks(ctx, &selected)?;
        }
    }
    Ok(())
}

fn run_app(ctx: &Context, store: &mut JsonStore, command: AppCommand) -> Result<(), AppError> {
    match command {
        AppCommand::Add {
            title,
            company,
            source,
            url,
            seeker,
            applied,
            notes,
        } => {
            let input = NewApplication {
                job_title: title,
                company,
                source,
                url,
                seeker: seeker.as_deref().map(parse_seeker).transpose()?,
                applied_date: applied
                    .as_deref()
                    .map(|raw| parse_date(raw, "applied"))
                    .transpose()?,
                notes: notes.unwrap_or_default(),
            };
            let application = application_api::create_application(store, input, ctx.now)?;
            print_application(ctx, "Added", &application)?;
        }
        AppCommand::Status {
            id,
            status,
            start_date,
            job_title,
            wage,
            hours,
        } => {
            let new_status: ApplicationStatus = status.parse()?;
            let start_date = start_date
                .as_deref()
                .map(|raw| parse_date(raw, "start date"))
                .transpose()?;
            let hire = if start_date.is_none()
                && job_title.is_none()
                && wage.is_none()
                && hours.is_none()
            {
                None
            } else {
                Some(HireRequest {
                    start_date,
                    job_title,
                    hourly_wage: wage,
                    hours_per_week: hours,
                })
            };

            let notifier = notify::notifier_from_env()?;
            let outcome = application_api::transition_application(
                store,
                &id,
                new_status,
                hire,
                notifier.as_ref(),
                ctx.now,
            )?;

            if ctx.json {
                let mut value = application_json(&outcome.application)?;
                if let Value::Object(map) = &mut value {
                    map.insert("previous_status".into(), Value::from(outcome.previous.as_str()));
                    map.insert(
                        "celebration_error".into(),
                        outcome
                            .celebration_error
                            .as_ref()
                            .map(|err| Value::from(err.to_string()))
                            .unwrap_or(Value::Null),
                    );
                }
                println!("{value}");
            } else {
                print_application(ctx, "Updated", &outcome.application)?;
                if outcome.application.status == ApplicationStatus::Hired {
                    println!("{}", notify::celebration_body(&outcome.application));
                }
                if let Some(err) = &outcome.celebration_error {
                    eprintln!("WARNING: celebration not shown: {err}");
                }
            }
        }
        AppCommand::Story { id, story } => {
            let application = application_api::record_success_story(store, &id, &story, ctx.now)?;
            print_application(ctx, "Updated", &application)?;
        }
        AppCommand::Notes { id, notes } => {
            let application = application_api::update_notes(store, &id, &notes, ctx.now)?;
            print_application(ctx, "Updated", &application)?;
        }
        AppCommand::Delete { id } => {
            let application = application_api::delete_application(store, &id)?;
            print_application(ctx, "Deleted", &application)?;
        }
        AppCommand::Show { id } => {
            let application = application_api::get_application(store, &id)?;
            print_application_details(ctx, &application)?;
        }
        AppCommand::List { status } => {
            let filter = status
                .as_deref()
                .map(str::parse::<ApplicationStatus>)
                .transpose()?;
            let mut applications = application_api::list_applications(store)?;
            if let Some(filter) = filter {
                applications.retain(|application| application.status == filter);
            }
            print_applications(ctx, &applications)?;
        }
    }
    Ok(())
}

fn run_dashboard(ctx: &Context, store: &JsonStore) -> Result<(), AppError> {
    let tasks = task_api::list_tasks(store)?;
    let summary = classify::summarize(&tasks, ctx.now);
    let applications = application_api::list_applications(store)?;
    let counts = application_api::pipeline_counts(&applications);

    if ctx.json {
        let pipeline: Vec<Value> = counts
            .iter()
            .map(|(status, count)| {
                json!({
                    "status": status.as_str(),
                    "label": status::info(*status).label,
                    "count": count,
                })
            })
            .collect();
        println!(
            "{}",
            json!({ "tasks": to_json(&summary)?, "pipeline": pipeline })
        );
        return Ok(());
    }

    println!(
        "{} {} total, {} due today, {} overdue, {} upcoming, {} completed, {} urgent",
        ctx.palette.accentize("Tasks:"),
        summary.total,
        summary.due_today,
        summary.overdue,
        summary.upcoming,
        summary.completed,
        summary.urgent
    );
    println!("{}", ctx.palette.accentize("Pipeline:"));
    let rows = counts.iter().map(|(status, count)| {
        let info = status::info(*status);
        StatusRow {
            key: info.key.to_string(),
            label: ctx.palette.status_label(info),
            color: info.color.to_string(),
            count: count.to_string(),
        }
    });
    println!("{}", Table::new(rows).with(Style::sharp()));
    Ok(())
}

fn run_notify(ctx: &Context, store: &JsonStore, wait: Duration) -> Result<(), AppError> {
    let notifier = notify::notifier_from_env()?;
    let outcome = task_api::notify_due_tasks(store, notifier.as_ref(), ctx.now)?;
    report_notifications(ctx, &outcome)?;

    let unanswered = notifier.wait_for_actions(wait);
    if unanswered > 0 {
        tracing::debug!(unanswered, "exiting with reminder actions still open");
    }
    Ok(())
}

fn report_notifications(ctx: &Context, outcome: &NotificationOutcome) -> Result<(), AppError> {
    if ctx.json {
        let failures: Vec<Value> = outcome
            .failures
            .iter()
            .map(|failure| json!({ "task_id": failure.task_id, "error": failure.error.to_string() }))
            .collect();
        let notified: Vec<&str> = outcome.tasks.iter().map(|task| task.id.as_str()).collect();
        println!("{}", json!({ "notified": notified, "failures": failures }));
        return Ok(());
    }

    for task in &outcome.tasks {
        println!("Reminded: {}", notify::reminder_body(task));
    }
    for failure in &outcome.failures {
        eprintln!("WARNING: reminder for {} failed: {}", failure.task_id, failure.error);
    }
    println!("Sent {} reminder(s)", outcome.tasks.len());
    Ok(())
}

fn run_statuses(ctx: &Context) -> Result<(), AppError> {
    if ctx.json {
        println!("{}", to_json(status::pipeline())?);
        return Ok(());
    }

    let rows = status::pipeline().iter().map(|info| StatusRow {
        key: info.key.to_string(),
        label: ctx.palette.status_label(info),
        color: info.color.to_string(),
        count: "-".to_string(),
    });
    println!("{}", Table::new(rows).with(Style::sharp()));
    Ok(())
}

fn run_command(cli: Cli, config: Config) -> Result<(), AppError> {
    let palette = config::palette_for_theme(config.theme.as_deref());
    let ctx = Context {
        config,
        palette,
        json: cli.json,
        now: coachdesk_core::local_now(),
    };

    match cli.command {
        Command::Statuses => run_statuses(&ctx),
        Command::Task { task } => run_task(&ctx, &mut open_store()?, task),
        Command::App { app } => run_app(&ctx, &mut open_store()?, app),
        Command::Dashboard => run_dashboard(&ctx, &open_store()?),
        Command::Notify { wait } => run_notify(&ctx, &open_store()?, Duration::from_secs(wait)),
    }
}

fn open_store() -> Result<JsonStore, AppError> {
    let store = JsonStore::from_env()?;
    tracing::debug!(path = %store.path().display(), "using store");
    Ok(store)
}

fn load_config(args: &[String]) -> Result<Config, AppError> {
    let overrides = collect_overrides(&raw_overrides(args))?;
    let loaded = config::load_config_with_fallback();
    Ok(config::merge_overrides(&loaded.config, &overrides))
}

fn exit_with(err: AppError) -> ! {
    eprintln!("ERROR: {err}");
    std::process::exit(if err.is_caller_error() { 1 } else { 2 });
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => exit_with(err),
    };
    let args = expand_alias(args, &config);

    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => exit_with(normalize_parse_error(err)),
    };

    if let Err(err) = run_command(cli, config) {
        exit_with(err);
    }
}
