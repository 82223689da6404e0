use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};
use time::{Duration, OffsetDateTime};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("coachdesk-{nanos}-{file_name}"))
}

fn coachdesk(store_path: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_coachdesk"))
        .args(["--config-override", "coach.name=Robin"])
        .args(args)
        .env("COACHDESK_STORE_PATH", store_path)
        .env("COACHDESK_CONFIG_PATH", temp_path("absent-config.json"))
        .env("COACHDESK_DISABLE_NOTIFICATIONS", "1")
        .output()
        .expect("failed to run coachdesk")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout json")
}

fn add_task(store_path: &Path, title: &str, due: &str, extra: &[&str]) -> String {
    let mut args = vec!["task", "add", title, "--due", due, "--json"];
    args.extend_from_slice(extra);
    let added = stdout_json(&coachdesk(store_path, &args));
    added["id"].as_str().unwrap().to_string()
}

fn titles(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .expect("task array")
        .iter()
        .map(|task| task["title"].as_str().unwrap().to_string())
        .collect()
}

/// Store with one task in each bucket. Returns the id of the completed one.
fn seed(store_path: &Path) -> String {
    let soon = (OffsetDateTime::now_utc() + Duration::days(2))
        .date()
        .to_string();

    add_task(store_path, "Far future", "2999-01-01", &["--seeker", "s-1"]);
    add_task(store_path, "Missed call", "2000-01-01", &["--time", "10:00"]);
    add_task(store_path, "Missed email", "2000-01-01", &["--time", "08:00", "--seeker", "s-1"]);
    add_task(store_path, "Coming up", &soon, &[]);
    let done = add_task(store_path, "Finished", "2001-05-05", &[]);
    stdout_json(&coachdesk(store_path, &["task", "done", &done, "--json"]));
    done
}

#[test]
fn list_all_sorts_by_due_date_then_time() {
    let store_path = temp_path("cli-list-all.json");
    seed(&store_path);

    let all = stdout_json(&coachdesk(&store_path, &["task", "list", "--json"]));
    std::fs::remove_file(&store_path).ok();

    assert_eq!(
        titles(&all),
        vec!["Missed email", "Missed call", "Finished", "Coming up", "Far future"]
    );
}

#[test]
fn list_buckets_select_matching_tasks() {
    let store_path = temp_path("cli-list-buckets.json");
    seed(&store_path);

    let overdue = stdout_json(&coachdesk(&store_path, &["task", "list", "overdue", "--json"]));
    let completed = stdout_json(&coachdesk(
        &store_path,
        &["task", "list", "completed", "--json"],
    ));
    let upcoming = stdout_json(&coachdesk(&store_path, &["task", "list", "upcoming", "--json"]));
    std::fs::remove_file(&store_path).ok();

    assert_eq!(titles(&overdue), vec!["Missed email", "Missed call"]);
    assert!(
        overdue
            .as_array()
            .unwrap()
            .iter()
            .all(|task| task["overdue"] == true)
    );
    assert_eq!(titles(&completed), vec!["Finished"]);
    assert_eq!(titles(&upcoming), vec!["Coming up"]);
}

#[test]
fn list_filters_by_seeker() {
    let store_path = temp_path("cli-list-seeker.json");
    seed(&store_path);

    let mine = stdout_json(&coachdesk(
        &store_path,
        &["task", "list", "--seeker", "s-1", "--json"],
    ));
    let mine_overdue = stdout_json(&coachdesk(
        &store_path,
        &["task", "list", "overdue", "--seeker", "s-1", "--json"],
    ));
    std::fs::remove_file(&store_path).ok();

    assert_eq!(titles(&mine), vec!["Missed email", "Far future"]);
    assert_eq!(titles(&mine_overdue), vec!["Missed email"]);
}

#[test]
fn plain_list_renders_table() {
    let store_path = temp_path("cli-list-plain.json");
    seed(&store_path);

    let output = coachdesk(&store_path, &["task", "list", "overdue"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Title"));
    assert!(stdout.contains("Missed call"));
    assert!(stdout.contains("2000-01-01 10:00"));
    assert!(!stdout.contains("Far future"));
}

#[test]
fn alias_from_override_expands_first_word() {
    let store_path = temp_path("cli-list-alias.json");
    seed(&store_path);

    let output = coachdesk(
        &store_path,
        &[
            "--config-override",
            "aliases.late=task list overdue",
            "late",
            "--json",
        ],
    );
    std::fs::remove_file(&store_path).ok();

    assert_eq!(
        titles(&stdout_json(&output)),
        vec!["Missed email", "Missed call"]
    );
}

#[test]
fn dashboard_summarizes_tasks_and_pipeline() {
    let store_path = temp_path("cli-dashboard.json");
    seed(&store_path);
    stdout_json(&coachdesk(
        &store_path,
        &["app", "add", "Line Cook", "Harbor Diner", "--json"],
    ));

    let dashboard = stdout_json(&coachdesk(&store_path, &["dashboard", "--json"]));
    std::fs::remove_file(&store_path).ok();

    assert_eq!(dashboard["tasks"]["total"], 5);
    assert_eq!(dashboard["tasks"]["overdue"], 2);
    assert_eq!(dashboard["tasks"]["completed"], 1);
    assert_eq!(dashboard["tasks"]["upcoming"], 1);

    let pipeline = dashboard["pipeline"].as_array().expect("pipeline array");
    assert_eq!(pipeline.len(), 7);
    assert_eq!(pipeline[0]["status"], "applied");
    assert_eq!(pipeline[0]["count"], 1);
    assert_eq!(pipeline[5]["count"], 0);
}

#[test]
fn notify_reminds_overdue_tasks_only() {
    let store_path = temp_path("cli-notify.json");
    let done = seed(&store_path);

    let outcome = stdout_json(&coachdesk(&store_path, &["notify", "--json"]));
    std::fs::remove_file(&store_path).ok();

    let notified: Vec<&str> = outcome["notified"]
        .as_array()
        .expect("notified array")
        .iter()
        .map(|id| id.as_str().unwrap())
        .collect();
    assert_eq!(notified.len(), 2);
    assert!(!notified.contains(&done.as_str()));
    assert_eq!(outcome["failures"].as_array().map(Vec::len), Some(0));
}

#[test]
fn notify_wait_returns_at_once_when_nothing_is_clickable() {
    let store_path = temp_path("cli-notify-wait.json");
    seed(&store_path);

    let started = std::time::Instant::now();
    let outcome = stdout_json(&coachdesk(&store_path, &["notify", "--wait", "20", "--json"]));
    let elapsed = started.elapsed();
    std::fs::remove_file(&store_path).ok();

    assert_eq!(outcome["notified"].as_array().map(Vec::len), Some(2));
    assert!(elapsed < std::time::Duration::from_secs(10));
}
