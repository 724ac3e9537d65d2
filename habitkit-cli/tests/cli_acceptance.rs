use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_data: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_data = base.join("xdg-data");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_data).expect("failed to create XDG_DATA_HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
        }
    }

    fn db_path(&self) -> PathBuf {
        self.xdg_data.join("habitkit/data.db")
    }
}

fn run(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("habitkit"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_DATA_HOME", &env.xdg_data)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute habitkit: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "habitkit {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

/// Pull the habit id out of the `add` confirmation line:
/// `Created habit Read (5b0f...)`
fn parse_habit_id(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let start = stdout.rfind('(').expect("no '(' in add output");
    let end = stdout.rfind(')').expect("no ')' in add output");
    stdout[start + 1..end].to_string()
}

#[test]
fn add_checkin_stats_flow() {
    let env = CliTestEnv::new();

    let add = run(&env, &["add", "Read", "--description", "Ten pages a day"]);
    assert_success(&["add", "Read"], &add);
    let habit_id = parse_habit_id(&add);

    assert!(
        env.db_path().exists(),
        "database file should exist at {}",
        env.db_path().display()
    );

    let list = run(&env, &["list"]);
    assert_success(&["list"], &list);
    let list_stdout = String::from_utf8_lossy(&list.stdout);
    assert!(list_stdout.contains("Read"));
    assert!(list_stdout.contains(&habit_id));

    let checkin = run(&env, &["checkin", &habit_id]);
    assert_success(&["checkin"], &checkin);
    let checkin_stdout = String::from_utf8_lossy(&checkin.stdout);
    assert!(
        checkin_stdout.contains("Streak started"),
        "expected first check-in confirmation, got:\n{checkin_stdout}"
    );

    let stats = run(&env, &["stats", "--export", "json"]);
    assert_success(&["stats", "--export", "json"], &stats);
    let summary: serde_json::Value =
        serde_json::from_slice(&stats.stdout).expect("stats --export json should emit JSON");
    assert_eq!(summary["active_habits"], 1);
    assert_eq!(summary["best_streak"], 1);
    assert_eq!(summary["total_check_ins"], 1);
}

#[test]
fn duplicate_checkin_fails_without_double_counting() {
    let env = CliTestEnv::new();

    let add = run(&env, &["add", "Run"]);
    assert_success(&["add", "Run"], &add);
    let habit_id = parse_habit_id(&add);

    let first = run(&env, &["checkin", &habit_id]);
    assert_success(&["checkin"], &first);

    let second = run(&env, &["checkin", &habit_id]);
    assert!(
        !second.status.success(),
        "second check-in on the same date should fail"
    );
    let stderr = String::from_utf8_lossy(&second.stderr);
    assert!(
        stderr.contains("already checked in"),
        "expected duplicate check-in error, got:\n{stderr}"
    );

    let stats = run(&env, &["stats", "--export", "json"]);
    assert_success(&["stats", "--export", "json"], &stats);
    let summary: serde_json::Value =
        serde_json::from_slice(&stats.stdout).expect("stats JSON");
    assert_eq!(summary["total_check_ins"], 1);
}

#[test]
fn stats_survive_habit_deletion() {
    let env = CliTestEnv::new();

    let add = run(&env, &["add", "Meditate"]);
    assert_success(&["add", "Meditate"], &add);
    let habit_id = parse_habit_id(&add);

    let checkin = run(&env, &["checkin", &habit_id]);
    assert_success(&["checkin"], &checkin);

    let rm = run(&env, &["rm", &habit_id]);
    assert_success(&["rm"], &rm);

    let history = run(&env, &["history", &habit_id]);
    assert!(
        !history.status.success(),
        "history for a deleted habit should fail"
    );
    let stderr = String::from_utf8_lossy(&history.stderr);
    assert!(stderr.contains("habit not found"));

    let stats = run(&env, &["stats", "--export", "json"]);
    assert_success(&["stats", "--export", "json"], &stats);
    let summary: serde_json::Value =
        serde_json::from_slice(&stats.stdout).expect("stats JSON");
    assert_eq!(summary["active_habits"], 0);
    assert_eq!(summary["best_streak"], 1);
    assert_eq!(summary["total_check_ins"], 1);
}

#[test]
fn users_are_isolated() {
    let env = CliTestEnv::new();

    let add = run(&env, &["add", "Read", "--user", "maya"]);
    assert_success(&["add", "Read", "--user", "maya"], &add);
    let habit_id = parse_habit_id(&add);

    // The default user cannot see or touch maya's habit
    let list = run(&env, &["list"]);
    assert_success(&["list"], &list);
    let list_stdout = String::from_utf8_lossy(&list.stdout);
    assert!(!list_stdout.contains(&habit_id));

    let checkin = run(&env, &["checkin", &habit_id]);
    assert!(!checkin.status.success());
    let stderr = String::from_utf8_lossy(&checkin.stderr);
    assert!(stderr.contains("habit not found"));
}
