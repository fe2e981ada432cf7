use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;

// Keeps the per-user config lookup inside `dir`.
fn agesched(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("agesched").expect("binary");
    cmd.current_dir(dir.path())
        .env_remove("AGESCHED_CONFIG")
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join(".config"));
    cmd
}

fn json_lines(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect()
}

#[test]
fn help_works() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    agesched(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("priority task scheduler"));

    for cmd in ["run", "config"] {
        agesched(&dir).arg(cmd).arg("--help").assert().success();
    }
    Ok(())
}

#[test]
fn run_executes_in_priority_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let script = "\
# plan the day
add email 3 answer inbox
add deploy 5
add lunch 1
next
next
next
next
";

    agesched(&dir)
        .arg("run")
        .write_stdin(script)
        .assert()
        .success()
        .stdout(contains("Executing 'deploy' with priority 5"))
        .stdout(contains("Executing 'email' with priority 3"))
        .stdout(contains("Executing 'lunch' with priority 1"))
        .stdout(contains("No more tasks in the queue."));
    Ok(())
}

#[test]
fn run_reports_missing_tasks_and_continues() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    agesched(&dir)
        .arg("run")
        .write_stdin("add a 1\ncomplete ghost\nundo\nlist\n")
        .assert()
        .success()
        .stderr(contains("line 2: Task not found: ghost"))
        .stderr(contains("line 3: Nothing to undo"))
        .stdout(contains("a [priority 1, effective 1, waited 0] #0"));
    Ok(())
}

#[test]
fn strict_run_stops_with_failing_code() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    agesched(&dir)
        .args(["run", "--strict"])
        .write_stdin("add a 1\npriority ghost 4\nadd b 2\n")
        .assert()
        .code(3)
        .stderr(contains("line 2: Task not found: ghost"));
    Ok(())
}

#[test]
fn json_run_streams_envelopes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let output = agesched(&dir)
        .args(["run", "--json"])
        .write_stdin("add a 1\nadd b 5\nundo\nredo\nredo\nlist\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 7);
    assert!(lines.iter().all(|line| line["schema_version"] == "agesched.v1"));
    assert_eq!(lines[2]["command"], "undo");
    assert_eq!(lines[2]["data"]["active"], 1);
    assert_eq!(lines[4]["status"], "error");
    assert_eq!(lines[4]["line"], 5);
    assert_eq!(lines[4]["error"]["kind"], "no_history");

    let listing = &lines[5]["data"];
    assert_eq!(listing["active"][0]["name"], "b");
    assert_eq!(listing["active"][1]["name"], "a");

    let summary = &lines[6];
    assert_eq!(summary["command"], "run");
    assert_eq!(summary["data"]["commands"], 6);
    assert_eq!(summary["data"]["failures"], 1);
    Ok(())
}

#[test]
fn run_reads_script_file_and_config() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join(".agesched.toml"),
        "[aging]\ndivisor = 2\n",
    )?;
    let script = dir.path().join("plan.txt");
    std::fs::write(&script, "add a 4\ntick 5\npeek\n")?;

    agesched(&dir)
        .arg("run")
        .arg(&script)
        .assert()
        .success()
        .stdout(contains("Next: a [priority 4, effective 2, waited 5] #0"));
    Ok(())
}

#[test]
fn explicit_missing_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    agesched(&dir)
        .args(["--config", "nope.toml", "config"])
        .assert()
        .code(2)
        .stderr(contains("Config file not found"));
    Ok(())
}

#[test]
fn config_write_saves_resolved_config() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("out.toml");
    agesched(&dir)
        .args(["config", "--write"])
        .arg(&target)
        .assert()
        .success()
        .stdout(contains("Aging divisor: 10"));

    let written = std::fs::read_to_string(&target)?;
    assert!(written.contains("divisor = 10"));
    assert!(written.contains("direction = \"penalize\""));
    Ok(())
}

#[test]
fn run_next_executes_and_ages_between_tasks() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let script = "\
add stale 3
tick 19
add fresh 2
add top 9
run-next
";

    let output = agesched(&dir)
        .args(["run", "--json"])
        .write_stdin(script)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines = json_lines(&output);
    let run = &lines[4];
    assert_eq!(run["command"], "run-next");
    let executed: Vec<&str> = run["data"]["executed"]
        .as_array()
        .expect("executed")
        .iter()
        .map(|task| task["name"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(executed, vec!["top", "fresh", "stale"]);
    assert_eq!(run["data"]["remaining"], 0);
    Ok(())
}

#[cfg(target_os = "linux")]
#[test]
fn user_config_applies_only_without_local_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let user_dir = dir.path().join(".config").join("agesched");
    std::fs::create_dir_all(&user_dir)?;
    std::fs::write(user_dir.join("config.toml"), "[aging]\ndivisor = 2\n")?;

    agesched(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(contains("Aging divisor: 2"));

    std::fs::write(dir.path().join(".agesched.toml"), "[aging]\ndivisor = 4\n")?;
    agesched(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(contains("Aging divisor: 4"));
    Ok(())
}
