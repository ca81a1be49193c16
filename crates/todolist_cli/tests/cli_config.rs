use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("todolist-{nanos}-{file_name}"))
}

fn run_shell_with(config_path: &Path, args: &[&str], input: &str) -> Output {
    let exe = env!("CARGO_BIN_EXE_todolist");

    let mut child = Command::new(exe)
        .args(args)
        .env("TODOLIST_CONFIG_PATH", config_path)
        .env_remove("TODOLIST_DISABLE_NOTIFICATIONS")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn shell");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin
            .write_all(input.as_bytes())
            .expect("failed to write to stdin");
    }

    child.wait_with_output().expect("failed to read shell output")
}

#[test]
fn json_output_lists_tasks() {
    let config_path = temp_path("json-config.json");
    let output = run_shell_with(
        &config_path,
        &["--json", "--config-override", "save_delay_ms=0"],
        "new\nset title Buy milk\nset date 2024-12-24\nsave\nlist\n",
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let listing = stdout
        .lines()
        .find(|line| line.starts_with('['))
        .expect("json list output");
    let value: serde_json::Value = serde_json::from_str(listing).unwrap();

    assert_eq!(value.as_array().map(Vec::len), Some(1));
    assert_eq!(value[0]["index"], 0);
    assert_eq!(value[0]["title"], "Buy milk");
    assert_eq!(value[0]["status"], "pending");
    assert!(value[0]["date"].as_str().unwrap().starts_with("2024-12-24"));
}

#[test]
fn config_file_aliases_expand() {
    let config_path = temp_path("alias-config.json");
    let content = serde_json::json!({
        "aliases": { "done": "filter --status completed" },
        "save_delay_ms": 0
    });
    std::fs::write(&config_path, serde_json::to_string(&content).unwrap()).unwrap();

    let output = run_shell_with(&config_path, &[], "done\n");
    std::fs::remove_file(&config_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("status=completed"));
    assert!(stdout.contains("No tasks yet."));
}

#[test]
fn override_alias_wins_over_missing_config() {
    let config_path = temp_path("override-config.json");
    let output = run_shell_with(
        &config_path,
        &["--config-override", "aliases.ls=list"],
        "ls\n",
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No tasks yet."));
}

#[test]
fn invalid_config_file_falls_back_to_defaults() {
    let config_path = temp_path("broken-config.json");
    std::fs::write(&config_path, "{ broken").unwrap();

    let output = run_shell_with(
        &config_path,
        &["--config-override", "save_delay_ms=0"],
        "new\nset title still works\nsave\n",
    );
    std::fs::remove_file(&config_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("Added task #0: still works"));
    assert!(stderr.contains("ignoring configuration file"));
}

#[test]
fn bad_override_exits_with_error() {
    let config_path = temp_path("bad-override.json");
    let output = run_shell_with(
        &config_path,
        &["--config-override", "save_delay_ms=soon"],
        "",
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn notifications_can_be_turned_off() {
    let config_path = temp_path("quiet-config.json");
    let output = run_shell_with(
        &config_path,
        &[
            "--config-override",
            "save_delay_ms=0",
            "--config-override",
            "notifications=off",
        ],
        "new\nsave\ndelete 0\n",
    );

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("[success]"));
    assert!(!stderr.contains("[error]"));
}
