use std::fs;
use std::process::Command;

/// Spawn relay with a scrubbed environment plus the given variables.
/// RUST_BACKTRACE goes too, so stderr assertions see only the error text.
fn run_relay_with_env(args: &[&str], vars: &[(&str, &str)]) -> std::process::Output {
    let mut command = Command::new("cargo");
    command
        .args(["run", "--quiet", "--"])
        .args(args)
        .env_remove("RELAY_USERNAME")
        .env_remove("RELAY_PASSWORD")
        .env_remove("RELAY_AUTHFILE")
        .env_remove("RUST_BACKTRACE");
    for (name, value) in vars {
        command.env(name, value);
    }
    command.output().expect("Failed to execute command")
}

fn run_relay(args: &[&str]) -> std::process::Output {
    run_relay_with_env(args, &[])
}

#[test]
fn test_missing_switches_file() {
    let output = run_relay(&["-s", "/no/such/switches.txt", "-c", "also-missing.txt"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/no/such/switches.txt"));
}

#[test]
fn test_missing_commands_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let switches = dir.path().join("switches.txt");
    fs::write(&switches, "192.0.2.1\n").expect("write switches");

    let output = run_relay(&[
        "-s",
        switches.to_str().expect("path"),
        "-c",
        "/no/such/commands.txt",
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/no/such/commands.txt"));
}

#[test]
fn test_empty_commands_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let switches = dir.path().join("switches.txt");
    let commands = dir.path().join("commands.txt");
    fs::write(&switches, "192.0.2.1\n").expect("write switches");
    fs::write(&commands, "\n   \n").expect("write commands");

    let output = run_relay(&[
        "-s",
        switches.to_str().expect("path"),
        "-c",
        commands.to_str().expect("path"),
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("is empty"));
}

#[test]
fn test_missing_authfile() {
    let dir = tempfile::tempdir().expect("tempdir");
    let switches = dir.path().join("switches.txt");
    let commands = dir.path().join("commands.txt");
    fs::write(&switches, "192.0.2.1\n").expect("write switches");
    fs::write(&commands, "show version\n").expect("write commands");

    let output = run_relay(&[
        "-s",
        switches.to_str().expect("path"),
        "-c",
        commands.to_str().expect("path"),
        "-A",
        "/no/such/authfile",
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/no/such/authfile"));
}

#[test]
fn test_env_supplies_username_and_password() {
    let dir = tempfile::tempdir().expect("tempdir");
    let switches = dir.path().join("switches.txt");
    let commands = dir.path().join("commands.txt");
    fs::write(&switches, "192.0.2.1\n").expect("write switches");
    fs::write(&commands, "reload\n").expect("write commands");

    // With credentials in the environment nothing prompts, so the run
    // reaches the screening step and refuses cleanly. Were the variables
    // ignored, the username prompt would fail on closed stdin instead
    let output = run_relay_with_env(
        &[
            "-s",
            switches.to_str().expect("path"),
            "-c",
            commands.to_str().expect("path"),
        ],
        &[("RELAY_USERNAME", "env-user"), ("RELAY_PASSWORD", "env-pass")],
    );

    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Refusing to run"));
    assert!(!stderr.contains("prompting for"));
}

#[test]
fn test_env_supplies_authfile_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let auth = dir.path().join("auth.txt");
    let switches = dir.path().join("switches.txt");
    let commands = dir.path().join("commands.txt");
    fs::write(&auth, "username: nick\npassword: pass\n").expect("write auth");
    fs::write(&switches, "192.0.2.1\n").expect("write switches");
    fs::write(&commands, "reload\n").expect("write commands");

    let output = run_relay_with_env(
        &[
            "-s",
            switches.to_str().expect("path"),
            "-c",
            commands.to_str().expect("path"),
        ],
        &[("RELAY_AUTHFILE", auth.to_str().expect("path"))],
    );

    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Refusing to run"));
    assert!(!stderr.contains("prompting for"));
}

#[test]
fn test_env_authfile_must_exist() {
    let dir = tempfile::tempdir().expect("tempdir");
    let switches = dir.path().join("switches.txt");
    let commands = dir.path().join("commands.txt");
    fs::write(&switches, "192.0.2.1\n").expect("write switches");
    fs::write(&commands, "show version\n").expect("write commands");

    let output = run_relay_with_env(
        &[
            "-s",
            switches.to_str().expect("path"),
            "-c",
            commands.to_str().expect("path"),
        ],
        &[("RELAY_AUTHFILE", "/no/such/env-authfile")],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/no/such/env-authfile"));
}

#[test]
fn test_prompt_failure_names_the_question() {
    // No -s file and a closed stdin: the host prompt fails, and the
    // error should say what was being asked
    let output = run_relay(&[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("prompting for device host"));
}

#[test]
fn test_bad_timeout_value() {
    let output = run_relay(&["-t", "soon"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("seconds"));
}

#[test]
fn test_port_zero_rejected() {
    let output = run_relay(&["--port", "0"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("port 0"));
}

#[test]
fn test_unknown_flag() {
    let output = run_relay(&["--frobnicate"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown argument"));
}

#[test]
fn test_value_flag_cannot_join_cluster() {
    let output = run_relay(&["-ps"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("takes a value"));
}

#[test]
fn test_completions_bash() {
    let output = run_relay(&["--completions", "bash"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("relay"));
}
