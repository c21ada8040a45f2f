//! Integration tests for CLI behavior
//!
//! These run the actual binary against a temporary data directory, passed
//! via `CENTAVO_HOME` on the child process only — the test process
//! environment is never mutated.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

/// Run centavo with CENTAVO_HOME pointed at `home`.
fn run_centavo(home: &TempDir, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_centavo"))
        .args(args)
        .env("CENTAVO_HOME", home.path())
        .output()
        .expect("failed to run centavo")
}

#[test]
fn help_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_centavo"))
        .arg("-h")
        .output()
        .expect("failed to run centavo");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("centavo"));
    assert!(stdout.contains("Usage"));
}

#[test]
fn version_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_centavo"))
        .arg("--version")
        .output()
        .expect("failed to run centavo");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("centavo"));
}

#[test]
fn bare_invocation_shows_command_help() {
    let home = TempDir::new().unwrap();
    let output = run_centavo(&home, &[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Comandos disponibles"), "{stdout}");
}

#[test]
fn records_expense_and_reports_it() {
    let home = TempDir::new().unwrap();

    let output = run_centavo(&home, &["gasto", "15000", "almuerzo"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("✅ Registrado: 15.000 COP"), "{stdout}");

    // The collection file landed in the data directory
    assert!(home.path().join("gastos.json").exists());

    // A second invocation sees the persisted record
    let output = run_centavo(&home, &["hoy"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("15.000 COP"), "{stdout}");
}

#[test]
fn data_dir_flag_overrides_env() {
    let home = TempDir::new().unwrap();
    let flag_dir = TempDir::new().unwrap();

    let flag_path = flag_dir.path().to_string_lossy().into_owned();
    let output = run_centavo(&home, &["--data-dir", &flag_path, "gasto", "5000", "cafe"]);
    assert!(output.status.success());

    assert!(flag_dir.path().join("gastos.json").exists());
    assert!(!home.path().join("gastos.json").exists());
}

#[test]
fn settings_survive_between_invocations() {
    let home = TempDir::new().unwrap();

    let output = run_centavo(&home, &["presupuesto", "200000"]);
    assert!(
        String::from_utf8_lossy(&output.stdout).contains("actualizado a: 200.000 COP")
    );

    let config = fs::read_to_string(home.path().join("config.json")).unwrap();
    assert!(config.contains("200000"), "{config}");

    let output = run_centavo(&home, &["cuanto", "me", "queda"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("200.000 COP"), "{stdout}");
}

#[test]
fn unknown_command_replies_with_fallback() {
    let home = TempDir::new().unwrap();
    let output = run_centavo(&home, &["saltar", "500"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No entendí"));
}
