use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Runs the binary with an isolated home so no user config leaks in.
fn textscan(home: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_textscan"));
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("RUST_LOG", "warn");
    cmd
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "Hello World\nbye\n").unwrap();
    fs::write(dir.path().join("b.json"), "{\"greeting\": \"hello there\"}\n").unwrap();
    fs::write(dir.path().join("HelloReport.log"), "quarterly\n").unwrap();
    dir
}

#[test]
fn search_prints_table() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let data = fixture();

    textscan(&home)
        .arg("search")
        .arg("hello")
        .arg(data.path())
        .arg("--no-progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("Occurrences #"))
        .stdout(predicate::str::contains("Hello World"))
        .stdout(predicate::str::contains("hello there"))
        .stdout(predicate::str::contains("[MATCH IN FILE NAME]").not())
        .stdout(predicate::str::contains("Found 2 records"));

    Ok(())
}

#[test]
fn search_with_names_and_filter() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let data = fixture();

    textscan(&home)
        .arg("search")
        .arg("hello")
        .arg(data.path())
        .args(["--extensions", "TXT", "--names", "--no-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[MATCH IN FILE NAME] HelloReport.log"))
        .stdout(predicate::str::contains("Hello World"))
        .stdout(predicate::str::contains("hello there").not());

    Ok(())
}

#[test]
fn json_output_is_machine_readable() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let data = fixture();

    let output = textscan(&home)
        .arg("search")
        .arg("hello")
        .arg(data.path())
        .args(["--format", "json", "--no-progress", "-n", "-j", "2"])
        .output()?;
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["needle"], "hello");
    assert_eq!(report["total_records"], 3);
    let name_hits = report["records"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["line_number"].is_null())
        .count();
    assert_eq!(name_hits, 1);

    Ok(())
}

#[test]
fn no_matches_is_still_success() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let data = fixture();

    textscan(&home)
        .args(["search", "zzz-not-there"])
        .arg(data.path())
        .arg("--no-progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches found"));

    Ok(())
}

#[test]
fn non_directory_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let data = fixture();

    textscan(&home)
        .arg("search")
        .arg("hello")
        .arg(data.path().join("a.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("The selected path is not a directory."));

    Ok(())
}

#[test]
fn config_file_supplies_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let data = fixture();
    let config = home.path().join("custom.toml");
    fs::write(
        &config,
        "[search]\nextensions = \"log\"\ninclude_file_names = true\n\n[display]\nshow_summary = false\n",
    )?;

    textscan(&home)
        .arg("--config")
        .arg(&config)
        .arg("search")
        .arg("hello")
        .arg(data.path())
        .arg("--no-progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("[MATCH IN FILE NAME] HelloReport.log"))
        .stdout(predicate::str::contains("Hello World").not())
        .stdout(predicate::str::contains("Found").not());

    Ok(())
}

#[test]
fn config_init_writes_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let target = home.path().join("out/config.toml");

    textscan(&home)
        .args(["config", "--init", "--path"])
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default config"));

    let written = fs::read_to_string(&target)?;
    assert!(written.contains("[search]"));
    assert!(written.contains("show_progress = true"));

    textscan(&home)
        .arg("--config")
        .arg(&target)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("include_hidden = true"));

    Ok(())
}

#[test]
fn completions_are_generated() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;

    textscan(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("textscan"));

    Ok(())
}
