use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::{tempdir, TempDir};

const GEOFIX_BIN: &str = env!("CARGO_BIN_EXE_geofix");

fn write_config(dir: &Path) -> Result<PathBuf> {
    let config_path = dir.join("geofix.toml");
    let config = format!(
        r#"
        [resolver.places]
        "Rome" = [41.9028, 12.4964]

        [logging]
        directory = '{}'
        default_directive = "geofix=info"
        "#,
        dir.join("logs").display()
    );
    fs::write(&config_path, config)?;
    Ok(config_path)
}

fn geofix(dir: &TempDir, args: &[&str], rust_log: Option<&str>) -> Result<Output> {
    let mut command = Command::new(GEOFIX_BIN);
    command
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("GEOFIX_CONFIG")
        .args(args);
    if let Some(rust_log) = rust_log {
        command.env("RUST_LOG", rust_log);
    }
    Ok(command.output()?)
}

/// Everything written to the rolling log files
fn file_logs(dir: &Path) -> Result<String> {
    let mut logs = String::new();
    for entry in fs::read_dir(dir.join("logs"))? {
        logs.push_str(&fs::read_to_string(entry?.path())?);
    }
    Ok(logs)
}

#[test]
fn test_fix_stage_failure_exits_nonzero_and_flushes_file_log() -> Result<()> {
    let dir = tempdir()?;
    let config = write_config(dir.path())?;
    let input = dir.path().join("in.ndjson");
    fs::write(&input, "{\"id\":1,\"location\":\"Rome\"}\nnot json\n")?;
    let output = dir.path().join("out.ndjson");

    let run = geofix(
        &dir,
        &[
            "--config",
            config.to_str().unwrap(),
            "fix",
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ],
        None,
    )?;

    assert_eq!(run.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&run.stdout).contains("Stage terminated early"));
    assert_eq!(fs::read_to_string(&output)?.lines().count(), 1);
    assert!(file_logs(dir.path())?.contains("Geo-fix stage failed"));
    Ok(())
}

#[test]
fn test_rust_log_overrides_configured_directive() -> Result<()> {
    let dir = tempdir()?;
    let config = write_config(dir.path())?;
    let input = dir.path().join("in.ndjson");
    fs::write(&input, "{\"id\":1,\"location\":\"Rome\"}\n{\"id\":2}\n")?;
    let output = dir.path().join("out.ndjson");
    let args = [
        "--config",
        config.to_str().unwrap(),
        "fix",
        "--input",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ];

    let run = geofix(&dir, &args, Some("geofix=debug"))?;

    assert!(run.status.success());
    let logs = file_logs(dir.path())?;
    assert!(logs.contains("DEBUG"));
    assert!(logs.contains("Element started"));
    Ok(())
}

#[test]
fn test_check_config_reports_resolved_settings() -> Result<()> {
    let dir = tempdir()?;
    let config = write_config(dir.path())?;

    let run = geofix(&dir, &["--config", config.to_str().unwrap(), "check-config"], None)?;

    assert!(run.status.success());
    let stdout = String::from_utf8_lossy(&run.stdout);
    assert!(stdout.contains("Configuration is valid"));
    assert!(stdout.contains("Known places: 1"));
    assert!(stdout.contains("Lookup field: location"));
    Ok(())
}

#[test]
fn test_invalid_config_fails() -> Result<()> {
    let dir = tempdir()?;
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[stage]\nchannel_capacity = 0\n")?;

    let run = geofix(&dir, &["--config", config.to_str().unwrap(), "check-config"], None)?;

    assert!(!run.status.success());
    Ok(())
}
