//! Integration tests for dashboard config resolution
//!
//! Tests that manipulate FXT_CONFIG are marked #[serial] so they never run
//! in parallel with each other.

mod helpers;

use std::env;
use std::fs;

use serial_test::serial;
use tempfile::TempDir;
use tracing::Level;

use fxt_common::config::{resolve_config_path, DashboardConfig, CONFIG_ENV_VAR};
use fxt_common::upload_policy::AudioFormat;
use fxt_common::Error;

use helpers::log_capture::capture_logs;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("dashboard.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_explicit_path_takes_priority_over_env() {
    let dir = TempDir::new().unwrap();
    let explicit = write_config(&dir, "[events]\ncapacity = 7\n");

    let other_dir = TempDir::new().unwrap();
    let from_env = write_config(&other_dir, "[events]\ncapacity = 9\n");
    env::set_var(CONFIG_ENV_VAR, &from_env);

    let config = DashboardConfig::load(Some(&explicit)).unwrap();
    assert_eq!(config.events.capacity, 7);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_config_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "[upload]\nallowed_formats = [\"wav\"]\nmax_file_bytes = 500000000\n",
    );
    env::set_var(CONFIG_ENV_VAR, &path);

    assert_eq!(resolve_config_path(), Some(path.clone()));
    let config = DashboardConfig::load(None).unwrap();
    let policy = config.upload_policy().unwrap();
    assert_eq!(policy.allowed_formats(), &[AudioFormat::Wav]);
    assert_eq!(policy.max_file_bytes(), Some(500_000_000));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_env_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");
    env::set_var(CONFIG_ENV_VAR, &missing);

    let (config, logs) = capture_logs(|| DashboardConfig::load(None));

    assert_eq!(config.unwrap(), DashboardConfig::default());
    logs.assert_contains(Level::WARN, "using compiled defaults");

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_explicit_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(matches!(
        DashboardConfig::load(Some(&missing)),
        Err(Error::NotFound(_))
    ));
}

#[test]
#[serial]
fn test_malformed_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[events\ncapacity = ");
    env::set_var(CONFIG_ENV_VAR, &path);

    assert!(matches!(DashboardConfig::load(None), Err(Error::TomlParse(_))));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_empty_env_var_uses_platform_default_location() {
    env::set_var(CONFIG_ENV_VAR, "");
    let resolved = resolve_config_path();
    if let Some(path) = resolved {
        assert!(path.ends_with("fluxtape/dashboard.toml"));
    }
    env::remove_var(CONFIG_ENV_VAR);
}
