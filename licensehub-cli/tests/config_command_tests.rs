//! Integration tests for `licensehub config` and shared config loading.
//!
//! Every test that loads configuration reads `LICENSEHUB_*` environment
//! variables, so they all run serially.

use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use licensehub_cli::commands::config::build_config_report;
use licensehub_cli::commands::load_config;
use licensehub_cli::error::CliError;

#[tokio::test]
#[serial]
async fn test_load_config_reads_all_sections() {
    // Given: A full config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("licensehub.toml");

    let full_config = r#"
[general]
log_level = "debug"
log_format = "json"

[scan]
project = "platform"
max_concurrent_repos = 8
max_concurrent_files = 32
max_file_size = 2097152

[settings]
store_dir = "/var/lib/licensehub"
collection = "TeamSettings"
"#;

    fs::write(&config_path, full_config).expect("should write config");

    // When: Loading the config
    let config = load_config(&config_path).await.expect("config should load");

    // Then: Every section reflects the file
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.scan.project, "platform");
    assert_eq!(config.scan.max_concurrent_repos, 8);
    assert_eq!(config.scan.max_concurrent_files, 32);
    assert_eq!(config.scan.max_file_size, 2 * 1024 * 1024);
    assert_eq!(config.settings.store_dir, "/var/lib/licensehub");
    assert_eq!(config.settings.collection, "TeamSettings");
}

#[tokio::test]
#[serial]
async fn test_load_config_missing_file_uses_defaults() {
    // Given: A nonexistent file path
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("absent.toml");

    // When: Loading the config
    let config = load_config(&config_path)
        .await
        .expect("missing file should fall back to defaults");

    // Then: Defaults are used
    assert_eq!(config.scan.project, "local");
    assert_eq!(config.settings.store_dir, ".licensehub");
}

#[tokio::test]
#[serial]
async fn test_load_config_missing_file_still_applies_env() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("absent.toml");

    // SAFETY: serial tests serialize environment mutation.
    unsafe { std::env::set_var("LICENSEHUB_SCAN_PROJECT", "from-env") };
    let result = load_config(&config_path).await;
    unsafe { std::env::remove_var("LICENSEHUB_SCAN_PROJECT") };

    let config = result.expect("config should load");
    assert_eq!(config.scan.project, "from-env");
}

#[tokio::test]
#[serial]
async fn test_load_config_missing_file_rejects_invalid_env() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("absent.toml");

    // SAFETY: serial tests serialize environment mutation.
    unsafe { std::env::set_var("LICENSEHUB_SCAN_MAX_CONCURRENT_REPOS", "0") };
    let result = load_config(&config_path).await;
    unsafe { std::env::remove_var("LICENSEHUB_SCAN_MAX_CONCURRENT_REPOS") };

    let err = result.expect_err("zero concurrency should be rejected");
    assert_eq!(err.exit_code(), 2, "validation failure is a config error");
}

#[tokio::test]
#[serial]
async fn test_load_config_malformed_toml() {
    // Given: A malformed TOML file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");

    fs::write(&config_path, "[scan\nproject = \"x\"\n").expect("should write bad config");

    // When: Loading the config
    let result = load_config(&config_path).await;

    // Then: Should fail with a config error
    let err = result.expect_err("malformed TOML should fail to load");
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
#[serial]
async fn test_load_config_rejects_path_like_collection() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("licensehub.toml");

    fs::write(&config_path, "[settings]\ncollection = \"../escape\"\n")
        .expect("should write config");

    let result = load_config(&config_path).await;
    assert!(result.is_err(), "collection must be a single path segment");
}

#[tokio::test]
#[serial]
async fn test_load_config_empty_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("empty.toml");

    fs::write(&config_path, "").expect("should write empty file");

    let config = load_config(&config_path)
        .await
        .expect("empty config should use defaults");
    assert_eq!(config.general.log_format, "pretty");
    assert_eq!(config.scan.max_concurrent_files, 10);
}

#[tokio::test]
#[serial]
async fn test_config_show_reflects_loaded_values() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("licensehub.toml");

    fs::write(&config_path, "[scan]\nproject = \"데이터-플랫폼\"\n").expect("should write config");

    let config = load_config(&config_path).await.expect("config should load");
    let report = build_config_report(
        config_path.display().to_string(),
        &config,
        Some("scan".to_owned()),
    )
    .expect("report should build");

    assert_eq!(report.values["project"], "데이터-플랫폼");
    assert!(report.config_toml.contains("데이터-플랫폼"));
}

#[tokio::test]
#[serial]
async fn test_config_show_unknown_section_is_command_error() {
    let config = licensehub_core::config::LicenseHubConfig::default();
    let result = build_config_report("x.toml".to_owned(), &config, Some("sbom".to_owned()));

    let err = match result {
        Err(e) => e,
        Ok(_) => panic!("unknown section should fail"),
    };
    assert!(matches!(err, CliError::Command(_)));
    assert_eq!(err.exit_code(), 1);
}
