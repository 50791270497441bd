use goodboy::config::{Engine, GoodBoyConfig, SafetyMode};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_missing_file_is_created_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("goodboy_config.json");

    let config = GoodBoyConfig::load(&path).unwrap();
    assert_eq!(config, GoodBoyConfig::default());
    assert!(path.exists());

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["engine"], "local");
    assert_eq!(written["safety_mode"], "interactive");
    assert!(written.get("cloud_api_key").is_none());
}

#[test]
fn test_partial_file_merges_over_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("goodboy_config.json");
    std::fs::write(
        &path,
        r#"{"engine": "cloud", "cloud_model": "tiny", "allowed_tools": ["export_data"], "safety_mode": "autonomous"}"#,
    )
    .unwrap();

    let config = GoodBoyConfig::load(&path).unwrap();
    assert_eq!(config.engine, Engine::Cloud);
    assert_eq!(config.cloud_model, "tiny");
    assert_eq!(config.safety_mode, SafetyMode::Autonomous);
    assert_eq!(config.allowed_tools, vec!["export_data"]);
    assert_eq!(config.max_tokens, 512);
    assert_eq!(config.request_timeout(), Duration::from_secs(120));
}

#[test]
fn test_corrupt_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("goodboy_config.json");
    std::fs::write(&path, "{ engine: cloud").unwrap();

    let config = GoodBoyConfig::load(&path).unwrap();
    assert_eq!(config, GoodBoyConfig::default());
    // the broken file is left for the user to fix
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ engine: cloud");
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("goodboy_config.json");
    let config = GoodBoyConfig::default()
        .with_engine(Engine::Cloud)
        .with_safety_mode(SafetyMode::ReadOnly)
        .with_storage_root(dir.path());
    config.save(&path).unwrap();

    let loaded = GoodBoyConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.data_dir, dir.path().join("data"));
    assert_eq!(loaded.memory_dir, dir.path().join("memory"));
}

#[test]
fn test_storage_root_and_timeout_floor() {
    let mut config = GoodBoyConfig::default().with_storage_root("/srv/goodboy");
    assert_eq!(config.data_dir, PathBuf::from("/srv/goodboy/data"));
    config.request_timeout_secs = 0;
    assert_eq!(config.request_timeout(), Duration::from_secs(1));
}
