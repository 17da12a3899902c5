use taskflow::config::Config;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.sync.endpoint, "https://api.jsonbin.io/v3/b");
    assert_eq!(config.sync.timeout_secs, 15);
    assert!(config.sync.token.is_none());
    assert!(config.sync.document_id.is_none());
    assert!(!config.logging.enabled);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();

    // Valid config should pass
    assert!(config.validate().is_ok());

    config.logging.level = "loud".to_string();
    assert!(config.validate().is_err());

    config.logging.level = "debug".to_string();
    config.sync.endpoint = "ftp://example.com".to_string();
    assert!(config.validate().is_err());

    config.sync.endpoint = "http://localhost:8080/b".to_string();
    config.sync.timeout_secs = 0;
    assert!(config.validate().is_err());

    config.sync.timeout_secs = 301;
    assert!(config.validate().is_err());

    config.sync.timeout_secs = 300;
    assert!(config.validate().is_ok());
}

#[test]
fn test_level_filter() {
    let mut config = Config::default();
    assert_eq!(config.logging.level_filter().unwrap(), log::LevelFilter::Info);
    config.logging.level = "TRACE".to_string();
    assert_eq!(config.logging.level_filter().unwrap(), log::LevelFilter::Trace);
}

#[test]
fn test_config_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string_pretty(&config).unwrap();
    assert!(toml_str.contains("timeout_secs = 15"));
    assert!(toml_str.contains("level = \"info\""));
}

#[test]
fn test_partial_config_deserialization() {
    let partial_toml = r#"
[sync]
token = "secret"
document_id = "abc123"

[logging]
enabled = true
"#;

    let config: Config = toml::from_str(partial_toml).unwrap();

    assert_eq!(config.sync.token.as_deref(), Some("secret"));
    assert_eq!(config.sync.document_id.as_deref(), Some("abc123"));
    assert!(config.logging.enabled);

    // Unspecified values keep their defaults
    assert_eq!(config.sync.endpoint, "https://api.jsonbin.io/v3/b");
    assert_eq!(config.sync.timeout_secs, 15);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_load_from_file_rejects_invalid_values() {
    let mut path = std::env::temp_dir();
    path.push(format!("taskflow_config_{}.toml", std::process::id()));

    std::fs::write(&path, "[sync]\ntimeout_secs = 0\n").unwrap();
    assert!(Config::load_from_file(&path).is_err());

    std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();
    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.logging.level, "warn");

    std::fs::remove_file(&path).unwrap();
    assert!(Config::load_from_file(&path).is_err());
}

#[test]
fn test_default_config_path() {
    if let Ok(path) = Config::default_config_path() {
        assert!(path.ends_with(std::path::Path::new("taskflow").join("config.toml")));
    }
}
