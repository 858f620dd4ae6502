use par_annotate_config::{Config, ConfigError, LogLevel, MatcherSettings};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.yaml");

    let mut config = Config::default();
    config.log_level = LogLevel::Debug;
    config.limits.tooltip_max_chars = 40;
    config.matchers.insert(
        "kubectl".to_string(),
        MatcherSettings {
            aliases: vec!["k get pods".to_string()],
            fast: Some(true),
            ..Default::default()
        },
    );

    config.save_to(&path).unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("yaml.tmp").exists());

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_empty_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "{}\n").unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, Config::default());
}

#[test]
fn test_load_invalid_yaml_is_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "limits: [not, a, map\n").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Parse(_))
    ));
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = Config::load_from(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Io(_))
    ));
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "limits:\n  tooltip_max_chars: 0\n").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Validation(_))
    ));
}

#[test]
fn test_config_path_ends_with_app_dir() {
    let path = Config::config_path();
    assert!(path.ends_with("par-annotate/config.yaml"));
}
