use std::{fs, path::Path};

use frog_swarm::{config::GameConfig, error::ConfigError};

#[test]
fn test_default_config_is_valid() {
    assert!(GameConfig::default().validate().is_ok());
}

#[test]
fn test_config_loads_from_toml_file() {
    let mut config = GameConfig::default();
    config.frogs.max_frogs = 64;
    config.schedule.normal_interval = 45.0;
    let path = std::env::temp_dir().join(format!("frog_swarm_config_{}.toml", std::process::id()));
    fs::write(&path, toml::to_string(&config).expect("serialize config")).expect("write config");

    let loaded = GameConfig::load(&path);
    let _ = fs::remove_file(&path);

    assert_eq!(loaded.expect("config loads"), config);
}

#[test]
fn test_missing_config_file_is_io_error() {
    let err = GameConfig::load(Path::new("/definitely/not/here/frogs.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_missing_fields_are_rejected() {
    let err = GameConfig::from_toml_str("[schedule]\nmax_frame_dt = 0.1\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_unknown_fields_are_rejected() {
    let mut text = toml::to_string(&GameConfig::default()).expect("serialize config");
    text = text.replace("[schedule]\n", "[schedule]\nboss_rush = true\n");
    let err = GameConfig::from_toml_str(&text).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_invalid_values_are_rejected() {
    let mut config = GameConfig::default();
    config.frogs.max_frogs = 0;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "frogs.max_frogs", .. })));

    let mut config = GameConfig::default();
    config.upgrades.max_death_rattle = 1.5;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "upgrades.max_death_rattle", .. })));

    let mut config = GameConfig::default();
    config.orbs.spawn_interval_max = 1.0;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "orbs.spawn_interval_min", .. })));

    let mut config = GameConfig::default();
    config.snakes.initial_segments = 30;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "snakes.initial_segments", .. })));
}
