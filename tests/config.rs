use std::fs;

use agesched::aging::AgingDirection;
use agesched::config::{Config, CONFIG_FILE_NAME};
use agesched::error::Error;

#[test]
fn defaults_when_missing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = Config::load(&dir.path().join(CONFIG_FILE_NAME));
    assert!(matches!(config, Err(Error::ConfigNotFound(_))));
    assert_eq!(Config::default().aging.divisor, 10);
    Ok(())
}

#[test]
fn overrides_from_toml() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(CONFIG_FILE_NAME);
    let toml = r#"
[aging]
divisor = 4
direction = "boost"
tick_unit_ms = 250

[history]
enabled = false
max_depth = 16

[tasks]
reject_duplicate_names = false
allow_negative_priority = false
"#;
    fs::write(&path, toml)?;

    let config = Config::resolve(None, dir.path())?;
    assert_eq!(config.aging.divisor, 4);
    assert_eq!(config.aging.direction, AgingDirection::Boost);
    assert_eq!(config.aging.tick_unit_ms, 250);
    assert!(!config.history.enabled);
    assert_eq!(config.history.max_depth, Some(16));
    assert!(!config.tasks.reject_duplicate_names);
    assert!(!config.tasks.allow_negative_priority);
    Ok(())
}

#[test]
fn explicit_invalid_config_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("custom.toml");
    fs::write(&path, "[aging]\ndivisor = 0\n")?;

    let err = Config::resolve(Some(&path), dir.path()).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
    Ok(())
}

#[test]
fn discovered_invalid_config_falls_back() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join(CONFIG_FILE_NAME), "[aging]\ndivisor = 0\n")?;

    let config = Config::resolve(None, dir.path())?;
    assert_eq!(config, Config::default());
    Ok(())
}

#[test]
fn save_then_load() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("saved.toml");
    let mut config = Config::default();
    config.aging.divisor = 3;
    config.history.max_depth = Some(5);
    config.save(&path)?;

    assert_eq!(Config::load(&path)?, config);
    Ok(())
}
