//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! CLI arguments > Environment variables > Config file > Defaults

use geomatch_core::config::{
    CliConfigOverrides, ConfigSource, LayeredConfig, DEFAULT_EASTING_COLUMN,
    DEFAULT_NORTHING_COLUMN,
};
use geomatch_core::models::MatchPolicy;
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_default_configuration() {
    let config = LayeredConfig::with_defaults();

    assert_eq!(config.northing_column.value, DEFAULT_NORTHING_COLUMN);
    assert_eq!(config.northing_column.source, ConfigSource::Default);
    assert_eq!(config.easting_column.value, DEFAULT_EASTING_COLUMN);
    assert_eq!(config.easting_column.source, ConfigSource::Default);
    assert_eq!(config.distance.value, None);
    assert_eq!(config.mode.value, MatchPolicy::Closest);
}

#[test]
fn test_file_overrides_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
northing_column = "north [m]"
easting_column = "east [m]"
distance = 15.0
mode = "all"
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap();

    assert_eq!(config.northing_column.value, "north [m]");
    assert_eq!(config.northing_column.source, ConfigSource::File);
    assert_eq!(config.easting_column.value, "east [m]");
    assert_eq!(config.easting_column.source, ConfigSource::File);
    assert_eq!(config.distance.value, Some(15.0));
    assert_eq!(config.distance.source, ConfigSource::File);
    assert_eq!(config.mode.value, MatchPolicy::All);
    assert_eq!(config.mode.source, ConfigSource::File);
}

#[test]
fn test_partial_file_configuration() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
distance = 7.5
# Only override the distance, leave the rest as defaults
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap();

    assert_eq!(config.distance.value, Some(7.5));
    assert_eq!(config.distance.source, ConfigSource::File);
    // These should still be defaults
    assert_eq!(config.northing_column.value, DEFAULT_NORTHING_COLUMN);
    assert_eq!(config.northing_column.source, ConfigSource::Default);
    assert_eq!(config.mode.source, ConfigSource::Default);
}

#[test]
fn test_unparseable_file_is_fatal() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "distance = ").unwrap();

    assert!(LayeredConfig::with_defaults().load_from_file(file.path()).is_err());
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
distance = 10.0
mode = "closest"
"#
    )
    .unwrap();

    env::set_var("GEOMATCH_DISTANCE", "42.5");
    env::set_var("GEOMATCH_MODE", "all");

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    env::remove_var("GEOMATCH_DISTANCE");
    env::remove_var("GEOMATCH_MODE");

    assert_eq!(config.distance.value, Some(42.5));
    assert_eq!(config.distance.source, ConfigSource::Environment);
    assert_eq!(config.mode.value, MatchPolicy::All);
    assert_eq!(config.mode.source, ConfigSource::Environment);
}

#[test]
#[serial]
fn test_env_column_names() {
    env::set_var("GEOMATCH_NORTHING_COLUMN", "lat_m");
    env::set_var("GEOMATCH_EASTING_COLUMN", "lon_m");

    let config = LayeredConfig::with_defaults().load_from_env();

    env::remove_var("GEOMATCH_NORTHING_COLUMN");
    env::remove_var("GEOMATCH_EASTING_COLUMN");

    assert_eq!(config.northing_column.value, "lat_m");
    assert_eq!(config.northing_column.source, ConfigSource::Environment);
    assert_eq!(config.easting_column.value, "lon_m");
}

#[test]
#[serial]
fn test_invalid_env_values_are_ignored() {
    env::set_var("GEOMATCH_DISTANCE", "not-a-number");
    env::set_var("GEOMATCH_MODE", "random");

    let config = LayeredConfig::with_defaults().load_from_env();

    env::remove_var("GEOMATCH_DISTANCE");
    env::remove_var("GEOMATCH_MODE");

    assert_eq!(config.distance.value, None);
    assert_eq!(config.distance.source, ConfigSource::Default);
    assert_eq!(config.mode.value, MatchPolicy::Closest);
    assert_eq!(config.mode.source, ConfigSource::Default);
}

#[test]
#[serial]
fn test_cli_overrides_everything() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "distance = 10.0").unwrap();

    env::set_var("GEOMATCH_DISTANCE", "20.0");

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env()
        .apply_cli_overrides(CliConfigOverrides {
            distance: Some(30.0),
            ..Default::default()
        });

    env::remove_var("GEOMATCH_DISTANCE");

    assert_eq!(config.distance.value, Some(30.0));
    assert_eq!(config.distance.source, ConfigSource::Cli);

    let match_config = config.into_match_config().unwrap();
    assert_eq!(match_config.threshold, 30.0);
}
