//! Configuration resolution tests
//!
//! Tests that manipulate TRACTZOOM_CONFIG are marked with #[serial] so they
//! run sequentially, not in parallel.

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;
use tractzoom_common::config::{TomlConfig, CONFIG_ENV_VAR};
use tractzoom_common::Error;

fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_cli_path_wins_over_environment() {
    let dir = TempDir::new().unwrap();
    let cli = write_config(&dir, "cli.toml", "[bucketing]\nhigh_zoom_tract_threshold = 7\n");
    let from_env = write_config(&dir, "env.toml", "[bucketing]\nhigh_zoom_tract_threshold = 9\n");
    env::set_var(CONFIG_ENV_VAR, &from_env);

    let (config, source) = TomlConfig::resolve(Some(cli.as_path())).unwrap();

    env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(config.bucketing.high_zoom_tract_threshold, 7);
    assert_eq!(source, Some(cli));
}

#[test]
#[serial]
fn test_environment_path_used_without_cli() {
    let dir = TempDir::new().unwrap();
    let from_env = write_config(
        &dir,
        "env.toml",
        "output_dir = \"/srv/tiles\"\n\n[fields]\nscore_field = \"SCORE\"\n",
    );
    env::set_var(CONFIG_ENV_VAR, &from_env);

    let (config, source) = TomlConfig::resolve(None).unwrap();

    env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(config.output_dir, PathBuf::from("/srv/tiles"));
    assert_eq!(config.fields.score_field, "SCORE");
    assert_eq!(config.fields.score_output_field, "P_IND");
    assert_eq!(source, Some(from_env));
}

#[test]
#[serial]
fn test_missing_explicit_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.toml");

    let result = TomlConfig::resolve(Some(missing.as_path()));

    assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("missing.toml")));
}

#[test]
#[serial]
fn test_malformed_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "bad.toml", "[bucketing\ninitial_bucket_count = ");

    let result = TomlConfig::resolve(Some(path.as_path()));

    assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("Parse config")));
}

#[test]
fn test_load_full_config() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "full.toml",
        r#"
score_csv = "data/score/csv/tiles/usa.csv"
census_geojson = "data/census/geojson/us.json"
output_dir = "data/score/geojson/gistar/ind"
high_file_name = "usa-high-gistar-ind.json"
low_file_name = "usa-low-gistar-ind.json"

[fields]
score_tract_field = "GTF"
geoid_field = "GEOID10"
land_field = "ALAND10"
score_field = "P_IND"
score_output_field = "P_IND"

[bucketing]
initial_bucket_count = 12
homogeneity_threshold = 150
high_zoom_tract_threshold = 100
max_refinement_iterations = 500
score_decimals = 3

[logging]
level = "debug"
"#,
    );

    let config = TomlConfig::load(&path).unwrap();

    assert_eq!(config.bucketing.initial_bucket_count, 12);
    assert_eq!(config.bucketing.homogeneity_threshold, 150.0);
    assert_eq!(config.bucketing.max_refinement_iterations, Some(500));
    assert_eq!(config.bucketing.score_decimals, 3);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.low_zoom_path(),
        PathBuf::from("data/score/geojson/gistar/ind/usa-low-gistar-ind.json")
    );
}
