//! Integration tests for configuration discovery.
//!
//! Tests touching `UAM_CONFIG` hold an [`EnvGuard`] so they do not race.

use std::path::PathBuf;

use crate::common::env::{EnvGuard, with_uam_config};
use crate::common::fixtures::Workspace;
use uam::config::{CONFIG_ENV, ToolConfig, load};
use uam::error::ModelsError;

fn canonical_dir(ws: &Workspace) -> PathBuf {
    ws.path().canonicalize().unwrap()
}

#[test]
fn env_var_names_the_config_file() {
    let ws = Workspace::new();
    ws.write("uam.yaml", "models: data/models.yaml\nregexes: regexes.yaml\n");
    let _guard = with_uam_config(&ws.arg("uam.yaml"));

    let config = load(None).unwrap();

    let dir = canonical_dir(&ws);
    assert_eq!(config.models, dir.join("data/models.yaml"));
    assert_eq!(config.regexes, Some(dir.join("regexes.yaml")));
    assert_eq!(config.source, Some(ws.file("uam.yaml")));
}

#[test]
fn explicit_path_wins_over_env_var() {
    let ws = Workspace::new();
    ws.write("env.yaml", "models: env.yaml\n");
    ws.write("flag.toml", "models = \"flag.yaml\"\ncsv = \"/tmp/report.csv\"\n");
    let _guard = with_uam_config(&ws.arg("env.yaml"));

    let config = load(Some(ws.file("flag.toml").as_path())).unwrap();

    assert_eq!(config.models, canonical_dir(&ws).join("flag.yaml"));
    assert_eq!(config.csv, PathBuf::from("/tmp/report.csv"));
}

#[test]
fn empty_env_var_is_ignored() {
    let ws = Workspace::new();
    let home = ws.arg("config-home");
    let _guard = EnvGuard::set_many([(CONFIG_ENV, Some("")), ("XDG_CONFIG_HOME", Some(home.as_str()))]);

    let config = load(None).unwrap();

    assert_eq!(config, ToolConfig::default());
}

#[test]
fn default_file_is_found_under_config_home() {
    let ws = Workspace::new();
    ws.write("config-home/uam/config.toml", "models = \"store.yaml\"\n");
    let home = ws.arg("config-home");
    let _guard = EnvGuard::set_many([(CONFIG_ENV, None), ("XDG_CONFIG_HOME", Some(home.as_str()))]);

    let config = load(None).unwrap();

    assert_eq!(
        config.models,
        ws.file("config-home/uam").canonicalize().unwrap().join("store.yaml")
    );
}

#[test]
fn missing_env_file_is_an_error() {
    let ws = Workspace::new();
    let _guard = with_uam_config(&ws.arg("missing.yaml"));

    let err = load(None).unwrap_err();

    assert!(matches!(err, ModelsError::ConfigNotFound { .. }));
    assert_eq!(err.suggestion(), Some("Run: uam config --path"));
}

#[test]
fn empty_path_fails_validation() {
    let ws = Workspace::new();
    ws.write("uam.yaml", "output: ''\n");

    let err = load(Some(ws.file("uam.yaml").as_path())).unwrap_err();

    assert!(matches!(err, ModelsError::ConfigInvalid(_)));
    assert!(err.to_string().contains("output"));
}

#[test]
fn unset_fields_keep_defaults() {
    let ws = Workspace::new();
    ws.write("uam.yml", "csv: reports/models.csv\n");

    let config = load(Some(ws.file("uam.yml").as_path())).unwrap();

    let dir = canonical_dir(&ws);
    assert_eq!(config.csv, dir.join("reports/models.csv"));
    assert_eq!(config.models, dir.join(ToolConfig::default().models));
    assert_eq!(config.regexes, None);
}
