//! Configuration loading and root folder resolution
//!
//! Tests that touch WMM_ROOT_FOLDER or WMM_CONFIG are #[serial] so they do
//! not race each other on the process environment.

use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wmm_common::config::{
    default_root_folder, resolve_root_folder, RootFolderInitializer, TomlConfig, CONFIG_FILE_ENV,
    ROOT_FOLDER_ENV,
};
use wmm_common::Error;

#[test]
#[serial]
fn test_env_var_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..TomlConfig::default()
    };
    let resolved = resolve_root_folder(None, &config);
    env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(resolved, PathBuf::from("/from/env"));
}

#[test]
#[serial]
fn test_toml_used_without_env() {
    env::remove_var(ROOT_FOLDER_ENV);
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..TomlConfig::default()
    };
    assert_eq!(resolve_root_folder(None, &config), PathBuf::from("/from/toml"));
}

#[test]
#[serial]
fn test_default_used_without_overrides() {
    env::remove_var(ROOT_FOLDER_ENV);
    let resolved = resolve_root_folder(None, &TomlConfig::default());
    assert_eq!(resolved, default_root_folder());
    assert!(resolved.to_string_lossy().contains("wmm"));
}

#[test]
#[serial]
fn test_empty_env_var_ignored() {
    env::set_var(ROOT_FOLDER_ENV, "");
    let resolved = resolve_root_folder(None, &TomlConfig::default());
    env::remove_var(ROOT_FOLDER_ENV);
    assert_eq!(resolved, default_root_folder());
}

#[test]
#[serial]
fn test_load_explicit_file() {
    env::remove_var(CONFIG_FILE_ENV);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "port = 5900\nroot_folder = \"/srv/wmm\"\n\n[logging]\nlevel = \"debug\"\n",
    )
    .unwrap();

    let config = TomlConfig::load(Some(&path)).unwrap();
    assert_eq!(config.port, 5900);
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/wmm")));
    assert_eq!(config.logging.level, "debug");
}

#[test]
#[serial]
fn test_load_from_env_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wmm.toml");
    std::fs::write(&path, "port = 6001\n").unwrap();

    env::set_var(CONFIG_FILE_ENV, &path);
    let config = TomlConfig::load(None);
    env::remove_var(CONFIG_FILE_ENV);

    assert_eq!(config.unwrap().port, 6001);
}

#[test]
#[serial]
fn test_missing_explicit_file_is_error() {
    env::remove_var(CONFIG_FILE_ENV);
    let err = TomlConfig::load(Some(Path::new("/nonexistent/wmm.toml"))).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_initializer_creates_layout() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("wmm-root");
    let init = RootFolderInitializer::new(root.clone());

    init.ensure_directory_exists().unwrap();
    assert!(root.is_dir());
    assert!(init.assets_path().is_dir());
    assert_eq!(init.database_path(), root.join("wmm.db"));

    // Idempotent
    init.ensure_directory_exists().unwrap();
}
