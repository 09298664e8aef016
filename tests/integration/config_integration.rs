//! Integration tests for layered configuration

use crate::integration::test_utils::with_xdg_env;
use askfile::cli::RunContext;
use askfile::config::ConfigLoader;
use askfile::engine::ArrayScope;
use askfile::error::ConfigError;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_global(test_dir: &TempDir, content: &str) {
    let dir = test_dir.path().join("askfile");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), content).unwrap();
}

#[test]
fn test_defaults_without_any_file() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let config = with_xdg_env(&test_dir, || ConfigLoader::load(workspace.path()).unwrap());

    assert!(config.schema_path.is_none());
    assert!(config.output_path.is_none());
    assert_eq!(config.traversal.array_scope, ArrayScope::Live);
    assert!(config.traversal.show_summary);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_workspace_file_overrides_global_file() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write_global(
        &test_dir,
        "schema_path = \"global.yml\"\noutput_path = \"global-out.yml\"\n\n[traversal]\nshow_summary = false\n",
    );
    fs::write(
        workspace.path().join("askfile.toml"),
        "schema_path = \"local.yml\"\n\n[traversal]\narray_scope = \"isolated\"\n",
    )
    .unwrap();

    let config = with_xdg_env(&test_dir, || ConfigLoader::load(workspace.path()).unwrap());
    assert_eq!(config.schema_path, Some(PathBuf::from("local.yml")));
    assert_eq!(config.output_path, Some(PathBuf::from("global-out.yml")));
    assert_eq!(config.traversal.array_scope, ArrayScope::Isolated);
    assert!(!config.traversal.show_summary);
}

#[test]
fn test_environment_overrides_files() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    fs::write(
        workspace.path().join("askfile.toml"),
        "[traversal]\narray_scope = \"isolated\"\n",
    )
    .unwrap();

    let config = with_xdg_env(&test_dir, || {
        std::env::set_var("ASKFILE__TRAVERSAL__ARRAY_SCOPE", "live");
        let loaded = ConfigLoader::load(workspace.path());
        std::env::remove_var("ASKFILE__TRAVERSAL__ARRAY_SCOPE");
        loaded.unwrap()
    });
    assert_eq!(config.traversal.array_scope, ArrayScope::Live);
}

#[test]
fn test_explicit_config_file() {
    let workspace = TempDir::new().unwrap();
    fs::write(
        workspace.path().join("custom.toml"),
        "schema_path = \"questions.yml\"\n\n[logging]\nlevel = \"debug\"\n",
    )
    .unwrap();

    let context = RunContext::new(
        workspace.path().to_path_buf(),
        Some(PathBuf::from("custom.toml")),
    )
    .unwrap();
    assert_eq!(
        context.config().schema_path,
        Some(PathBuf::from("questions.yml"))
    );
    assert_eq!(context.config().logging.level, "debug");
}

#[test]
fn test_missing_explicit_config_file_is_rejected() {
    let workspace = TempDir::new().unwrap();
    let err = ConfigLoader::load_from_file(&workspace.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_empty_schema_path_is_rejected() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    fs::write(workspace.path().join("askfile.toml"), "schema_path = \"\"\n").unwrap();
    let result = with_xdg_env(&test_dir, || ConfigLoader::load(workspace.path()));
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}
