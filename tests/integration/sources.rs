//! Option sources: directories, datasets and registered handlers.

use crate::integration::test_utils::{at, completed, run_engine};
use askfile::engine::{DiagnosticKind, EngineOptions};
use askfile::error::HandlerError;
use askfile::prompt::Scripted;
use askfile::source::HandlerRegistry;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn options_in(dir: &TempDir) -> EngineOptions {
    EngineOptions {
        base_dir: Some(dir.path().to_path_buf()),
        ..EngineOptions::default()
    }
}

#[test]
fn test_directory_source_lists_files_relative_to_base_dir() {
    let temp = TempDir::new().unwrap();
    let templates = temp.path().join("templates");
    fs::create_dir_all(templates.join("nested")).unwrap();
    fs::write(templates.join("web.tmpl"), "").unwrap();
    fs::write(templates.join("api.tmpl"), "").unwrap();
    fs::write(templates.join("nested").join("hidden.tmpl"), "").unwrap();

    let yaml = r#"
template:
  type: select
  source:
    type: directory
    path: templates
"#;
    let registry = HandlerRegistry::new();
    let (report, surface) = run_engine(
        yaml,
        &registry,
        options_in(&temp),
        vec![Scripted::choose("web.tmpl")],
    );
    assert_eq!(
        surface.captures()[0].options,
        vec!["api.tmpl".to_string(), "web.tmpl".to_string()]
    );
    assert_eq!(at(completed(&report), "/template"), json!("web.tmpl"));
}

#[test]
fn test_dataset_source_offers_mapping_keys_in_file_order() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("regions.yml"),
        "us-east:\n  zones: 3\neu-west:\n  zones: 2\nap-south:\n  zones: 1\n",
    )
    .unwrap();

    let yaml = r#"
region:
  type: select
  source:
    type: dataset
    path: regions.yml
"#;
    let registry = HandlerRegistry::new();
    let (_, surface) = run_engine(
        yaml,
        &registry,
        options_in(&temp),
        vec![Scripted::AcceptDefault],
    );
    assert_eq!(
        surface.captures()[0].options,
        vec!["us-east".to_string(), "eu-west".to_string(), "ap-south".to_string()]
    );
}

#[test]
fn test_missing_directory_reports_source_diagnostic() {
    let temp = TempDir::new().unwrap();
    let yaml = r#"
template:
  type: select
  default: none
  source:
    type: directory
    path: does-not-exist
"#;
    let registry = HandlerRegistry::new();
    let (report, surface) = run_engine(yaml, &registry, options_in(&temp), vec![]);
    assert!(surface.captures().is_empty());
    assert_eq!(at(completed(&report), "/template"), json!("none"));
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::Source);
}

#[test]
fn test_feature_flags_accumulate_up_to_selected_release() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("features.yml"),
        r#"
feature_flags:
  releases:
    "3.2.0": [f9]
    "3.1.5.2": [f1, f2]
    "3.1.5.3": [f3, f2]
"#,
    )
    .unwrap();

    let yaml = r#"
release_version:
  type: select
  options: ["3.1.5.2", "3.1.5.3", "3.2.0"]
flags:
  type: multi_select
  source:
    type: handler
    handler: feature_flags
    method: filter_by_release
    data_file: features.yml
"#;
    let registry = HandlerRegistry::with_builtins();
    let (report, surface) = run_engine(
        yaml,
        &registry,
        options_in(&temp),
        vec![
            Scripted::choose("3.1.5.3"),
            Scripted::choose_many(["f1", "f3"]),
        ],
    );
    assert_eq!(
        surface.captures()[1].options,
        vec!["f1".to_string(), "f2".to_string(), "f3".to_string()]
    );
    assert_eq!(at(completed(&report), "/flags"), json!(["f1", "f3"]));
}

#[test]
fn test_handler_receives_current_answers_and_config() {
    let mut registry = HandlerRegistry::new();
    registry.register("zones", "for_cloud", |answers, config| {
        let cloud = answers
            .as_map()
            .and_then(|m| m.get("cloud"))
            .and_then(|v| v.as_str())
            .unwrap_or("none")
            .to_string();
        let count = config.get("count").and_then(|v| v.as_u64()).unwrap_or(1);
        Ok((1..=count).map(|i| format!("{}-{}", cloud, i)).collect())
    });

    let yaml = r#"
cloud:
  type: select
  options: [aws, gcp]
zone:
  type: select
  source:
    type: handler
    handler: zones
    method: for_cloud
    count: 2
"#;
    let (report, surface) = run_engine(
        yaml,
        &registry,
        EngineOptions::default(),
        vec![Scripted::choose("gcp"), Scripted::choose("gcp-2")],
    );
    assert_eq!(
        surface.captures()[1].options,
        vec!["gcp-1".to_string(), "gcp-2".to_string()]
    );
    assert_eq!(at(completed(&report), "/zone"), json!("gcp-2"));
}

#[test]
fn test_failing_and_panicking_handlers_become_diagnostics() {
    let mut registry = HandlerRegistry::new();
    registry.register("broken", "call", |_, _| {
        Err(HandlerError::failed("broken", "backend unavailable"))
    });
    registry.register("explodes", "call", |_, _| panic!("handler blew up"));

    let yaml = r#"
first:
  type: select
  default: a
  source: {type: handler, handler: broken}
second:
  type: multi_select
  default: [b]
  source: {type: handler, handler: explodes}
third:
  type: select
  source: {type: handler, handler: unregistered}
last: {}
"#;
    let (report, surface) = run_engine(
        yaml,
        &registry,
        EngineOptions::default(),
        vec![Scripted::text("reached")],
    );

    let value = completed(&report);
    assert_eq!(at(value, "/first"), json!("a"));
    assert_eq!(at(value, "/second"), json!(["b"]));
    assert_eq!(at(value, "/third"), json!(null));
    assert_eq!(at(value, "/last"), json!("reached"));

    let kinds: Vec<DiagnosticKind> = report.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DiagnosticKind::Handler; 3]);
    assert!(report.diagnostics[1].message.contains("handler blew up"));
    assert_eq!(surface.captures().len(), 1);
}
