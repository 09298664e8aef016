//! Command routing: run, skeleton and check through `RunContext`.

use crate::integration::test_utils::{completed, run_engine};
use askfile::answers::AnswerValue;
use askfile::cli::{Commands, RunContext};
use askfile::config::AskfileConfig;
use askfile::engine::{EngineOptions, SAVE_PARTIAL};
use askfile::error::{ApiError, ConfigError};
use askfile::output::{read_artifact, write_artifact};
use askfile::prompt::{AcceptDefaults, Scripted, ScriptedSurface};
use askfile::source::HandlerRegistry;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const SCHEMA: &str = r#"
name:
  default: svc
port:
  type: integer
  default: 8080
tags:
  type: multi_select
  options: [web, internal]
  default: [web]
"#;

fn workspace() -> (TempDir, RunContext) {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("schema.yml"), SCHEMA).unwrap();
    let context = RunContext::with_config(temp.path().to_path_buf(), AskfileConfig::default());
    (temp, context)
}

fn run_command(output: Option<&str>, no_summary: bool) -> Commands {
    Commands::Run {
        schema: Some(PathBuf::from("schema.yml")),
        output: output.map(PathBuf::from),
        defaults: true,
        array_scope: None,
        no_summary,
    }
}

#[test]
fn test_run_writes_json_artifact_with_summary() {
    let (temp, context) = workspace();
    let output = context
        .execute_with_surface(
            &run_command(Some("out/answers.json"), false),
            &mut AcceptDefaults::new(),
        )
        .unwrap();

    assert!(output.success);
    assert!(output.text.contains("Final answers"));
    assert!(output.text.contains("Configuration saved to"));

    let path = temp.path().join("out/answers.json");
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, json!({"name": "svc", "port": 8080, "tags": ["web"]}));
    assert_eq!(read_artifact(&path).unwrap().to_json(), written);
}

#[test]
fn test_run_writes_yaml_without_summary() {
    let (temp, context) = workspace();
    let output = context
        .execute_with_surface(
            &run_command(Some("answers.yml"), true),
            &mut AcceptDefaults::new(),
        )
        .unwrap();

    assert!(!output.text.contains("Final answers"));
    let content = fs::read_to_string(temp.path().join("answers.yml")).unwrap();
    let parsed: serde_yaml_ng::Value = serde_yaml_ng::from_str(&content).unwrap();
    assert_eq!(parsed["port"].as_i64(), Some(8080));
    assert!(content.find("name").unwrap() < content.find("tags").unwrap());
}

#[test]
fn test_run_without_output_prints_yaml() {
    let (temp, context) = workspace();
    let output = context
        .execute_with_surface(&run_command(None, false), &mut AcceptDefaults::new())
        .unwrap();

    assert!(output.success);
    let parsed: AnswerValue = serde_yaml_ng::from_str(&output.text).unwrap();
    assert_eq!(parsed.to_json(), json!({"name": "svc", "port": 8080, "tags": ["web"]}));
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn test_partial_run_is_saved_and_reported() {
    let (temp, context) = workspace();
    let mut surface = ScriptedSurface::new(vec![
        Scripted::text("api"),
        Scripted::Interrupt,
        Scripted::choose(SAVE_PARTIAL),
    ]);
    let output = context
        .execute_with_surface(&run_command(Some("partial.yml"), true), &mut surface)
        .unwrap();

    assert!(output.success);
    assert!(output.text.starts_with("Partial results saved to"));
    let saved = read_artifact(&temp.path().join("partial.yml")).unwrap();
    assert_eq!(saved.to_json()["name"], json!("api"));
}

#[test]
fn test_discarded_and_forced_runs_write_nothing() {
    let (temp, context) = workspace();
    let mut discard = ScriptedSurface::new(vec![
        Scripted::Interrupt,
        Scripted::choose(askfile::engine::DISCARD),
    ]);
    let output = context
        .execute_with_surface(&run_command(Some("out.yml"), false), &mut discard)
        .unwrap();
    assert!(!output.success);
    assert_eq!(output.text, "Exiting without saving.");

    let mut force = ScriptedSurface::new(vec![Scripted::Interrupt, Scripted::Interrupt]);
    let output = context
        .execute_with_surface(&run_command(Some("out.yml"), false), &mut force)
        .unwrap();
    assert!(!output.success);
    assert_eq!(output.text, "Force exit. No data saved.");
    assert!(!temp.path().join("out.yml").exists());
}

#[test]
fn test_configured_paths_are_used_when_flags_are_absent() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("schema.yml"), SCHEMA).unwrap();
    let config = AskfileConfig {
        schema_path: Some(PathBuf::from("schema.yml")),
        output_path: Some(PathBuf::from("configured.json")),
        ..AskfileConfig::default()
    };
    let context = RunContext::with_config(temp.path().to_path_buf(), config);
    let command = Commands::Run {
        schema: None,
        output: None,
        defaults: true,
        array_scope: None,
        no_summary: true,
    };
    context
        .execute_with_surface(&command, &mut AcceptDefaults::new())
        .unwrap();
    assert!(temp.path().join("configured.json").exists());
}

#[test]
fn test_missing_schema_path_is_a_config_error() {
    let temp = TempDir::new().unwrap();
    let context = RunContext::with_config(temp.path().to_path_buf(), AskfileConfig::default());
    let command = Commands::Check { schema: None };
    let err = context
        .execute_with_surface(&command, &mut AcceptDefaults::new())
        .unwrap_err();
    assert!(matches!(err, ApiError::Config(ConfigError::MissingSchemaPath)));
}

#[test]
fn test_skeleton_command_renders_requested_format() {
    let (_temp, context) = workspace();
    let command = Commands::Skeleton {
        schema: Some(PathBuf::from("schema.yml")),
        format: "json".to_string(),
    };
    let output = context
        .execute_with_surface(&command, &mut AcceptDefaults::new())
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output.text).unwrap();
    assert_eq!(parsed, json!({"name": "svc", "port": 8080, "tags": ["web"]}));

    let bad = Commands::Skeleton {
        schema: Some(PathBuf::from("schema.yml")),
        format: "xml".to_string(),
    };
    let err = context
        .execute_with_surface(&bad, &mut AcceptDefaults::new())
        .unwrap_err();
    assert!(matches!(err, ApiError::Config(ConfigError::Invalid(_))));
}

#[test]
fn test_check_command_lists_problems() {
    let (temp, context) = workspace();
    let clean = context
        .execute_with_surface(
            &Commands::Check {
                schema: Some(PathBuf::from("schema.yml")),
            },
            &mut AcceptDefaults::new(),
        )
        .unwrap();
    assert!(clean.success);
    assert!(clean.text.ends_with("no problems found"));

    fs::write(
        temp.path().join("broken.yml"),
        "code:\n  validate: /[/\nregion:\n  type: select\n  source: {type: handler, handler: ghost}\n",
    )
    .unwrap();
    let broken = context
        .execute_with_surface(
            &Commands::Check {
                schema: Some(PathBuf::from("broken.yml")),
            },
            &mut AcceptDefaults::new(),
        )
        .unwrap();
    assert!(!broken.success);
    assert!(broken.text.contains("2 problem(s) found"));
    assert!(broken.text.contains("[validation] code"));
    assert!(broken.text.contains("[handler] region"));
}

#[test]
fn test_non_finite_float_input_round_trips_as_text() {
    let yaml = r#"
ratio:
  convert: float
scale:
  convert: float
"#;
    let registry = HandlerRegistry::new();
    let (report, _) = run_engine(
        yaml,
        &registry,
        EngineOptions::default(),
        vec![Scripted::text("inf"), Scripted::text("2.5")],
    );
    let value = completed(&report);
    assert_eq!(value.to_json(), json!({"ratio": "inf", "scale": 2.5}));

    let temp = TempDir::new().unwrap();
    for name in ["answers.json", "answers.yml"] {
        let path = temp.path().join(name);
        write_artifact(value, &path).unwrap();
        assert_eq!(&read_artifact(&path).unwrap(), value);
    }
}
