//! End-to-end traversal over a realistic schema.

use crate::integration::test_utils::{at, completed, run_engine};
use askfile::answers::AnswerStore;
use askfile::engine::{DiagnosticKind, EngineOptions};
use askfile::prompt::{CaptureKind, Scripted};
use askfile::schema::Schema;
use askfile::source::HandlerRegistry;
use serde_json::json;

const SERVICE_SCHEMA: &str = r#"
app_name:
  prompt: Application name
  help: Lowercase letters, digits and dashes
  validate: /^[a-z][a-z0-9-]*$/
  transform: value|upper
environment:
  type: select
  options: [dev, prod]
  default: dev
use_tls:
  type: boolean
  default: false
tls:
  type: hash
  prompt: TLS
  skip_if: use_tls == false
  children:
    cert:
      default: cert.pem
server_count:
  type: integer
  default: 1
servers:
  type: array
  prompt: server
  length: server_count
  children:
    host: {}
    port:
      default: "8080"
      convert: int
"#;

#[test]
fn test_service_schema_end_to_end() {
    let registry = HandlerRegistry::with_builtins();
    let (report, surface) = run_engine(
        SERVICE_SCHEMA,
        &registry,
        EngineOptions::default(),
        vec![
            Scripted::text("Bad Name"),
            Scripted::text("my-app"),
            Scripted::choose("prod"),
            Scripted::YesNo(false),
            Scripted::text("2"),
            Scripted::text("a.internal"),
            Scripted::AcceptDefault,
            Scripted::text("b.internal"),
            Scripted::text("9090"),
        ],
    );

    let value = completed(&report);
    assert_eq!(at(value, "/app_name"), json!("MY-APP"));
    assert_eq!(at(value, "/environment"), json!("prod"));
    assert_eq!(at(value, "/tls/cert"), json!("cert.pem"));
    assert_eq!(at(value, "/server_count"), json!(2));
    assert_eq!(at(value, "/servers/0/port"), json!(8080));
    assert_eq!(at(value, "/servers/1/host"), json!("b.internal"));
    assert_eq!(at(value, "/servers/1/port"), json!(9090));

    assert_eq!(surface.rejections(), ["Invalid format".to_string()]);
    assert_eq!(
        surface.help_shown(),
        ["Lowercase letters, digits and dashes".to_string()]
    );
    assert_eq!(
        surface.sections(),
        ["server #1".to_string(), "server #2".to_string()]
    );
    assert!(report.diagnostics.is_empty());
    assert_eq!(surface.remaining(), 0);
}

#[test]
fn test_top_level_keys_keep_declaration_order() {
    let registry = HandlerRegistry::new();
    let (report, _) = run_engine(
        "zeta: {default: z}\nalpha: {default: a}\nmid: {default: m}\n",
        &registry,
        EngineOptions::default(),
        vec![Scripted::AcceptDefault; 3],
    );
    let keys: Vec<&str> = completed(&report).as_map().unwrap().keys().collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_skip_sees_answers_committed_earlier_in_the_run() {
    let yaml = r#"
mode:
  type: select
  options: [simple, advanced]
tuning:
  type: hash
  skip_if: mode == 'simple'
  children:
    workers:
      type: integer
      default: 4
"#;
    let registry = HandlerRegistry::new();

    let (report, surface) = run_engine(
        yaml,
        &registry,
        EngineOptions::default(),
        vec![Scripted::choose("simple")],
    );
    assert_eq!(surface.captures().len(), 1);
    assert_eq!(at(completed(&report), "/tuning/workers"), json!(4));

    let (report, surface) = run_engine(
        yaml,
        &registry,
        EngineOptions::default(),
        vec![Scripted::choose("advanced"), Scripted::text("16")],
    );
    assert_eq!(surface.captures().len(), 2);
    assert_eq!(at(completed(&report), "/tuning/workers"), json!(16));
}

#[test]
fn test_multi_select_defaults() {
    let yaml = r#"
features:
  type: multi_select
  options: [auth, cache, metrics]
  default: [cache, metrics]
"#;
    let registry = HandlerRegistry::new();
    let (report, surface) = run_engine(
        yaml,
        &registry,
        EngineOptions::default(),
        vec![Scripted::AcceptDefault],
    );
    assert_eq!(surface.captures()[0].kind, CaptureKind::SelectMany);
    assert_eq!(at(completed(&report), "/features"), json!(["cache", "metrics"]));
}

#[test]
fn test_unusable_computed_length_yields_empty_array() {
    let yaml = r#"
name:
  default: web
replicas:
  type: array
  length: name
  children:
    zone: {}
"#;
    let registry = HandlerRegistry::new();
    let (report, surface) = run_engine(
        yaml,
        &registry,
        EngineOptions::default(),
        vec![Scripted::AcceptDefault],
    );
    assert_eq!(at(completed(&report), "/replicas"), json!([]));
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::Expression);
    assert_eq!(report.diagnostics[0].path, "replicas");
    assert_eq!(surface.notices().len(), 1);
}

#[test]
fn test_computed_length_above_cap_yields_empty_array() {
    let yaml = r#"
replicas:
  type: array
  length: "1000 * 1000"
  children:
    zone: {}
"#;
    let registry = HandlerRegistry::new();
    let (report, surface) = run_engine(yaml, &registry, EngineOptions::default(), vec![]);
    assert_eq!(at(completed(&report), "/replicas"), json!([]));
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::Expression);
    assert_eq!(surface.captures().len(), 0);
}

#[test]
fn test_accepted_numeric_default_on_text_field_matches_skeleton() {
    let yaml = r#"
listen_port:
  default: 8080
"#;
    let registry = HandlerRegistry::new();
    let (report, _) = run_engine(
        yaml,
        &registry,
        EngineOptions::default(),
        vec![Scripted::AcceptDefault],
    );
    let skeleton = AnswerStore::skeleton(&Schema::from_yaml_str(yaml).unwrap()).into_value();
    assert_eq!(completed(&report), &skeleton);
    assert_eq!(at(&skeleton, "/listen_port"), json!("8080"));
}

#[test]
fn test_nested_arrays_inside_array_elements() {
    let yaml = r#"
clusters:
  type: array
  prompt: cluster
  length: 2
  children:
    name: {}
    nodes:
      type: array
      prompt: node
      children:
        ip: {}
"#;
    let registry = HandlerRegistry::new();
    let (report, surface) = run_engine(
        yaml,
        &registry,
        EngineOptions::default(),
        vec![
            Scripted::text("east"),
            Scripted::text("2"),
            Scripted::text("10.0.0.1"),
            Scripted::text("10.0.0.2"),
            Scripted::text("west"),
            Scripted::text("0"),
        ],
    );
    let value = completed(&report);
    assert_eq!(at(value, "/clusters/0/nodes/1/ip"), json!("10.0.0.2"));
    assert_eq!(at(value, "/clusters/1/name"), json!("west"));
    assert_eq!(at(value, "/clusters/1/nodes"), json!([]));
    assert!(surface.prompts().contains(&"How many node?"));
}

#[test]
fn test_false_flag_skips_group_without_asking() {
    let yaml = r#"
a:
  type: boolean
b:
  type: hash
  skip_if: a == false
  children:
    x:
      default: kept
"#;
    let registry = HandlerRegistry::new();
    let (report, surface) = run_engine(
        yaml,
        &registry,
        EngineOptions::default(),
        vec![Scripted::YesNo(false)],
    );
    assert_eq!(surface.prompts(), vec!["a"]);
    assert_eq!(at(completed(&report), "/b/x"), json!("kept"));
}

#[test]
fn test_length_counts_earlier_selection() {
    let yaml = r#"
items:
  type: multi_select
  options: [red, green, blue, black]
groups:
  type: array
  prompt: group
  length: items|count
  children:
    label: {}
"#;
    let registry = HandlerRegistry::new();
    let (report, surface) = run_engine(
        yaml,
        &registry,
        EngineOptions::default(),
        vec![
            Scripted::choose_many(["red", "green", "blue"]),
            Scripted::text("one"),
            Scripted::text("two"),
            Scripted::text("three"),
        ],
    );
    let groups = at(completed(&report), "/groups");
    assert_eq!(groups.as_array().unwrap().len(), 3);
    assert_eq!(surface.sections().len(), 3);
    assert_eq!(surface.remaining(), 0);
}
