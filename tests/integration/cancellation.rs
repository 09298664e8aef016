//! Interrupt handling through the pause menu.

use crate::integration::test_utils::{at, run_engine};
use askfile::answers::{AnswerStore, AnswerValue};
use askfile::engine::{ArrayScope, EngineOptions, RunOutcome, DISCARD, PAUSE_PROMPT, SAVE_PARTIAL};
use askfile::prompt::{CaptureKind, Scripted};
use askfile::schema::Schema;
use askfile::source::HandlerRegistry;
use serde_json::json;

const SCHEMA: &str = r#"
name:
  default: svc
port:
  type: integer
  default: 80
servers:
  type: array
  length: 2
  children:
    host: {}
"#;

#[test]
fn test_interrupt_then_save_keeps_committed_answers() {
    let registry = HandlerRegistry::new();
    let (report, surface) = run_engine(
        SCHEMA,
        &registry,
        EngineOptions::default(),
        vec![
            Scripted::text("api"),
            Scripted::Interrupt,
            Scripted::choose(SAVE_PARTIAL),
        ],
    );

    let RunOutcome::Partial(value) = &report.outcome else {
        panic!("expected partial outcome, got {:?}", report.outcome);
    };
    assert_eq!(at(value, "/name"), json!("api"));
    assert_eq!(at(value, "/port"), json!(80));

    let skeleton = AnswerStore::skeleton(&Schema::from_yaml_str(SCHEMA).unwrap()).into_value();
    assert_eq!(value.shape(), skeleton.shape());

    let pause = surface.captures().last().unwrap();
    assert_eq!(pause.kind, CaptureKind::SelectOne);
    assert_eq!(pause.prompt, PAUSE_PROMPT);
    assert_eq!(
        pause.options,
        vec![SAVE_PARTIAL.to_string(), DISCARD.to_string()]
    );
}

#[test]
fn test_interrupt_inside_array_keeps_finished_elements() {
    let registry = HandlerRegistry::new();
    let (report, _) = run_engine(
        SCHEMA,
        &registry,
        EngineOptions::default(),
        vec![
            Scripted::AcceptDefault,
            Scripted::AcceptDefault,
            Scripted::text("a.internal"),
            Scripted::Interrupt,
            Scripted::choose(SAVE_PARTIAL),
        ],
    );
    let value = report.artifact().unwrap();
    assert_eq!(at(value, "/servers/0/host"), json!("a.internal"));
    assert_eq!(at(value, "/servers/1/host"), json!(null));
}

const FIXED_ARRAY_SCHEMA: &str = r#"
name:
  default: svc
servers:
  type: array
  length: 3
  children:
    host:
      default: h
tail:
  default: t
"#;

fn partial_keeps_skeleton_shape(options: EngineOptions, script: Vec<Scripted>) -> AnswerValue {
    let registry = HandlerRegistry::new();
    let (report, _) = run_engine(FIXED_ARRAY_SCHEMA, &registry, options, script);
    let RunOutcome::Partial(value) = report.outcome else {
        panic!("expected partial outcome, got {:?}", report.outcome);
    };
    let skeleton =
        AnswerStore::skeleton(&Schema::from_yaml_str(FIXED_ARRAY_SCHEMA).unwrap()).into_value();
    assert_eq!(value.shape(), skeleton.shape());
    value
}

#[test]
fn test_interrupt_at_first_element_keeps_full_array() {
    let value = partial_keeps_skeleton_shape(
        EngineOptions::default(),
        vec![
            Scripted::text("api"),
            Scripted::Interrupt,
            Scripted::choose(SAVE_PARTIAL),
        ],
    );
    assert_eq!(at(&value, "/name"), json!("api"));
    assert_eq!(at(&value, "/servers"), json!([{"host": "h"}, {"host": "h"}, {"host": "h"}]));
    assert_eq!(at(&value, "/tail"), json!("t"));
}

#[test]
fn test_interrupt_mid_array_with_isolated_scope_keeps_full_array() {
    let options = EngineOptions {
        array_scope: ArrayScope::Isolated,
        ..EngineOptions::default()
    };
    let value = partial_keeps_skeleton_shape(
        options,
        vec![
            Scripted::AcceptDefault,
            Scripted::text("a"),
            Scripted::Interrupt,
            Scripted::choose(SAVE_PARTIAL),
        ],
    );
    assert_eq!(at(&value, "/servers"), json!([{"host": "a"}, {"host": "h"}, {"host": "h"}]));
}

#[test]
fn test_interrupt_then_discard_produces_nothing() {
    let registry = HandlerRegistry::new();
    let (report, _) = run_engine(
        SCHEMA,
        &registry,
        EngineOptions::default(),
        vec![Scripted::Interrupt, Scripted::choose(DISCARD)],
    );
    assert_eq!(report.outcome, RunOutcome::Discarded);
    assert!(report.artifact().is_none());
}

#[test]
fn test_second_interrupt_while_paused_forces_exit() {
    let registry = HandlerRegistry::new();
    let (report, surface) = run_engine(
        SCHEMA,
        &registry,
        EngineOptions::default(),
        vec![Scripted::text("api"), Scripted::Interrupt, Scripted::Interrupt],
    );
    assert_eq!(report.outcome, RunOutcome::ForceQuit);
    assert!(report.into_artifact().is_none());
    assert_eq!(surface.remaining(), 0);
}
