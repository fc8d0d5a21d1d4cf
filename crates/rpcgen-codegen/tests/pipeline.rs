#![cfg(unix)]

use rpcgen_codegen::{
    FormatFailure, FormatterCommand, GenerateError, GenerateOptions, GeneratorConfig, OnTimeout,
    Target, generate, generate_all, generate_formatted,
};
use rpcgen_schema::{Schema, validate_document};
use serde_json::json;
use std::sync::Arc;

fn schema() -> Schema {
    validate_document(&json!({
        "types": [
            { "name": "A", "fields": { "b": "B" } },
            { "name": "B", "fields": { "a": { "type": "A", "optional": true } } }
        ],
        "procedures": [{ "name": "Noop", "kind": "mutation" }]
    }))
    .unwrap()
}

fn command(parts: &[&str]) -> FormatterCommand {
    FormatterCommand {
        command: parts.iter().map(|s| s.to_string()).collect(),
    }
}

fn config(typescript: &[&str], go: &[&str]) -> GeneratorConfig {
    let mut config = GeneratorConfig::default();
    config.formatter.typescript = command(typescript);
    config.formatter.go = command(go);
    config
}

#[tokio::test]
async fn formatter_output_is_returned() {
    let config = config(&["cat"], &[]);
    let generated = generate_formatted(&schema(), Target::TypeScript, &config)
        .await
        .unwrap();
    assert!(generated.formatted);
    assert_eq!(
        generated.source,
        generate(&schema(), Target::TypeScript, &GenerateOptions::default()).unwrap()
    );
}

#[tokio::test]
async fn disabled_formatter_returns_raw_text() {
    let config = config(&[], &[]);
    let generated = generate_formatted(&schema(), Target::Go, &config).await.unwrap();
    assert!(!generated.formatted);
    assert!(generated.source.contains("package rpc"));
}

#[tokio::test]
async fn timeout_fails_by_default_and_keeps_text() {
    let mut config = config(&["sleep", "5"], &[]);
    config.formatter.timeout_ms = 100;

    let err = generate_formatted(&schema(), Target::TypeScript, &config)
        .await
        .unwrap_err();
    let GenerateError::Formatter(err) = err else {
        panic!("expected a formatter error, got {err:?}");
    };
    assert_eq!(err.reason, FormatFailure::TimedOut(std::time::Duration::from_millis(100)));
    assert!(err.unformatted.starts_with("// Code generated by rpcgen."));
}

#[tokio::test]
async fn timeout_can_degrade_to_unformatted_text() {
    let mut config = config(&["sleep", "5"], &[]);
    config.formatter.timeout_ms = 100;
    config.formatter.on_timeout = OnTimeout::Unformatted;

    let generated = generate_formatted(&schema(), Target::TypeScript, &config)
        .await
        .unwrap();
    assert!(!generated.formatted);
    assert!(generated.source.contains("export interface A {"));
}

#[tokio::test]
async fn formatter_failure_does_not_affect_other_targets() {
    let config = config(&["sh", "-c", "cat >/dev/null; echo nope >&2; exit 1"], &["cat"]);
    let results = generate_all(Arc::new(schema()), &Target::ALL, Arc::new(config)).await;

    assert_eq!(results.len(), 2);
    match &results[0] {
        Err(GenerateError::Formatter(err)) => {
            assert_eq!(err.target, "typescript");
            assert_eq!(err.to_string(), "typescript formatter failed: exited with status 1: nope");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    let go = results[1].as_ref().unwrap();
    assert_eq!(go.target, Target::Go);
    assert!(go.formatted);
}

#[tokio::test]
async fn results_follow_requested_order() {
    let config = Arc::new(config(&[], &[]));
    let targets = [Target::Go, Target::TypeScript, Target::Go];
    let results = generate_all(Arc::new(schema()), &targets, config).await;
    let order: Vec<Target> = results.iter().map(|r| r.as_ref().unwrap().target).collect();
    assert_eq!(order, targets);
}

#[tokio::test]
async fn per_target_options_come_from_config() {
    let mut config = config(&[], &[]);
    config.go.package = Some("models".into());
    config.go.include_server = false;
    config.go.include_client = false;

    let generated = generate_formatted(&schema(), Target::Go, &config).await.unwrap();
    assert!(generated.source.contains("package models"));
    assert!(!generated.source.contains("type Server struct"));
}
