//! Integration tests for `june ask` without a configured API key.
//!
//! Every reply here comes from the local knowledge base, so no network
//! request is made.

mod common;

use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

use common::{june_with_config, missing_config};

const EMAIL: &str = "dannyjoseph3007@outlook.com";

#[test]
fn test_ask_contact_returns_email() {
    let temp = TempDir::new().expect("create temp dir");

    june_with_config(&missing_config(&temp))
        .args(["ask", "How can I contact Daniel?"])
        .assert()
        .success()
        .stdout(predicate::str::contains(EMAIL))
        .stderr(predicate::str::contains("local knowledge"));
}

#[test]
fn test_ask_joins_unquoted_words() {
    let temp = TempDir::new().expect("create temp dir");

    june_with_config(&missing_config(&temp))
        .args(["ask", "How", "to", "contact", "him?"])
        .assert()
        .success()
        .stdout(predicate::str::contains(EMAIL));
}

#[test]
fn test_ask_json_reports_fallback_origin() {
    let temp = TempDir::new().expect("create temp dir");

    let output = june_with_config(&missing_config(&temp))
        .args(["ask", "How can I contact Daniel?", "--json"])
        .output()
        .expect("run june ask");
    assert!(output.status.success());

    let reply: Value = serde_json::from_slice(&output.stdout).expect("valid JSON reply");
    assert_eq!(reply["origin"], "fallback");
    assert!(reply["text"].as_str().unwrap().contains(EMAIL));
    assert_eq!(reply["chunkIds"][0], "personal-2");
}

#[test]
fn test_ask_greeting_uses_persona_greeting() {
    let temp = TempDir::new().expect("create temp dir");

    june_with_config(&missing_config(&temp))
        .args(["ask", "Hello June"])
        .assert()
        .success()
        .stdout(predicate::str::contains("I'm June, Daniel's AI assistant"));
}

#[test]
fn test_ask_unrelated_query_uses_default_reply() {
    let temp = TempDir::new().expect("create temp dir");

    june_with_config(&missing_config(&temp))
        .args(["ask", "xyzzy qqq"])
        .assert()
        .success()
        .stdout(predicate::str::contains("What would you like to know?"));
}

#[test]
fn test_ask_blank_query_fails() {
    let temp = TempDir::new().expect("create temp dir");

    june_with_config(&missing_config(&temp))
        .args(["ask", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Query must not be empty"));
}

#[test]
fn test_ask_requires_a_query() {
    june_with_config(std::path::Path::new("unused.yaml"))
        .arg("ask")
        .assert()
        .failure();
}
