//! Integration tests for the interactive `june chat` loop fed from stdin.

mod common;

use predicates::prelude::*;
use tempfile::TempDir;

use common::{june_with_config, missing_config};

#[test]
fn test_chat_greets_and_exits_on_eof() {
    let temp = TempDir::new().expect("create temp dir");

    june_with_config(&missing_config(&temp))
        .arg("chat")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("june> Hi there!"))
        .stdout(predicate::str::contains("No API key configured"))
        .stdout(predicate::str::contains("Goodbye"));
}

#[test]
fn test_chat_commands_and_local_replies() {
    let temp = TempDir::new().expect("create temp dir");

    june_with_config(&missing_config(&temp))
        .arg("chat")
        .write_stdin("/suggest\nHow can I contact Daniel?\n/history\n/exit\nnever read\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Who is Daniel?"))
        .stdout(predicate::str::contains("dannyjoseph3007@outlook.com"))
        .stdout(predicate::str::contains("No turns recorded yet"))
        .stdout(predicate::str::contains("never read").not());
}

#[test]
fn test_chat_reset_and_unknown_command() {
    let temp = TempDir::new().expect("create temp dir");

    june_with_config(&missing_config(&temp))
        .args(["--quiet", "chat"])
        .write_stdin("/reset\n/dance\n/quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Conversation reset"))
        .stdout(predicate::str::contains("Unknown command '/dance'"))
        .stdout(predicate::str::contains("Goodbye").not());
}
