//! Shared test utilities for june-cli integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Get a Command for the june binary with no credentials and no colors.
///
/// # Panics
///
/// Panics if the june binary cannot be found. This should not happen
/// in a properly configured test environment.
#[allow(deprecated)]
pub fn june_cmd() -> Command {
    let mut cmd = Command::cargo_bin("june").expect("june binary should exist");
    cmd.env_remove("GEMINI_API_KEY")
        .env_remove("JUNE_CONFIG")
        .env_remove("JUNE_VERBOSE")
        .env_remove("JUNE_QUIET")
        .env("NO_COLOR", "1");
    cmd
}

/// A june command reading its configuration from `config` instead of
/// `~/.june/config.yaml`.
pub fn june_with_config(config: &Path) -> Command {
    let mut cmd = june_cmd();
    cmd.arg("--config").arg(config);
    cmd
}

/// Write `content` as `config.yaml` inside `dir` and return its path.
pub fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.yaml");
    fs::write(&path, content).expect("write config file");
    path
}

/// Path of a config file that does not exist, so defaults apply.
pub fn missing_config(dir: &TempDir) -> PathBuf {
    dir.path().join("absent.yaml")
}
