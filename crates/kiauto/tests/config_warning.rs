//! Integration tests for config warning behavior.
//!
//! These tests verify that the CLI properly warns users when config files have errors.

mod common;

use common::{fake_clipboard, run_kiauto, write_project_config};

/// Test that an invalid config file produces a warning in stderr.
#[test]
fn test_config_warning_on_invalid_toml() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    write_project_config(temp_dir.path(), "invalid toml [[[");

    // The command may fail later (no clipboard tool), but the warning comes first
    let output = run_kiauto(temp_dir.path(), &["clipboard", "retrieve"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        stderr.contains("Warning: Could not load config"),
        "Expected warning in stderr, got: {}",
        stderr
    );
    assert!(
        stderr.contains("Tip: Check"),
        "Expected tip about config files in stderr, got: {}",
        stderr
    );
}

/// Test that a config failing validation also falls back with a warning.
#[test]
fn test_config_warning_on_invalid_values() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    write_project_config(temp_dir.path(), "[display]\ncolor_depth = 12\n");

    let output = run_kiauto(temp_dir.path(), &["clipboard", "retrieve"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        stderr.contains("Invalid color depth 12"),
        "Expected validation message in stderr, got: {}",
        stderr
    );
}

/// Test that a valid config file does not produce warnings.
#[test]
fn test_no_warning_on_valid_config() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let clipboard = fake_clipboard(temp_dir.path());
    write_project_config(
        temp_dir.path(),
        &format!(
            "[display]\nwidth = 1280\n\n[tools]\nclipboard_tool = '{}'\n",
            clipboard.display()
        ),
    );

    let output = run_kiauto(temp_dir.path(), &["clipboard", "retrieve"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success());
    assert!(
        !stderr.contains("Warning: Could not load config"),
        "Unexpected config warning in stderr: {}",
        stderr
    );
}
