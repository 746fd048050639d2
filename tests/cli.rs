//! End-to-end checks of the binary's exit-code contract: missing required
//! flags exit 1 with a message on stderr, an unreadable tools file exits 2,
//! and dispatcher-level failures stay exit 0 with a JSON error object.

use std::process::{Command, Output};

fn devrunner(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_devrunner"))
        .args(args)
        .output()
        .expect("failed to run devrunner binary")
}

#[test]
fn execute_without_code_exits_1() {
    let out = devrunner(&["execute", "--server", "typescript"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("--code is required"), "stderr was: {stderr}");
    // No partial result on stdout.
    assert!(out.stdout.is_empty());
}

#[test]
fn execute_without_server_exits_1() {
    let out = devrunner(&["execute", "--code", "print(1)"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("--server is required"));
}

#[test]
fn analyze_without_file_exits_1() {
    let out = devrunner(&["analyze"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("--file is required"));
}

#[test]
fn format_without_file_exits_1() {
    let out = devrunner(&["format"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("--file is required"));
}

#[test]
fn chat_without_message_exits_1() {
    let out = devrunner(&["chat"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("--message is required"));
}

#[test]
fn unreadable_tools_file_exits_2() {
    let out = devrunner(&["servers", "--tools", "/no/such/devrunner-tools.yaml"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Invalid tools file"));
}

#[test]
fn unknown_server_is_json_error_with_exit_0() {
    let out = devrunner(&["execute", "--server", "nonexistent", "--code", "x"]);
    assert_eq!(out.status.code(), Some(0));
    let value: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("stdout should be JSON");
    assert_eq!(value["error"], "tool nonexistent not found");
    assert_eq!(value["tool"], "nonexistent");
}

#[test]
fn servers_prints_registry_with_versions() {
    let out = devrunner(&["servers"]);
    assert_eq!(out.status.code(), Some(0));
    let value: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("stdout should be JSON");
    let tools = value.as_array().expect("registry output is a list");
    assert_eq!(tools[0]["name"], "typescript");
    assert_eq!(tools[0]["version"], "5.3.3");
    assert_eq!(tools[1]["version"], "3.12.0");
}
