use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

const CONVERSATION: &str = "<system>\n\tBe brief.\n<user>\n\tHello\nHi there!\n<user>\n\tBye";

#[test]
fn test_messages_prints_headers() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("marsh")
        .env("MARSH_HOME", dir.path())
        .args(["messages", "-"])
        .write_stdin("<user>\n\thello\nhi")
        .assert()
        .success()
        .stdout("### User\nhello\n\n### Assistant\nhi\n");
}

#[test]
fn test_messages_json_from_file() {
    let dir = tempdir().unwrap();
    let doc = dir.path().join("chat.marsh");
    fs::write(&doc, CONVERSATION).unwrap();

    let output = cargo_bin_cmd!("marsh")
        .env("MARSH_HOME", dir.path())
        .args(["messages", "--json"])
        .arg(&doc)
        .output()
        .unwrap();
    assert!(output.status.success());

    let messages: Value = serde_json::from_slice(&output.stdout).unwrap();
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["kind"], "system");
    assert_eq!(messages[0]["content"], "Be brief.\n");
    assert_eq!(messages[2]["kind"], "assistant");
    assert_eq!(messages[3]["content"], "Bye");
}

#[test]
fn test_messages_cursor_cuts_document() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("marsh")
        .env("MARSH_HOME", dir.path())
        .args(["messages", "-", "--cursor", "10"])
        .write_stdin("<user>\n\thello\nanswer")
        .assert()
        .success()
        .stdout("### User\nhel\n");
}

#[test]
fn test_messages_cursor_out_of_bounds() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("marsh")
        .env("MARSH_HOME", dir.path())
        .args(["messages", "-", "--cursor", "99"])
        .write_stdin("short")
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of bounds"));
}

#[test]
fn test_missing_document_is_reported() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("marsh")
        .env("MARSH_HOME", dir.path())
        .arg("messages")
        .arg(dir.path().join("missing.marsh"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("read document"));
}

#[test]
fn test_request_uses_config_and_overrides() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "system_prompt = \"You are marsh.\"\nmax_tokens = 512\n",
    )
    .unwrap();

    let output = cargo_bin_cmd!("marsh")
        .env("MARSH_HOME", dir.path())
        .args(["request", "-", "--model", "claude-opus-4-1"])
        .write_stdin(CONVERSATION)
        .output()
        .unwrap();
    assert!(output.status.success());

    let request: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(request["model"], "claude-opus-4-1");
    assert_eq!(request["max_tokens"], 512);
    assert_eq!(request["system"], "You are marsh.\n\nBe brief.");
    assert_eq!(request["stream"], true);
    assert_eq!(request["messages"].as_array().unwrap().len(), 3);
    assert_eq!(request["messages"][1]["role"], "assistant");
    assert_eq!(request["messages"][1]["content"], "Hi there!");
}

#[test]
fn test_render_closes_tags() {
    cargo_bin_cmd!("marsh")
        .args(["render", "-"])
        .write_stdin("<b>\n\t<i>\n\t\tbolditalic\n\tbold\nplain")
        .assert()
        .success()
        .stdout("<b>\n<i>\nbolditalic\n</i>\nbold\n</b>\nplain");
}
