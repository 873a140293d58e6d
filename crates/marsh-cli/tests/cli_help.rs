use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("marsh")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("messages"))
        .stdout(predicate::str::contains("request"))
        .stdout(predicate::str::contains("edit"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_edit_help_shows_offsets() {
    cargo_bin_cmd!("marsh")
        .args(["edit", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--at"))
        .stdout(predicate::str::contains("--delete"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_missing_subcommand_fails() {
    cargo_bin_cmd!("marsh").assert().failure();
}
