//! CLI integration tests for the kube-service-step binary.
//!
//! Only paths that never reach the network are exercised here: schema
//! introspection, request parsing and input validation all fail or finish
//! before the Kubernetes client is used.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("kube-service-step"))
}

fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

mod schema_command {
    use super::*;

    #[test]
    fn prints_callable_schema() {
        let output = cmd().arg("schema").assert().success();
        let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();

        assert!(parsed["steps"]["create"].is_object());
        assert_eq!(parsed["steps"]["create"]["outputs"]["error"]["error"], true);
    }

    #[test]
    fn pretty_output_is_multiline() {
        cmd()
            .args(["schema", "--pretty"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\n  \"steps\""));
    }
}

mod run_command {
    use super::*;

    #[test]
    fn missing_required_field_exits_1_with_path() {
        let dir = TempDir::new().unwrap();
        let request = write_temp_file(
            &dir,
            "request.json",
            r#"{"step": "create", "input": {"connection": {}}}"#,
        );

        cmd()
            .args(["run", request.to_str().unwrap()])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("/service"))
            .stderr(predicate::str::contains("missing required field"));
    }

    #[test]
    fn dependency_violation_reported_with_field_path() {
        let dir = TempDir::new().unwrap();
        let request = write_temp_file(
            &dir,
            "request.json",
            r#"{
                "step": "create",
                "input": {
                    "connection": {"cacert": "-----BEGIN CERTIFICATE-----\nx\n-----END CERTIFICATE-----"},
                    "service": {}
                }
            }"#,
        );

        cmd()
            .args(["run", request.to_str().unwrap()])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("/connection/cacert"))
            .stderr(predicate::str::contains("requires field \"cert\""));
    }

    #[test]
    fn unknown_step_exits_2() {
        let dir = TempDir::new().unwrap();
        let request = write_temp_file(&dir, "request.json", r#"{"step": "delete", "input": {}}"#);

        cmd()
            .args(["run", request.to_str().unwrap()])
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("unknown step \"delete\""));
    }

    #[test]
    fn request_without_step_exits_2() {
        let dir = TempDir::new().unwrap();
        let request = write_temp_file(&dir, "request.json", r#"{"input": {}}"#);

        cmd()
            .args(["run", request.to_str().unwrap()])
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("missing the \"step\" field"));
    }

    #[test]
    fn invalid_json_exits_2() {
        cmd()
            .arg("run")
            .write_stdin("not json")
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("invalid JSON request"));
    }

    #[test]
    fn reads_request_from_stdin() {
        cmd()
            .arg("run")
            .write_stdin(r#"{"step": "create", "input": {}}"#)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("/connection"));
    }

    #[test]
    fn missing_file_exits_3() {
        cmd()
            .args(["run", "/nonexistent/request.json"])
            .assert()
            .failure()
            .code(3)
            .stderr(predicate::str::contains("cannot read"));
    }
}

mod usage {
    use super::*;

    #[test]
    fn no_subcommand_shows_usage() {
        cmd()
            .assert()
            .failure()
            .stderr(predicate::str::contains("Usage"));
    }

    #[test]
    fn unknown_subcommand_rejected() {
        cmd()
            .arg("frobnicate")
            .assert()
            .failure()
            .stderr(predicate::str::contains("unrecognized subcommand"));
    }
}
