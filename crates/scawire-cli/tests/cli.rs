//! Integration tests for the scawire command line interface.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_descriptor(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

const WIRED_APP: &str = r#"{
    "name": "app",
    "components": [
        {
            "name": "client",
            "implementation": {
                "atomic": {
                    "references": [
                        {"name": "catalog", "contract": {"interface": "Catalog"}}
                    ]
                }
            }
        },
        {
            "name": "store",
            "implementation": {
                "atomic": {
                    "services": [
                        {"name": "catalog", "contract": {"interface": "Catalog"}}
                    ]
                }
            }
        }
    ]
}"#;

const BROKEN_APP: &str = r#"{
    "name": "app",
    "autowire": false,
    "components": [
        {
            "name": "client",
            "implementation": {
                "atomic": {
                    "references": [
                        {"name": "catalog", "contract": {"interface": "Catalog"}}
                    ]
                }
            }
        }
    ]
}"#;

#[test]
fn test_validate_fully_wired_descriptor() {
    let dir = TempDir::new().unwrap();
    let descriptor = write_descriptor(&dir, "app.json", WIRED_APP);

    Command::cargo_bin("scawire")
        .unwrap()
        .args(["validate", descriptor.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("fully resolved"));
}

#[test]
fn test_validate_reports_unresolved_reference() {
    let dir = TempDir::new().unwrap();
    let descriptor = write_descriptor(&dir, "app.json", BROKEN_APP);

    Command::cargo_bin("scawire")
        .unwrap()
        .args(["validate", descriptor.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("domain/client#catalog"))
        .stderr(predicate::str::contains("1 wiring error(s)"));
}

#[test]
fn test_wire_emits_resolved_wires_as_json() {
    let dir = TempDir::new().unwrap();
    let descriptor = write_descriptor(&dir, "app.json", WIRED_APP);

    Command::cargo_bin("scawire")
        .unwrap()
        .args(["wire", descriptor.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"domain/client#catalog\""))
        .stdout(predicate::str::contains("\"domain/store#catalog\""));
}

#[test]
fn test_wire_respects_domain_and_deployable_flags() {
    let dir = TempDir::new().unwrap();
    let descriptor = write_descriptor(&dir, "app.json", WIRED_APP);

    Command::cargo_bin("scawire")
        .unwrap()
        .args([
            "wire",
            descriptor.to_str().unwrap(),
            "--domain",
            "prod",
            "--deployable",
            "urn:example#app",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"prod/client#catalog\""))
        .stdout(predicate::str::contains("urn:example#app"));
}

#[test]
fn test_wire_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let descriptor = write_descriptor(&dir, "app.json", WIRED_APP);
    let output = dir.path().join("wires.json");

    Command::cargo_bin("scawire")
        .unwrap()
        .args([
            "wire",
            descriptor.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("domain/store#catalog"));
}

#[test]
fn test_invalid_deployable_is_rejected() {
    let dir = TempDir::new().unwrap();
    let descriptor = write_descriptor(&dir, "app.json", WIRED_APP);

    Command::cargo_bin("scawire")
        .unwrap()
        .args([
            "validate",
            descriptor.to_str().unwrap(),
            "--deployable",
            "no-separator",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid qualified name"));
}

#[test]
fn test_malformed_descriptor_is_rejected() {
    let dir = TempDir::new().unwrap();
    let descriptor = write_descriptor(&dir, "app.json", "{ not json");

    Command::cargo_bin("scawire")
        .unwrap()
        .args(["validate", descriptor.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid descriptor"));
}

#[test]
fn test_missing_descriptor_is_rejected() {
    Command::cargo_bin("scawire")
        .unwrap()
        .args(["validate", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}
