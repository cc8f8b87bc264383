use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const TANK: &str = "package com.example.tanks\n{\n    public class Tank\n    {\n        public static var Health:Number = 100;\n    }\n}\n";

#[test]
fn inspect_dumps_models_as_json() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("Tank.as");
    fs::write(&file, TANK).unwrap();

    let assert = Command::cargo_bin("demask")
        .unwrap()
        .args(["inspect", file.to_str().unwrap()])
        .assert()
        .success();

    let models: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(models[0]["package_name"], "com.example.tanks");
    assert_eq!(models[0]["classes"][0]["name"], "Tank");
    assert_eq!(models[0]["vars"][0]["is_static"], true);
    assert_eq!(models[0]["vars"][0]["initializer"], "100");
}

#[test]
fn inspect_text_lists_declarations() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("Tank.as");
    fs::write(&file, TANK).unwrap();

    Command::cargo_bin("demask")
        .unwrap()
        .args(["inspect", file.to_str().unwrap(), "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tank (package com.example.tanks)"))
        .stdout(predicate::str::contains("var Health:Number"));
}

#[test]
fn inspect_rejects_unsupported_files() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("notes.txt");
    fs::write(&file, "nope").unwrap();

    Command::cargo_bin("demask")
        .unwrap()
        .args(["inspect", file.to_str().unwrap()])
        .assert()
        .failure();
}
