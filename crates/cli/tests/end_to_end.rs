use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

const M: char = '\u{a7}';

fn write_reference(dir: &std::path::Path) {
    let pkg = dir.join("real/pkg");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(
        pkg.join("Widget.as"),
        "package real.pkg\n{\n    public class Widget\n    {\n        public var label:String = \"x\";\n    }\n}\n",
    )
    .unwrap();
}

fn write_target(dir: &std::path::Path) {
    let pkg = dir.join(format!("{M}p{M}"));
    fs::create_dir_all(&pkg).unwrap();
    fs::write(
        pkg.join(format!("{M}C{M}.as")),
        format!(
            "package {M}p{M}\n{{\n    public class {M}C{M}\n    {{\n        public var {M}v{M}:String = \"x\";\n    }}\n}}\n"
        ),
    )
    .unwrap();
}

#[test]
fn run_recovers_names_and_rewrites_the_tree() {
    let tmp = TempDir::new().unwrap();
    let reference = tmp.path().join("ref");
    let target = tmp.path().join("obf");
    let out = tmp.path().join("clean");
    let map = tmp.path().join("names.json");
    write_reference(&reference);
    write_target(&target);

    let assert = Command::cargo_bin("demask")
        .unwrap()
        .args([
            "run",
            "--reference",
            reference.to_str().unwrap(),
            "--target",
            target.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--map-out",
            map.to_str().unwrap(),
            "--format",
            "json",
            "--quiet",
        ])
        .assert()
        .success();

    // rewritten file lands under the recovered package path
    let written = fs::read_to_string(out.join("real/pkg/Widget.as")).unwrap();
    assert!(written.contains("package real.pkg"));
    assert!(written.contains("public class Widget"));
    assert!(written.contains("public var label:String"));
    assert!(!written.contains(M));

    // the exported table chains marker token -> placeholder -> name
    let table: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&map).unwrap()).unwrap();
    assert_eq!(table[format!("{M}C{M}")], "deobfuscated_name_1");
    assert_eq!(table["deobfuscated_name_1"], "Widget");
    assert_eq!(table["deobfuscated_name_0"], "real.pkg");
    assert_eq!(table["deobfuscated_name_2"], "label");

    // summary on stdout is machine readable
    let output = assert.get_output();
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["names_obfuscated"], 0);
    assert_eq!(summary["files_written"], 1);
    assert_eq!(summary["target"]["files_parsed"], 1);
}

#[test]
fn ambiguous_reference_leaves_the_target_obfuscated() {
    let tmp = TempDir::new().unwrap();
    let reference = tmp.path().join("ref");
    let target = tmp.path().join("obf");
    let out = tmp.path().join("clean");
    write_reference(&reference);
    // a structural twin makes every candidate ambiguous
    fs::write(
        reference.join("real/pkg/Gadget.as"),
        "package real.pkg\n{\n    public class Gadget\n    {\n        public var title:String = \"x\";\n    }\n}\n",
    )
    .unwrap();
    write_target(&target);

    Command::cargo_bin("demask")
        .unwrap()
        .args([
            "run",
            "--reference",
            reference.to_str().unwrap(),
            "--target",
            target.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--format",
            "json",
            "--quiet",
        ])
        .assert()
        .success();

    // nothing resolved: the emitter keeps the placeholder names, in
    // the content and in the package path alike
    let written = fs::read_to_string(
        out.join("deobfuscated_name_0/deobfuscated_name_1.as"),
    )
    .unwrap();
    assert!(written.contains("public class deobfuscated_name_1"));
    assert!(written.contains("package deobfuscated_name_0"));
}

#[test]
fn missing_reference_tree_fails() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("obf");
    write_target(&target);

    Command::cargo_bin("demask")
        .unwrap()
        .args([
            "run",
            "--reference",
            tmp.path().join("nope").to_str().unwrap(),
            "--target",
            target.to_str().unwrap(),
            "--out",
            tmp.path().join("clean").to_str().unwrap(),
            "--quiet",
        ])
        .assert()
        .failure();
}
