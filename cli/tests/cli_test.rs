//! End-to-end tests for the notedown binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::json;
use tempfile::TempDir;

fn notedown(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_notedown"))
        .args(args)
        .env("NO_COLOR", "1")
        .env("CLICOLOR", "0")
        .output()
        .expect("Failed to run notedown")
}

fn write_doc(dir: &Path) -> String {
    let doc = json!({"type": "doc", "content": [
        {"type": "heading", "attrs": {"level": 1}, "content": [{"type": "text", "text": "Title"}]},
        {"type": "list", "attrs": {"tight": null}, "content": [
            {"type": "paragraph", "content": [{"type": "text", "text": "a"}]},
            {"type": "paragraph", "content": [{"type": "text", "text": "b"}]}
        ]}
    ]});
    let path = dir.join("doc.json");
    fs::write(&path, doc.to_string()).expect("Failed to write document");
    path.to_string_lossy().into_owned()
}

fn write_export(dir: &Path) -> String {
    let doc = |t: &str| {
        json!({"type": "doc", "content": [
            {"type": "paragraph", "content": [{"type": "text", "text": t}]}
        ]})
        .to_string()
    };
    let export = json!({"notes": [
        {"id": "one", "document_json": doc("First")},
        {"id": "two", "document_json": "{broken"},
        {"id": "three", "document_json": doc("Third")}
    ]});
    let path = dir.join("export.json");
    fs::write(&path, export.to_string()).expect("Failed to write export");
    path.to_string_lossy().into_owned()
}

#[test]
fn test_markdown_to_stdout() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let input = write_doc(temp.path());

    let output = notedown(&["markdown", &input]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end(), "# Title\n\n- a\n- b");
}

#[test]
fn test_markdown_loose_to_file() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let input = write_doc(temp.path());
    let out = temp.path().join("doc.md");

    let output = notedown(&["md", &input, "--loose", "-o", &out.to_string_lossy()]);
    assert!(output.status.success());
    let markdown = fs::read_to_string(&out).expect("Failed to read output");
    assert_eq!(markdown, "# Title\n\n- a\n\n- b");
}

#[test]
fn test_batch_writes_notes_and_manifest() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let input = write_export(temp.path());
    let out_dir = temp.path().join("notes");

    let output = notedown(&[
        "batch",
        &input,
        "-o",
        &out_dir.to_string_lossy(),
        "--sequential",
        "--manifest",
    ]);
    assert!(output.status.success());

    assert_eq!(fs::read_to_string(out_dir.join("0.md")).unwrap(), "First");
    assert!(!out_dir.join("1.md").exists());
    assert_eq!(fs::read_to_string(out_dir.join("2.md")).unwrap(), "Third");

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("manifest.json")).unwrap()).unwrap();
    assert_eq!(manifest["converted"], json!(2));
    assert_eq!(manifest["failed"], json!(1));
    assert_eq!(manifest["outcomes"][1]["id"], json!("two"));
}

#[test]
fn test_auto_detects_export() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let input = write_export(temp.path());
    let out_dir = temp.path().join("auto");

    let output = notedown(&[&input, &out_dir.to_string_lossy()]);
    assert!(output.status.success());
    assert!(out_dir.join("0.md").exists());
    assert!(out_dir.join("2.md").exists());
}

#[test]
fn test_auto_converts_document() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let input = write_doc(temp.path());
    let out = temp.path().join("auto.md");

    let output = notedown(&[&input, &out.to_string_lossy()]);
    assert!(output.status.success());
    let markdown = fs::read_to_string(&out).expect("Failed to read output");
    assert_eq!(markdown, "# Title\n\n- a\n- b");
}

#[test]
fn test_unknown_format_fails() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let path = temp.path().join("other.json");
    fs::write(&path, r#"{"pages": []}"#).unwrap();

    let output = notedown(&["info", &path.to_string_lossy()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown input format"));
}

#[test]
fn test_kinds_lists_notes_kinds() {
    let output = notedown(&["kinds"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("backlink"));
    assert!(stdout.contains("textHighlight"));
    assert!(!stdout.contains("missing"));
}
