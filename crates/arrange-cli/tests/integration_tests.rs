//! Integration tests for the arrange CLI
//!
//! These tests verify the CLI behavior end-to-end

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const UNSORTED: &str = "using System;\nusing System;\n\nnamespace App\n{\n    public class Widget\n    {\n        public void Render() { }\n        private int _size;\n        public Widget() { }\n    }\n}\n";

const SORTED: &str = "using System;\n\nnamespace App\n{\n    public class Widget\n    {\n        private int _size;\n        public Widget() { }\n        public void Render() { }\n    }\n}\n";

/// Helper function to create a test CLI command
#[allow(deprecated)]
fn cli() -> Command {
    let mut cmd = Command::cargo_bin("arrange").unwrap();
    cmd.arg("--no-color");
    cmd
}

/// Helper function to create a temporary directory with test files
fn create_test_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let src = temp_dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("Widget.cs"), UNSORTED).unwrap();
    fs::write(src.join("Sorted.cs"), SORTED.replace("Widget", "Gadget")).unwrap();

    let obj = temp_dir.path().join("obj");
    fs::create_dir_all(&obj).unwrap();
    fs::write(obj.join("Generated.cs"), UNSORTED).unwrap();

    temp_dir
}

#[test]
fn test_help_command() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "arrange normalizes C# sources without touching member bodies.",
        ))
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"));
}

#[test]
fn test_version_command() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(VERSION));
}

#[test]
fn test_version_detailed() {
    cli()
        .args(["version", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Build information:"))
        .stdout(predicate::str::contains("sort-class-members"));
}

#[test]
fn test_fmt_reports_without_writing() {
    let project = create_test_project();
    cli()
        .current_dir(project.path())
        .arg("fmt")
        .assert()
        .success()
        .stdout(predicate::str::contains("Would format"))
        .stdout(predicate::str::contains("Widget.cs"))
        .stdout(predicate::str::contains("Files checked: 2"));

    let content = fs::read_to_string(project.path().join("src/Widget.cs")).unwrap();
    assert_eq!(content, UNSORTED);
}

#[test]
fn test_fmt_check_fails_on_unsorted() {
    let project = create_test_project();
    cli()
        .current_dir(project.path())
        .args(["fmt", "--check", "src"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Would format"));
}

#[test]
fn test_fmt_check_passes_on_sorted() {
    let project = create_test_project();
    cli()
        .current_dir(project.path())
        .args(["fmt", "--check", "src/Sorted.cs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All files are arranged"));
}

#[test]
fn test_fmt_write() {
    let project = create_test_project();
    cli()
        .current_dir(project.path())
        .args(["fmt", "--write", "src"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Formatted"));

    let content = fs::read_to_string(project.path().join("src/Widget.cs")).unwrap();
    assert_eq!(content, SORTED);

    // Excluded by the default patterns
    let generated = fs::read_to_string(project.path().join("obj/Generated.cs")).unwrap();
    assert_eq!(generated, UNSORTED);

    cli()
        .current_dir(project.path())
        .args(["fmt", "--check", "src"])
        .assert()
        .success();
}

#[test]
fn test_fmt_diff() {
    let project = create_test_project();
    cli()
        .current_dir(project.path())
        .args(["fmt", "--diff", "src/Widget.cs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("│"))
        .stdout(predicate::str::contains("private int _size;"));
}

#[test]
fn test_fmt_disable_rule() {
    let project = create_test_project();
    cli()
        .current_dir(project.path())
        .args([
            "fmt",
            "--write",
            "--disable",
            "sort-class-members",
            "src/Widget.cs",
        ])
        .assert()
        .success();

    let content = fs::read_to_string(project.path().join("src/Widget.cs")).unwrap();
    assert!(content.starts_with("using System;\n\nnamespace App"));
    assert!(content.contains("public void Render() { }\n        private int _size;"));
}

#[test]
fn test_fmt_unknown_rule() {
    let project = create_test_project();
    cli()
        .current_dir(project.path())
        .args(["fmt", "--enable", "no-such-rule"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no-such-rule"));
}

#[test]
fn test_fmt_skips_files_with_parse_errors() {
    let temp_dir = TempDir::new().unwrap();
    let broken = "class Broken { void M( }\n";
    fs::write(temp_dir.path().join("Broken.cs"), broken).unwrap();

    cli()
        .current_dir(temp_dir.path())
        .args(["fmt", "--write"])
        .assert()
        .success()
        .stderr(predicate::str::contains("skipping"))
        .stdout(predicate::str::contains("Skipped (parse errors): 1"));

    let content = fs::read_to_string(temp_dir.path().join("Broken.cs")).unwrap();
    assert_eq!(content, broken);
}

#[test]
fn test_fmt_with_diagnostics_file() {
    let temp_dir = TempDir::new().unwrap();
    let source = "using System;\nusing System.Linq;\n\nclass A { }\n";
    fs::write(temp_dir.path().join("A.cs"), source).unwrap();

    let start = source.find("using System.Linq;").unwrap();
    let diagnostics = format!(
        r#"[{{"id": "CS8019", "message": "Unnecessary using directive.", "start": {}, "end": {}}}]"#,
        start,
        start + "using System.Linq;".len()
    );
    fs::write(temp_dir.path().join("diagnostics.json"), diagnostics).unwrap();

    cli()
        .current_dir(temp_dir.path())
        .args(["fmt", "--write", "--diagnostics", "diagnostics.json", "A.cs"])
        .assert()
        .success();

    let content = fs::read_to_string(temp_dir.path().join("A.cs")).unwrap();
    assert_eq!(content, "using System;\n\nclass A { }\n");
}

#[test]
fn test_fmt_nonexistent_path() {
    cli()
        .args(["fmt", "definitely/not/here"])
        .assert()
        .code(2);
}

#[test]
fn test_fmt_respects_config_file() {
    let project = create_test_project();
    fs::write(
        project.path().join(".arrange.toml"),
        "[rules]\nsort-class-members = false\nremove-unused-usings = false\n",
    )
    .unwrap();

    cli()
        .current_dir(project.path())
        .args(["fmt", "--check"])
        .assert()
        .success();
}

#[test]
fn test_rules_list() {
    cli()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("remove-unused-usings"))
        .stdout(predicate::str::contains("sort-class-members"))
        .stdout(predicate::str::contains("Total: 2 rules"));
}

#[test]
fn test_rules_list_detailed() {
    cli()
        .args(["rules", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Phase: local-semantic"))
        .stdout(predicate::str::contains("Phase: syntax"))
        .stdout(predicate::str::contains("Sorts all members in the class"));
}

#[test]
fn test_config_init() {
    let temp_dir = TempDir::new().unwrap();
    cli()
        .current_dir(temp_dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    let content = fs::read_to_string(temp_dir.path().join(".arrange.toml")).unwrap();
    assert!(content.contains("sort-class-members = true"));
    assert!(content.contains("**/*.cs"));

    // A second init without --force fails
    cli()
        .current_dir(temp_dir.path())
        .args(["config", "init"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));

    cli()
        .current_dir(temp_dir.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_init_json_format() {
    let temp_dir = TempDir::new().unwrap();
    cli()
        .current_dir(temp_dir.path())
        .args(["config", "init", "--format", "json"])
        .assert()
        .success();

    let content = fs::read_to_string(temp_dir.path().join(".arrange.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["rules"]["remove-unused-usings"], true);
}

#[test]
fn test_config_show() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".arrange.toml"),
        "[rules]\nsort-class-members = false\n",
    )
    .unwrap();

    cli()
        .current_dir(temp_dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".arrange.toml"))
        .stdout(predicate::str::contains("\"sort-class-members\": false"));
}
