//! Integration tests for all CLI commands
//!
//! Tests each command with real invocations.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const QUESTION: &str = r"Let $f(x) = x^2$.
**Part (a) [2 marks]** Find $f(3)$.
**Part (b) [3 marks]** Sketch \includegraphics[width=200px]{ https://img.example.net/axes.png }";

/// Helper to create a CLI command running in an empty directory
fn cli(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_texmix"));
    cmd.current_dir(dir.path());
    cmd
}

// ============ GLOBAL ============

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("parse"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("images"));
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .args(["parse", "missing.tex"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read input file"));
}

// ============ PARSE COMMAND TESTS ============

#[test]
fn test_parse_markdown_from_stdin() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .arg("parse")
        .write_stdin(QUESTION)
        .assert()
        .success()
        .stdout(predicate::str::contains("Let $f(x) = x^2$."))
        .stdout(predicate::str::contains("**Part (a)** [2 marks]"))
        .stdout(predicate::str::contains(
            "![image](https://img.example.net/axes.png)",
        ));
}

#[test]
fn test_parse_json_structure() {
    let dir = TempDir::new().unwrap();
    let output = cli(&dir)
        .args(["parse", "-", "-f", "json"])
        .write_stdin(QUESTION)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let blocks = json["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[0]["kind"]["type"], "main");
    assert_eq!(blocks[1]["kind"]["letter"], "a");
    assert_eq!(blocks[2]["kind"]["marks"], 3);
}

#[test]
fn test_parse_compact_json() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .args(["parse", "-f", "json", "--compact"])
        .write_stdin("$a$")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"type":"math","latex":"a","display":false}"#,
        ));
}

#[test]
fn test_parse_no_parts_keeps_markers() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .args(["parse", "--no-parts"])
        .write_stdin(QUESTION)
        .assert()
        .success()
        .stdout(predicate::str::contains("**Part (a) [2 marks]** Find"));
}

#[test]
fn test_parse_to_output_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("question.tex");
    let output = dir.path().join("question.yaml");
    fs::write(&input, QUESTION).unwrap();

    cli(&dir)
        .arg("parse")
        .arg(&input)
        .args(["-f", "yaml", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 3 block(s)"));

    let yaml = fs::read_to_string(&output).unwrap();
    assert!(yaml.contains("blocks:"));
    assert!(yaml.contains("https://img.example.net/axes.png"));
}

// ============ CONFIG TESTS ============

#[test]
fn test_project_config_sets_format() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".texmix.toml"), "[output]\nformat = \"yaml\"\n").unwrap();

    cli(&dir)
        .arg("parse")
        .write_stdin("$a$")
        .assert()
        .success()
        .stdout(predicate::str::contains("blocks:"));
}

#[test]
fn test_cli_flag_overrides_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".texmix.toml"), "[output]\nformat = \"yaml\"\n").unwrap();

    cli(&dir)
        .args(["parse", "-f", "markdown"])
        .write_stdin("$a$")
        .assert()
        .success()
        .stdout(predicate::str::diff("$a$\n"));
}

#[test]
fn test_explicit_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.toml");
    fs::write(&config, "[parse]\nsplit_parts = false\n").unwrap();

    cli(&dir)
        .arg("--config")
        .arg(&config)
        .arg("parse")
        .write_stdin(QUESTION)
        .assert()
        .success()
        .stdout(predicate::str::contains("**Part (b) [3 marks]**"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".texmix.toml"), "[output]\nformat = \"xml\"\n").unwrap();

    cli(&dir)
        .arg("parse")
        .write_stdin("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"));
}

// ============ CHECK COMMAND TESTS ============

#[test]
fn test_check_all_rendered() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .args(["check", "--strict"])
        .write_stdin(r"$\cfrac{1}{2}$ and \begin{cases}x\end{cases}")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 spans"))
        .stdout(predicate::str::contains("0").and(predicate::str::contains("literal")));
}

#[test]
fn test_check_reports_literal() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .arg("check")
        .write_stdin(r"Broken $x^{2$ here")
        .assert()
        .success()
        .stdout(predicate::str::contains("x^{2"));
}

#[test]
fn test_check_strict_fails_on_literal() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .args(["check", "--strict"])
        .write_stdin(r"Broken $x^{2$ here")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 span(s) only render as literal text"));
}

// ============ IMAGES COMMAND TESTS ============

#[test]
fn test_images_list() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .arg("images")
        .write_stdin(r"\includegraphics{ a.png } \includegraphics{} \includegraphics[width=2cm]{b/c.png}")
        .assert()
        .success()
        .stdout(predicate::str::diff("a.png\nb/c.png\n"));
}

#[test]
fn test_images_rewrite() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .args(["images", "--rewrite", "https://cdn/x.png"])
        .write_stdin(r"See \includegraphics[width=2cm]{old.png}")
        .assert()
        .success()
        .stdout(predicate::str::diff(
            r"See \includegraphics[width=2cm]{https://cdn/x.png}",
        ));
}

#[test]
fn test_images_cdn_locations() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .args([
            "images",
            "--cdn-base",
            "https://cdn.test/",
            "--question-id",
            "q1",
            "--timestamp",
            "5",
        ])
        .write_stdin(r"\includegraphics{figs/my plot.png}")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://cdn.test/question-images/q1/5-my_plot.png",
        ));
}

#[test]
fn test_images_cdn_base_from_config() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".texmix.toml"),
        "[images]\ncdn_base = \"https://cfg.test\"\n",
    )
    .unwrap();

    cli(&dir)
        .args(["images", "--timestamp", "7"])
        .write_stdin(r"\includegraphics{a.png}")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://cfg.test/question-images/7-a.png",
        ));
}

#[test]
fn test_images_question_id_needs_base() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .args(["images", "--question-id", "q1"])
        .write_stdin(r"\includegraphics{a.png}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
