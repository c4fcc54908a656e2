//! CLI integration tests for sift commands.
//!
//! These tests focus on exit codes and basic behavioral verification,
//! not specific output formatting which may change.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

/// Sample records used by the filter tests.
const BOOKS: &str = r#"[
  {"title": "The Hobbit", "author": "J.R.R. Tolkien", "price": 12.5, "published": "1937-09-21"},
  {"title": "The Silmarillion", "author": "J.R.R. Tolkien", "price": 20, "published": "1977-09-15"},
  {"title": "Dune", "author": "Frank Herbert", "price": 9.99, "published": "1965-08-01"},
  {"title": "Neuromancer", "author": "William Gibson", "price": 8, "published": "1984-07-01"}
]"#;

/// Helper to create a temp directory for tests.
fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// Helper to run `sift` with HOME isolated and the working directory set.
fn sift_in(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("sift").unwrap();
    cmd.env("HOME", dir).env_remove("SIFT_LOG").current_dir(dir);
    cmd
}

/// Writes the sample records and returns the directory holding them.
fn books_dir() -> tempfile::TempDir {
    let dir = temp_dir();
    fs::write(dir.path().join("books.json"), BOOKS).unwrap();
    dir
}

/// Runs `sift filter --json` and returns the titles in output order.
fn filtered_titles(dir: &Path, query: &str) -> Vec<String> {
    let output = sift_in(dir)
        .args(["filter", "--json", "--", query, "books.json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "filter failed: {output:?}");
    let records: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    records
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect()
}

mod parse {
    use super::*;

    #[test]
    fn shows_tokens_tree_and_conditions() {
        let dir = temp_dir();
        sift_in(dir.path())
            .args(["parse", "title:hobbit price>=10"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Tokens (2):"))
            .stdout(predicate::str::contains("Tree:\n  AND\n"))
            .stdout(predicate::str::contains("title ~ hobbit"))
            .stdout(predicate::str::contains("price >= 10"));
    }

    #[test]
    fn json_output_is_the_parse_result() {
        let dir = temp_dir();
        let output = sift_in(dir.path())
            .args(["parse", "--json", "--", "-title:\"the hobbit\""])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["metadata"]["has_errors"], false);
        let condition = &json["ast_conditions"][0];
        assert_eq!(condition["key"], "title");
        assert_eq!(condition["value"], "the hobbit");
        assert_eq!(condition["is_negated"], true);
        assert_eq!(condition["token_kind"], "keyword_phrase");
    }

    #[test]
    fn several_queries_are_joined_with_or() {
        let dir = temp_dir();
        sift_in(dir.path())
            .args(["parse", "a", "b"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Query: (a) OR (b)"))
            .stdout(predicate::str::contains("  OR\n"));
    }

    #[test]
    fn syntax_error_fails_with_context() {
        let dir = temp_dir();
        sift_in(dir.path())
            .args(["parse", "hello ~world"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("Conditions (1):"))
            .stderr(predicate::str::contains("query error: Unexpected syntax"))
            .stderr(predicate::str::contains("  hello ~world\n        ^"));
    }

    #[test]
    fn valid_key_flag_rejects_other_keys() {
        let dir = temp_dir();
        sift_in(dir.path())
            .args(["parse", "--valid-key", "title", "author:tolkien title:hobbit"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid key: author"));
    }

    #[test]
    fn strict_flag_reports_impossible_dates() {
        let dir = temp_dir();
        sift_in(dir.path())
            .args(["parse", "created>2024-02-30"])
            .assert()
            .success();
        sift_in(dir.path())
            .args(["parse", "--strict", "created>2024-02-30"])
            .assert()
            .failure();
    }

    #[test]
    fn config_file_supplies_default_key() {
        let dir = temp_dir();
        fs::write(
            dir.path().join(".sift.toml"),
            "root = true\n[parser]\ndefault_key = \"title\"\n",
        )
        .unwrap();

        sift_in(dir.path())
            .args(["parse", "hobbit"])
            .assert()
            .success()
            .stdout(predicate::str::contains("title ~ hobbit"));

        sift_in(dir.path())
            .args(["parse", "--default-key", "author", "hobbit"])
            .assert()
            .success()
            .stdout(predicate::str::contains("author ~ hobbit"));
    }

    #[test]
    fn verbose_logs_to_stderr() {
        let dir = temp_dir();
        sift_in(dir.path())
            .args(["parse", "-v", "hobbit"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Parsed in"))
            .stderr(predicate::str::contains("parsed query"));
    }
}

mod filter {
    use super::*;

    #[test]
    fn filters_and_sorts() {
        let dir = books_dir();
        assert_eq!(
            filtered_titles(dir.path(), "author:tolkien desc:price"),
            vec!["The Silmarillion", "The Hobbit"]
        );
    }

    #[test]
    fn numeric_and_date_comparisons() {
        let dir = books_dir();
        assert_eq!(
            filtered_titles(dir.path(), "price<10 published>=1970 asc:title"),
            vec!["Neuromancer"]
        );
        assert_eq!(
            filtered_titles(dir.path(), "published:1930..1970 asc:published"),
            vec!["The Hobbit", "Dune"]
        );
    }

    #[test]
    fn negated_group() {
        let dir = books_dir();
        assert_eq!(
            filtered_titles(dir.path(), "-(author:tolkien OR author:gibson)"),
            vec!["Dune"]
        );
    }

    #[test]
    fn sort_marker_inside_or_only_orders() {
        let dir = books_dir();
        assert_eq!(filtered_titles(dir.path(), "dune OR desc:price"), vec!["Dune"]);
        assert_eq!(
            filtered_titles(dir.path(), "-(tolkien OR asc:price)"),
            vec!["Neuromancer", "Dune"]
        );
    }

    #[test]
    fn reads_stdin_and_prints_json_lines() {
        let dir = temp_dir();
        let output = sift_in(dir.path())
            .args(["filter", "dune"])
            .write_stdin(BOOKS)
            .output()
            .unwrap();
        assert!(output.status.success());

        let stdout = String::from_utf8(output.stdout).unwrap();
        let lines: Vec<&str> = stdout.lines().collect();
        assert_eq!(lines.len(), 1);
        let record: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(record["author"], "Frank Herbert");
    }

    #[test]
    fn invalid_regex_fails() {
        let dir = books_dir();
        sift_in(dir.path())
            .args(["filter", "title:/(unclosed/", "books.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid regex"));
    }

    #[test]
    fn non_array_input_fails() {
        let dir = temp_dir();
        sift_in(dir.path())
            .args(["filter", "x"])
            .write_stdin(r#"{"title": "Dune"}"#)
            .assert()
            .failure()
            .stderr(predicate::str::contains("expected a JSON array"));
    }

    #[test]
    fn missing_file_fails() {
        let dir = temp_dir();
        sift_in(dir.path())
            .args(["filter", "x", "nope.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to read"));
    }

    #[test]
    fn case_sensitivity_from_config() {
        let dir = books_dir();
        assert_eq!(filtered_titles(dir.path(), "title:dune"), vec!["Dune"]);

        fs::write(
            dir.path().join(".sift.toml"),
            "root = true\n[filter]\ncase_sensitive = true\n",
        )
        .unwrap();
        assert!(filtered_titles(dir.path(), "title:dune").is_empty());
    }
}

mod config {
    use super::*;

    #[test]
    fn defaults_without_files() {
        let dir = temp_dir();
        sift_in(dir.path())
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("No configuration files found"))
            .stdout(predicate::str::contains("[parser]"))
            .stdout(predicate::str::contains("case_sensitive = false"));
    }

    #[test]
    fn lists_files_and_merged_settings() {
        let dir = temp_dir();
        fs::write(
            dir.path().join(".sift.toml"),
            "root = true\n[parser]\nvalid_keys = [\"title\", \"author\"]\n",
        )
        .unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join(".sift.toml"), "[parser]\ndefault_key = \"title\"\n").unwrap();

        sift_in(&nested)
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("nested/.sift.toml"))
            .stdout(predicate::str::contains("default_key = \"title\""))
            .stdout(predicate::str::contains("valid_keys"));
    }

    #[test]
    fn warns_about_unusable_default_key() {
        let dir = temp_dir();
        fs::write(
            dir.path().join(".sift.toml"),
            "root = true\n[parser]\nvalid_keys = [\"title\"]\ndefault_key = \"body\"\n",
        )
        .unwrap();

        sift_in(dir.path())
            .arg("config")
            .assert()
            .success()
            .stderr(predicate::str::contains("warning: parser.default_key 'body'"));
    }

    #[test]
    fn invalid_config_fails() {
        let dir = temp_dir();
        fs::write(dir.path().join(".sift.toml"), "[parser\n").unwrap();

        sift_in(dir.path())
            .arg("config")
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to load configuration"));
    }
}
