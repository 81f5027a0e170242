//! End-to-end tests: run `postsmith` as a subprocess against a temp project.
//!
//! Every test gets its own config file through `POSTSMITH_CONFIG`, so the
//! user's real configuration is never read or written.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    fn write(&self, relative: &str, text: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().expect("has parent")).expect("mkdir");
        fs::write(&path, text).expect("write");
        path
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("read")
    }

    /// A command with no project configured.
    fn bare_cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("postsmith"));
        cmd.current_dir(self.root());
        cmd.env("POSTSMITH_CONFIG", self.path("config/config.toml"));
        cmd.env_remove("POSTSMITH_PROJECT");
        // Suppress tracing output that goes to stderr
        cmd.env("POSTSMITH_LOG", "error");
        cmd
    }

    /// A command pointed at this project with `--project`.
    fn cmd(&self) -> Command {
        let mut cmd = self.bare_cmd();
        cmd.arg("--project").arg(self.root());
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .output()
            .expect("postsmith should not crash");
        assert!(
            output.status.success(),
            "{args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("valid JSON")
    }
}

const LEGACY: &str = "---\n\
title: Old Title\n\
date: 2019-04-01 08:00:00\n\
categories: \"[Notes, Travel]\"\n\
---\n\
\n\
Body from 2019.\n";

// ---------------------------------------------------------------------------
// new
// ---------------------------------------------------------------------------

#[test]
fn new_creates_dated_post() {
    let project = Project::new();
    let json = project.json(&[
        "new",
        "--title",
        "Hello, World!  Test",
        "--date",
        "2024-3-5",
        "--time",
        "09:05:03",
        "--tags",
        "rust, cli",
    ]);

    assert_eq!(json["action"], "create");
    let expected = project.path("_posts/2024-3-5-Hello-World-Test.md");
    assert_eq!(json["path"], expected.display().to_string());
    assert_eq!(
        project.read("_posts/2024-3-5-Hello-World-Test.md"),
        "---\ntitle: Hello, World!  Test\n\ndate: 2024-3-5 09:05:03 +0800\n\ntags: [rust,cli]\n\n---\n"
    );
}

#[test]
fn new_with_body_file() {
    let project = Project::new();
    let body = project.write("draft.md", "First paragraph.\n");
    project
        .cmd()
        .args(["new", "--title", "Draft", "--date", "2024-1-2", "--body-file"])
        .arg(&body)
        .assert()
        .success()
        .stdout(predicate::str::contains("created"));

    let text = project.read("_posts/2024-1-2-Draft.md");
    assert!(text.ends_with("---\n\nFirst paragraph.\n"), "{text}");
}

#[test]
fn new_without_project_fails_with_code() {
    let project = Project::new();
    project
        .bare_cmd()
        .args(["new", "--title", "Hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1001"));
}

#[test]
fn new_without_title_fails_with_code() {
    let project = Project::new();
    project
        .cmd()
        .args(["new", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"error_code\": \"E2001\""));
    assert!(!project.path("_posts").exists());
}

#[test]
fn new_rejects_bad_date() {
    let project = Project::new();
    project
        .cmd()
        .args(["new", "--title", "Hello", "--date", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2002"));
}

#[test]
fn unlisted_author_is_accepted_with_note() {
    let project = Project::new();
    project.write("_data/authors.yml", "alice:\n  name: Alice\n");
    let json = project.json(&["new", "--title", "Guest", "--author", "mallory"]);
    assert_eq!(json["unlisted_author"], "mallory");

    let json = project.json(&["new", "--title", "Home", "--author", "alice"]);
    assert!(json.get("unlisted_author").is_none());
}

// ---------------------------------------------------------------------------
// edit
// ---------------------------------------------------------------------------

#[test]
fn edit_rewrites_header_and_keeps_body() {
    let project = Project::new();
    project.write("_posts/2019-4-1-old.md", LEGACY);

    let json = project.json(&["edit", "_posts/2019-4-1-old.md", "--title", "New Title"]);
    assert_eq!(json["action"], "update");
    assert_eq!(json["warnings"], serde_json::json!([]));

    assert_eq!(
        project.read("_posts/2019-4-1-old.md"),
        "---\ntitle: New Title\n\ndate: 2019-4-1 08:00:00 +0800\n\ncategories: [Notes,Travel]\n\n---\n\nBody from 2019.\n"
    );
}

#[test]
fn edit_missing_file_fails_without_creating_it() {
    let project = Project::new();
    project
        .cmd()
        .args(["edit", "_posts/nope.md", "--title", "X"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E5001"));
    assert!(!project.path("_posts/nope.md").exists());
}

#[test]
fn edit_reports_decode_warnings() {
    let project = Project::new();
    project.write(
        "_posts/odd.md",
        "---\ntitle: [not, text]\ndate: someday\n---\nBody\n",
    );
    let json = project.json(&["edit", "_posts/odd.md", "--title", "Fixed"]);
    let warnings = json["warnings"].as_array().expect("warnings array");
    assert!(warnings.len() >= 2, "{warnings:?}");
    assert!(project.read("_posts/odd.md").ends_with("---\n\nBody\n"));
}

#[cfg(unix)]
#[test]
fn edit_suggest_tags_runs_program() {
    use std::os::unix::fs::PermissionsExt;

    let project = Project::new();
    project.write("_posts/p.md", LEGACY);
    let script = project.write("keywords.sh", "#!/bin/sh\ncat >/dev/null\necho 'travel, notes,2019'\n");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod");

    project
        .cmd()
        .args(["edit", "_posts/p.md", "--suggest-tags"])
        .arg(&script)
        .assert()
        .success();
    assert!(project.read("_posts/p.md").contains("tags: [travel,notes,\"2019\"]\n"));
}

#[cfg(unix)]
#[test]
fn invalid_new_never_runs_keyword_program() {
    use std::os::unix::fs::PermissionsExt;

    let project = Project::new();
    let marker = project.path("ran");
    let script = project.write(
        "keywords.sh",
        &format!("#!/bin/sh\ntouch '{}'\necho a\n", marker.display()),
    );
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod");
    let body = project.write("draft.md", "Draft body.\n");

    project
        .cmd()
        .args(["new", "--suggest-tags"])
        .arg(&script)
        .arg("--body-file")
        .arg(&body)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
    assert!(!marker.exists());

    project
        .bare_cmd()
        .args(["new", "--title", "Hello", "--suggest-tags"])
        .arg(&script)
        .arg("--body-file")
        .arg(&body)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1001"));
    assert!(!marker.exists());
    assert!(!project.path("_posts").exists());
}

// ---------------------------------------------------------------------------
// show / authors / config / completions
// ---------------------------------------------------------------------------

#[test]
fn show_prints_decoded_record() {
    let project = Project::new();
    project.write("_posts/p.md", LEGACY);
    let json = project.json(&["show", "_posts/p.md"]);
    assert_eq!(json["has_metadata"], true);
    assert_eq!(json["record"]["title"], "Old Title");
    assert_eq!(json["record"]["categories"], serde_json::json!(["Notes", "Travel"]));
    assert_eq!(project.read("_posts/p.md"), LEGACY);

    project
        .cmd()
        .args(["show", "_posts/p.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Old Title"))
        .stdout(predicate::str::contains("Notes, Travel"));
}

#[test]
fn show_malformed_header_warns() {
    let project = Project::new();
    project.write("_posts/bad.md", "---\ntitle: [broken\n---\nBody\n");
    let json = project.json(&["show", "_posts/bad.md"]);
    assert_eq!(json["record"]["title"], "");
    let warnings = json["warnings"].as_array().expect("warnings array");
    assert_eq!(warnings.len(), 1);
    assert!(
        warnings[0]
            .as_str()
            .is_some_and(|w| w.contains("not valid YAML"))
    );
}

#[test]
fn authors_lists_roster_in_file_order() {
    let project = Project::new();
    project.write("_data/authors.yml", "zoe:\n  name: Zoe\nadam:\n  name: Adam\n");
    let json = project.json(&["authors"]);
    assert_eq!(json["authors"], serde_json::json!(["zoe", "adam"]));
}

#[test]
fn set_project_is_remembered() {
    let project = Project::new();
    project
        .bare_cmd()
        .args(["config", "set-project"])
        .arg(project.root())
        .assert()
        .success();

    let output = project
        .bare_cmd()
        .args(["config", "show", "--json"])
        .output()
        .expect("config show");
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["project"], project.root().display().to_string());
    assert_eq!(json["config"]["front_matter"]["utc_offset"], "+0800");

    project
        .bare_cmd()
        .args(["new", "--title", "Remembered", "--date", "2024-6-1"])
        .assert()
        .success();
    assert!(project.path("_posts/2024-6-1-Remembered.md").exists());
}

#[test]
fn broken_config_is_reported() {
    let project = Project::new();
    project.write("config/config.toml", "[front_matter\n");
    project
        .cmd()
        .args(["show", "x.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1002"));
}

#[test]
fn completions_generate_script() {
    let project = Project::new();
    project
        .bare_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("postsmith"));
}
