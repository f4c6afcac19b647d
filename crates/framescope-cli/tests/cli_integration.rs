//! Integration tests for the fsc CLI.
//!
//! Run with: `cargo test --package framescope-cli --test cli_integration`

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// A source tree plus an isolated config and snapshot location.
struct Fixture {
    temp: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        write(
            &root.join("captions.json"),
            r#"{"v_aaaaaaaaaaa": {"sentences": ["a", "c"]}, "v_bbbbbbbbbbb": {"sentences": ["b"]}}"#,
        );
        for segment in ["v_aaaaaaaaaaa0", "v_aaaaaaaaaaa1", "v_bbbbbbbbbbb0"] {
            write(&root.join("frames").join(segment).join("0001.jpg"), "");
            write(&root.join("keyframes").join(format!("{segment}.txt")), "0\n");
        }
        write(&root.join("features/v_aaaaaaaaaaa0.txt"), "1,0\n");
        write(&root.join("features/v_aaaaaaaaaaa1.txt"), "0.707,0.707\n");
        write(&root.join("features/v_bbbbbbbbbbb0.txt"), "0,1\n");

        Self { temp }
    }

    fn root(&self) -> &Path {
        self.temp.path()
    }

    fn snapshot(&self) -> PathBuf {
        self.root().join("state").join("snapshot.json")
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_fsc"))
            .current_dir(self.root())
            .env("FRAMESCOPE_SNAPSHOT", self.snapshot())
            .env("XDG_CONFIG_HOME", self.root().join("config"))
            .env("HOME", self.root())
            .env_remove("RUST_LOG")
            .env_remove("FRAMESCOPE_METRIC")
            .env_remove("FRAMESCOPE_TOP_K")
            .args(args)
            .output()
            .expect("Failed to execute fsc command")
    }

    fn build(&self) -> Output {
        self.run(&[
            "build",
            "--frames",
            "frames",
            "--captions",
            "captions.json",
            "--key-frames",
            "keyframes",
            "--features",
            "features",
        ])
    }
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn query_captions(output: &Output) -> Vec<String> {
    let hits: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    hits.as_array()
        .unwrap()
        .iter()
        .map(|hit| hit["caption"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_fsc"))
        .arg("--help")
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("build"));
    assert!(text.contains("query"));
}

#[test]
fn test_build_writes_snapshot() {
    let fixture = Fixture::new();
    let output = fixture.build();
    assert!(
        output.status.success(),
        "build failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(fixture.snapshot().is_file());

    let status = fixture.run(&["status"]);
    assert!(status.status.success());
    let text = stdout(&status);
    assert!(text.contains("Records:            3"));
    assert!(text.contains("Normalized:         true"));
}

#[test]
fn test_query_cosine_json() {
    let fixture = Fixture::new();
    assert!(fixture.build().status.success());

    let output = fixture.run(&["query", "--vector", "1,0", "-k", "2", "--json"]);
    assert!(output.status.success());
    assert_eq!(query_captions(&output), vec!["a", "c"]);
}

#[test]
fn test_query_euclidean_negative_components() {
    let fixture = Fixture::new();
    assert!(fixture.build().status.success());

    let output = fixture.run(&[
        "query",
        "--vector",
        "-0.1,1",
        "--metric",
        "euclidean",
        "-k",
        "1",
        "--json",
    ]);
    assert!(
        output.status.success(),
        "query failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(query_captions(&output), vec!["b"]);
}

#[test]
fn test_query_from_stored_segment() {
    let fixture = Fixture::new();
    assert!(fixture.build().status.success());

    let output = fixture.run(&["query", "--segment", "v_bbbbbbbbbbb0", "-k", "1", "--json"]);
    assert!(output.status.success());
    assert_eq!(query_captions(&output), vec!["b"]);
}

#[test]
fn test_query_from_vector_file() {
    let fixture = Fixture::new();
    assert!(fixture.build().status.success());
    write(&fixture.root().join("q.txt"), "\n0.6,0.8\n");

    let output = fixture.run(&["query", "--vector-file", "q.txt", "-k", "1", "--json"]);
    assert!(output.status.success());
    assert_eq!(query_captions(&output), vec!["c"]);
}

#[test]
fn test_query_rejects_bad_input() {
    let fixture = Fixture::new();
    assert!(fixture.build().status.success());

    assert!(!fixture.run(&["query", "--vector", "1,0", "-k", "0"]).status.success());
    assert!(!fixture.run(&["query", "--vector", "1,0,0"]).status.success());
    assert!(!fixture.run(&["query", "--vector", "1,x"]).status.success());
    // No vector source at all
    assert!(!fixture.run(&["query"]).status.success());
}

#[test]
fn test_query_without_snapshot_fails() {
    let fixture = Fixture::new();
    let output = fixture.run(&["query", "--vector", "1,0"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("snapshot"));
}

#[test]
fn test_segment_lookups() {
    let fixture = Fixture::new();
    assert!(fixture.build().status.success());

    let caption = fixture.run(&["caption", "v_aaaaaaaaaaa1"]);
    assert!(caption.status.success());
    assert_eq!(stdout(&caption).trim(), "c");

    let frames = fixture.run(&["frames", "v_aaaaaaaaaaa0"]);
    assert!(frames.status.success());
    assert!(stdout(&frames).trim().ends_with("0001.jpg"));

    let features = fixture.run(&["features", "v_bbbbbbbbbbb0"]);
    assert!(features.status.success());
    assert_eq!(stdout(&features).trim(), "0,1");

    assert!(!fixture.run(&["caption", "v_zzzzzzzzzzz0"]).status.success());
}

#[test]
fn test_captions_export() {
    let fixture = Fixture::new();
    assert!(fixture.build().status.success());

    let output = fixture.run(&["captions", "--output", "captions-out.json"]);
    assert!(output.status.success());
    let exported: Vec<String> = serde_json::from_str(
        &fs::read_to_string(fixture.root().join("captions-out.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(exported, vec!["a", "c", "b"]);
}

#[test]
fn test_build_fails_on_uncaptioned_segment() {
    let fixture = Fixture::new();
    write(&fixture.root().join("keyframes/v_ccccccccccc0.txt"), "0\n");

    let output = fixture.build();
    assert!(!output.status.success());
    assert!(!fixture.snapshot().exists());
}

#[test]
fn test_clean_removes_snapshot() {
    let fixture = Fixture::new();
    assert!(fixture.build().status.success());
    assert!(fixture.run(&["clean"]).status.success());
    assert!(!fixture.snapshot().exists());
}

#[test]
fn test_config_get_and_set() {
    let fixture = Fixture::new();

    let output = fixture.run(&["config", "get", "default_top_k"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "10");

    assert!(fixture
        .run(&["config", "set", "default_metric", "euclidean"])
        .status
        .success());
    let output = fixture.run(&["config", "get", "default_metric"]);
    assert_eq!(stdout(&output).trim(), "euclidean");

    assert!(!fixture.run(&["config", "set", "default_top_k", "0"]).status.success());
    assert!(!fixture.run(&["config", "get", "nope"]).status.success());
}
