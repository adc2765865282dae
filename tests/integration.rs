use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn cpack_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("cpack");
    path
}

fn setup_test_env() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let corpus_path = root.join("corpus.jsonl");
    let docs = [
        serde_json::json!({
            "source_path": "fractions/intro.md",
            "subject_key": "math",
            "topic_key": "fractions",
            "cycle_keys": ["c3"],
            "micro_targets": ["name fractions", "compare fractions"],
            "evaluation_focus": ["reasoning"],
            "body": "# Fractions\n\nA fraction names part of a whole.\n\nThe denominator counts equal parts."
        }),
        serde_json::json!({
            "source_path": "fractions/practice.md",
            "subject_key": "math",
            "topic_key": "fractions",
            "cycle_keys": ["c4"],
            "micro_targets": ["compare fractions"],
            "evaluation_focus": ["communication"],
            "body": "Practice comparing one half and one third with strips of paper."
        }),
        serde_json::json!({
            "source_path": "geometry/angles.md",
            "subject_key": "math",
            "topic_key": "geometry",
            "body": "Angles measure turns."
        }),
    ];
    let jsonl = docs
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(&corpus_path, jsonl).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/corpus.sqlite"

[retrieval]
max_tokens = 4000

[chunking]
max_tokens = 700

[logging]
level = "warn"
"#,
        root.display()
    );

    let config_path = config_dir.join("cpack.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path, corpus_path)
}

fn run_cpack(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = cpack_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run cpack binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn init_and_ingest(config_path: &Path, corpus_path: &Path) {
    let (_, stderr, ok) = run_cpack(config_path, &["init"]);
    assert!(ok, "init failed: {}", stderr);
    let (_, stderr, ok) = run_cpack(config_path, &["ingest", corpus_path.to_str().unwrap()]);
    assert!(ok, "ingest failed: {}", stderr);
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path, _) = setup_test_env();

    let (stdout, stderr, success) = run_cpack(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));

    let (_, _, success) = run_cpack(&config_path, &["init"]);
    assert!(success, "Second init failed (not idempotent)");
}

#[test]
fn test_ingest_then_reingest_skips_unchanged() {
    let (_tmp, config_path, corpus_path) = setup_test_env();
    run_cpack(&config_path, &["init"]);

    let corpus = corpus_path.to_str().unwrap();
    let (stdout, stderr, success) = run_cpack(&config_path, &["ingest", corpus]);
    assert!(success, "ingest failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("documents written: 3"));
    assert!(stdout.contains("ok"));

    let (stdout, _, success) = run_cpack(&config_path, &["ingest", corpus]);
    assert!(success);
    assert!(stdout.contains("documents written: 0"));
    assert!(stdout.contains("documents unchanged: 3"));

    let (stdout, _, success) = run_cpack(&config_path, &["ingest", corpus, "--full"]);
    assert!(success);
    assert!(stdout.contains("documents written: 3"));
}

#[test]
fn test_ingest_dry_run_writes_nothing() {
    let (_tmp, config_path, corpus_path) = setup_test_env();
    run_cpack(&config_path, &["init"]);

    let (stdout, _, success) = run_cpack(
        &config_path,
        &["ingest", corpus_path.to_str().unwrap(), "--dry-run"],
    );
    assert!(success);
    assert!(stdout.contains("dry-run"));
    assert!(stdout.contains("documents found: 3"));

    let (stdout, _, _) = run_cpack(&config_path, &["stats"]);
    assert!(stdout.contains("Chunks:      0"));
}

#[test]
fn test_retrieve_text_block() {
    let (_tmp, config_path, corpus_path) = setup_test_env();
    init_and_ingest(&config_path, &corpus_path);

    let (stdout, stderr, success) = run_cpack(
        &config_path,
        &["retrieve", "--subject", "math", "--topic", "fractions"],
    );
    assert!(success, "retrieve failed: {}", stderr);
    assert!(stdout.starts_with("## Reference Knowledge"));
    assert!(stdout.contains("Coverage: 2 chunks"));
    assert!(stdout.contains("100% of matching content"));
    assert!(stdout.contains("- compare fractions"));
    assert_eq!(stdout.matches("- compare fractions").count(), 1);
    assert!(stdout.contains("### Source: fractions/intro.md (part 1/1)"));
    assert!(!stdout.contains("Angles measure turns."));
}

#[test]
fn test_retrieve_cycle_filter_json() {
    let (_tmp, config_path, corpus_path) = setup_test_env();
    init_and_ingest(&config_path, &corpus_path);

    let (stdout, stderr, success) = run_cpack(
        &config_path,
        &[
            "retrieve", "--subject", "math", "--topic", "fractions", "--cycle", "c4", "--format",
            "json",
        ],
    );
    assert!(success, "retrieve failed: {}", stderr);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let chunks = value["chunks"].as_array().unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0]["source_path"], "fractions/practice.md");
    assert_eq!(value["compression_ratio"], 1.0);
}

#[test]
fn test_retrieve_no_match_is_empty_block() {
    let (_tmp, config_path, corpus_path) = setup_test_env();
    init_and_ingest(&config_path, &corpus_path);

    let (stdout, _, success) = run_cpack(
        &config_path,
        &["retrieve", "--subject", "history", "--topic", "rome"],
    );
    assert!(success);
    assert!(stdout.contains("Coverage: 0 chunks, 0 tokens, 0% of matching content"));
    assert!(!stdout.contains("### Source"));
}

#[test]
fn test_retrieve_without_database_fails() {
    let (_tmp, config_path, _) = setup_test_env();
    let (_, stderr, success) = run_cpack(
        &config_path,
        &["retrieve", "--subject", "math", "--topic", "fractions"],
    );
    assert!(!success);
    assert!(stderr.contains("corpus store unavailable"));
}

#[test]
fn test_stats_by_topic() {
    let (_tmp, config_path, corpus_path) = setup_test_env();
    init_and_ingest(&config_path, &corpus_path);

    let (stdout, stderr, success) = run_cpack(&config_path, &["stats"]);
    assert!(success, "stats failed: {}", stderr);
    assert!(stdout.contains("Sources:     3"));
    assert!(stdout.contains("math/fractions"));
    assert!(stdout.contains("math/geometry"));
}
