use std::{fs, path::Path};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

const BENCH_OUTPUT: &str = "\
=== DHeap4Simd vs std::priority_queue Benchmark ===

Test                 N          DHeap p50  DHeap p95  STL p50    STL p95    Spd(p50)  Spd(p95)
push-only            10000      0.412      0.530      0.801      0.990      1.944x    1.868x
mixed (50/50)        100000     12.500     20.000     25.000     40.000     2.000x    2.000x

=== Benchmark complete ===
";

const THRESHOLDS: &str = r#"{"default": {"min_speedup_p50": 1.5, "min_speedup_p95": 1.5}}"#;
const STRICT_THRESHOLDS: &str = r#"{
    "default": {"min_speedup_p50": 1.5, "min_speedup_p95": 1.5},
    "overrides": {"mixed (50/50)@100000": {"min_speedup_p50": 2.5}}
}"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(bench: &str, thresholds: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("bench.txt"), bench).expect("bench");
        fs::write(dir.path().join("thresholds.json"), thresholds).expect("thresholds");
        Self { dir }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().into_owned()
    }

    fn report(&self, strict: bool) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_heapbench"));
        cmd.env_remove("HEAPBENCH_THRESHOLDS");
        cmd.args([
            "report",
            "--input",
            &self.path("bench.txt"),
            "--thresholds",
            &self.path("thresholds.json"),
            "--json",
            &self.path("out.json"),
            "--markdown",
            &self.path("out.md"),
        ]);
        if strict {
            cmd.arg("--strict");
        }
        cmd
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read")).expect("json")
}

#[test]
fn test_cli_exits_with_success_on_help() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_heapbench"));
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn test_cli_clean_pass_writes_reports() {
    let ws = Workspace::new(BENCH_OUTPUT, THRESHOLDS);
    ws.report(true).assert().code(0);
    let payload = read_json(Path::new(&ws.path("out.json")));
    assert_eq!(payload["passed"], Value::Bool(true));
    assert_eq!(payload["cases"].as_array().expect("cases").len(), 2);
    let markdown = fs::read_to_string(ws.path("out.md")).expect("md");
    assert!(markdown.contains("- None"));
}

#[test]
fn test_cli_regressions_fail_only_in_strict_mode() {
    let ws = Workspace::new(BENCH_OUTPUT, STRICT_THRESHOLDS);
    ws.report(false).assert().code(0);
    ws.report(true).assert().code(1);
    let payload = read_json(Path::new(&ws.path("out.json")));
    assert_eq!(payload["passed"], Value::Bool(false));
    assert_eq!(payload["regressions"][0]["key"], "mixed (50/50)@100000");
}

#[test]
fn test_cli_empty_input_is_hard_failure() {
    let ws = Workspace::new("=== DHeap4Simd ===\n\nnothing measured\n", THRESHOLDS);
    let output = ws.report(false).output().expect("run");
    assert_eq!(output.status.code(), Some(2));
    assert!(!Path::new(&ws.path("out.json")).exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("no benchmark rows parsed").count(), 1, "{stderr}");
}

#[test]
fn test_cli_bad_thresholds_is_hard_failure() {
    let ws = Workspace::new(BENCH_OUTPUT, r#"{"default": {"min_speedup_p50": 1.0}}"#);
    ws.report(false).assert().code(2);
    assert!(!Path::new(&ws.path("out.json")).exists());
}

#[test]
fn test_cli_thresholds_from_environment() {
    let ws = Workspace::new(BENCH_OUTPUT, THRESHOLDS);
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_heapbench"));
    cmd.env("HEAPBENCH_THRESHOLDS", ws.path("thresholds.json"));
    cmd.args([
        "report",
        "--input",
        &ws.path("bench.txt"),
        "--json",
        &ws.path("out.json"),
        "--markdown",
        &ws.path("out.md"),
    ]);
    cmd.assert().code(0);
}

#[test]
fn test_cli_simd_rejects_invalid_arity() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_heapbench"));
    cmd.args([
        "simd",
        "--source",
        &dir.path().to_string_lossy(),
        "--arity",
        "1",
    ]);
    cmd.assert().code(2);
}
