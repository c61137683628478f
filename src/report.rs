use std::{fs, path::Path};

use serde::Serialize;

use crate::{
    errors::{HeapBenchError, Result},
    gate::{CaseStatus, GateReport, Regression},
    orchestrator::{SimdPolicy, SimdReport},
    record::{MeasurementRecord, TestKind},
    stats::GainSummary,
};

pub fn render_gate_json(report: &GateReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(|e| HeapBenchError::serialization(e.to_string()))
}

pub fn render_gate_markdown(report: &GateReport) -> String {
    let defaults = report.thresholds.defaults();
    let mut lines = vec![
        "## Benchmark Summary".to_string(),
        String::new(),
        format!(
            "Threshold defaults: `Spd(p50) >= {:?}`, `Spd(p95) >= {:?}`",
            defaults.min_speedup_p50, defaults.min_speedup_p95
        ),
        String::new(),
        "| Test | N | DHeap p50 (ms) | DHeap p95 (ms) | STL p50 (ms) | STL p95 (ms) | Spd(p50) | Spd(p95) | Status |"
            .to_string(),
        "|---|---:|---:|---:|---:|---:|---:|---:|---|".to_string(),
    ];
    for case in &report.cases {
        let r = &case.record;
        lines.push(format!(
            "| {} | {} | {:.3} | {:.3} | {:.3} | {:.3} | {:.3}x | {:.3}x | {} |",
            r.test,
            r.n,
            r.subject_p50,
            r.subject_p95,
            r.baseline_p50,
            r.baseline_p95,
            r.speedup_p50,
            r.speedup_p95,
            status_label(case.status)
        ));
    }
    lines.push(String::new());
    lines.push("### Regression Alerts".to_string());
    if report.regressions.is_empty() {
        lines.push("- None".to_string());
    }
    for regression in &report.regressions {
        lines.push(format!(
            "- `{}` threshold violation: Spd(p50)={:.3}x < {:.3}x or Spd(p95)={:.3}x < {:.3}x",
            regression.key,
            regression.speedup_p50,
            regression.min_speedup_p50,
            regression.speedup_p95,
            regression.min_speedup_p95
        ));
    }
    lines.join("\n") + "\n"
}

/// GitHub Actions `::warning::` line for one regression.
pub fn annotation_line(regression: &Regression) -> String {
    format!(
        "::warning::Benchmark regression in {}: Spd(p50)={:.3}x (min {:.3}x), Spd(p95)={:.3}x (min {:.3}x)",
        regression.key,
        regression.speedup_p50,
        regression.min_speedup_p50,
        regression.speedup_p95,
        regression.min_speedup_p95
    )
}

fn status_label(status: CaseStatus) -> &'static str {
    match status {
        CaseStatus::Pass => "PASS",
        CaseStatus::Fail => "FAIL",
    }
}

pub fn render_simd_table(report: &SimdReport) -> String {
    let header = format!(
        "{:<18} {:>10} {:>10} {:>11} {:>10} {:>10} {:>11} {:>10}",
        "Test", "N", "SIMD p50", "Scalar p50", "Gain p50", "SIMD p95", "Scalar p95", "Gain p95"
    );
    let mut lines = vec![
        "SIMD contribution (DHeap only): gain = scalar / simd".to_string(),
        header.clone(),
        "-".repeat(header.len()),
    ];
    for pair in &report.comparison.pairs {
        let (on, off) = (pair.primary(), pair.secondary());
        lines.push(format!(
            "{:<18} {:>10} {:>10.3} {:>11.3} {:>9.3}x {:>10.3} {:>11.3} {:>9.3}x",
            pair.key().test.as_str(),
            pair.key().n,
            on.subject_p50,
            off.subject_p50,
            pair.gain_p50(),
            on.subject_p95,
            off.subject_p95,
            pair.gain_p95()
        ));
    }
    lines.push(String::new());
    lines.push(aggregate_line(&report.aggregate));
    lines.join("\n") + "\n"
}

pub fn aggregate_line(summary: &GainSummary) -> String {
    format!(
        "Aggregate gain (geometric mean): p50={:.3}x, p95={:.3}x",
        summary.p50, summary.p95
    )
}

#[derive(Serialize)]
struct SimdPayload<'a> {
    warmup: u32,
    iters: u32,
    sizes: String,
    arity: u32,
    simd_policy: SimdPolicy,
    payload_bytes: u32,
    cases: Vec<SimdCase<'a>>,
    aggregate: &'a GainSummary,
}

#[derive(Serialize)]
struct SimdCase<'a> {
    test: TestKind,
    n: u64,
    simd_on: &'a MeasurementRecord,
    simd_off: &'a MeasurementRecord,
    gain_p50: f64,
    gain_p95: f64,
}

pub fn render_simd_json(report: &SimdReport) -> Result<String> {
    let payload = SimdPayload {
        warmup: report.run.warmup,
        iters: report.run.iters,
        sizes: report.run.sizes_arg(),
        arity: report.build.arity,
        simd_policy: report.build.simd_policy,
        payload_bytes: report.build.payload_bytes,
        cases: report
            .comparison
            .pairs
            .iter()
            .map(|pair| SimdCase {
                test: pair.key().test,
                n: pair.key().n,
                simd_on: pair.primary(),
                simd_off: pair.secondary(),
                gain_p50: pair.gain_p50(),
                gain_p95: pair.gain_p95(),
            })
            .collect(),
        aggregate: &report.aggregate,
    };
    serde_json::to_string_pretty(&payload).map_err(|e| HeapBenchError::serialization(e.to_string()))
}

pub fn write_report(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)
        .map_err(|e| HeapBenchError::io(format!("unable to write {}: {e}", path.display())))
}
