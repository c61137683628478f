use std::{fs, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::{
    errors::{HeapBenchError, Result},
    gate::{GateReport, SpeedupGate},
    orchestrator::{
        BuildParams, CmakeRunner, DEFAULT_BUILD_ROOT, RunParams, SimdPolicy, SimdRequest,
        parse_sizes, quantify_simd,
    },
    parser::{parse_output, require_records},
    report::{
        annotation_line, render_gate_json, render_gate_markdown, render_simd_json,
        render_simd_table, write_report,
    },
    thresholds::{THRESHOLDS_ENV, ThresholdSet},
};

#[derive(Debug, Parser)]
#[command(
    name = "heapbench",
    version,
    about = "Gate d-ary heap benchmark speedups and quantify SIMD contribution"
)]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse benchmark output, write JSON/Markdown reports and enforce thresholds.
    Report(ReportArgs),
    /// Build SIMD-enabled and forced-scalar variants and compare them.
    Simd(SimdArgs),
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Benchmark stdout capture.
    #[arg(long)]
    pub input: PathBuf,
    #[arg(long, env = THRESHOLDS_ENV)]
    pub thresholds: PathBuf,
    #[arg(long)]
    pub json: PathBuf,
    #[arg(long)]
    pub markdown: PathBuf,
    /// Exit non-zero when any threshold is violated.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Args)]
pub struct SimdArgs {
    #[arg(long, default_value_t = 1)]
    pub warmup: u32,
    #[arg(long, default_value_t = 7)]
    pub iters: u32,
    #[arg(long, default_value = "10000,100000,1000000")]
    pub sizes: String,
    /// Build tree prefix, relative to --source unless absolute.
    #[arg(long, default_value = DEFAULT_BUILD_ROOT)]
    pub build_root: PathBuf,
    /// Root of the CMake project.
    #[arg(long, default_value = ".")]
    pub source: PathBuf,
    #[arg(long, default_value_t = 0)]
    pub payload_bytes: u32,
    #[arg(long, default_value_t = 4)]
    pub arity: u32,
    /// HYBRID, ALWAYS or NEVER; applies to the non-scalar build.
    #[arg(long, default_value = "HYBRID")]
    pub simd_policy: SimdPolicy,
    #[arg(long)]
    pub json: Option<PathBuf>,
}

/// Process outcome; each maps to a distinct exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Clean,
    Regressions,
    Failed,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Clean => 0,
            RunStatus::Regressions => 1,
            RunStatus::Failed => 2,
        }
    }
}

pub fn gate_status(report: &GateReport, strict: bool) -> RunStatus {
    if strict && !report.passed {
        RunStatus::Regressions
    } else {
        RunStatus::Clean
    }
}

pub fn run(cli: Cli) -> RunStatus {
    let result = match cli.command {
        Command::Report(args) => run_report(&args),
        Command::Simd(args) => run_simd(&args),
    };
    match result {
        Ok(status) => status,
        Err(err) => {
            eprintln!("error: {err}");
            RunStatus::Failed
        }
    }
}

pub fn run_report(args: &ReportArgs) -> Result<RunStatus> {
    let text = fs::read_to_string(&args.input).map_err(|e| {
        HeapBenchError::io(format!("unable to read {}: {e}", args.input.display()))
    })?;
    let thresholds = ThresholdSet::load(&args.thresholds)?;
    let source = args.input.display().to_string();
    let records = require_records(parse_output(&text), &source)?;
    let report = SpeedupGate::new(thresholds).evaluate(&records);
    write_report(&args.json, &render_gate_json(&report)?)?;
    write_report(&args.markdown, &render_gate_markdown(&report))?;
    info!(
        cases = report.cases.len(),
        regressions = report.regressions.len(),
        json = %args.json.display(),
        markdown = %args.markdown.display(),
        "wrote benchmark reports"
    );
    for regression in &report.regressions {
        println!("{}", annotation_line(regression));
    }
    let status = gate_status(&report, args.strict);
    if status == RunStatus::Regressions {
        eprintln!(
            "Threshold check failed for {} case(s).",
            report.regressions.len()
        );
    }
    Ok(status)
}

pub fn run_simd(args: &SimdArgs) -> Result<RunStatus> {
    let request = SimdRequest {
        build: BuildParams {
            payload_bytes: args.payload_bytes,
            arity: args.arity,
            simd_policy: args.simd_policy,
        },
        run: RunParams {
            warmup: args.warmup,
            iters: args.iters,
            sizes: parse_sizes(&args.sizes)?,
        },
        build_root: args.build_root.clone(),
    };
    let runner = CmakeRunner::new(&args.source);
    let report = quantify_simd(&runner, &request)?;
    print!("{}", render_simd_table(&report));
    if let Some(path) = &args.json {
        write_report(path, &render_simd_json(&report)?)?;
        info!(json = %path.display(), "wrote SIMD comparison report");
    }
    Ok(RunStatus::Clean)
}
