use std::{
    fmt, fs,
    path::{Path, PathBuf},
    process::Command,
    str::FromStr,
};

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    errors::{HeapBenchError, Result},
    parser::{parse_output, require_records},
    record::MeasurementRecord,
    stats::GainSummary,
    variants::{VariantComparison, compare_variants},
};

pub const BENCH_BINARY: &str = "bench_dheap4";
pub const DEFAULT_BUILD_ROOT: &str = "build-simd-compare";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SimdPolicy {
    #[default]
    Hybrid,
    Always,
    Never,
}

impl SimdPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimdPolicy::Hybrid => "HYBRID",
            SimdPolicy::Always => "ALWAYS",
            SimdPolicy::Never => "NEVER",
        }
    }
}

impl fmt::Display for SimdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimdPolicy {
    type Err = HeapBenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "HYBRID" => Ok(SimdPolicy::Hybrid),
            "ALWAYS" => Ok(SimdPolicy::Always),
            "NEVER" => Ok(SimdPolicy::Never),
            other => Err(HeapBenchError::configuration(format!(
                "simd policy must be HYBRID, ALWAYS or NEVER, got {other}"
            ))),
        }
    }
}

/// The two builds compared when quantifying vectorization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    Accelerated,
    ForcedScalar,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Accelerated, Variant::ForcedScalar];

    pub fn force_scalar(&self) -> bool {
        matches!(self, Variant::ForcedScalar)
    }

    pub fn dir_name(&self) -> &'static str {
        match self {
            Variant::Accelerated => "simd-on",
            Variant::ForcedScalar => "simd-off",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Accelerated => f.write_str("SIMD-enabled"),
            Variant::ForcedScalar => f.write_str("forced-scalar"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BuildParams {
    pub payload_bytes: u32,
    pub arity: u32,
    pub simd_policy: SimdPolicy,
}

impl Default for BuildParams {
    fn default() -> Self {
        Self {
            payload_bytes: 0,
            arity: 4,
            simd_policy: SimdPolicy::Hybrid,
        }
    }
}

impl BuildParams {
    pub fn validate(&self) -> Result<()> {
        if self.arity < 2 {
            return Err(HeapBenchError::configuration(format!(
                "arity must be >= 2, got {}",
                self.arity
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunParams {
    pub warmup: u32,
    pub iters: u32,
    pub sizes: Vec<u64>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            warmup: 1,
            iters: 7,
            sizes: vec![10_000, 100_000, 1_000_000],
        }
    }
}

impl RunParams {
    pub fn validate(&self) -> Result<()> {
        if self.iters < 1 {
            return Err(HeapBenchError::configuration("iters must be >= 1"));
        }
        if self.sizes.is_empty() {
            return Err(HeapBenchError::configuration("sizes must not be empty"));
        }
        if self.sizes.contains(&0) {
            return Err(HeapBenchError::configuration("sizes must be positive"));
        }
        Ok(())
    }

    pub fn sizes_arg(&self) -> String {
        self.sizes
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Parses a comma-separated size list such as `10000,100000`.
pub fn parse_sizes(list: &str) -> Result<Vec<u64>> {
    list.split(',')
        .map(|item| {
            let item = item.trim();
            item.parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    HeapBenchError::configuration(format!("invalid benchmark size {item:?}"))
                })
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimdRequest {
    pub build: BuildParams,
    pub run: RunParams,
    /// Relative roots are resolved by the runner against its source tree.
    pub build_root: PathBuf,
}

impl Default for SimdRequest {
    fn default() -> Self {
        Self {
            build: BuildParams::default(),
            run: RunParams::default(),
            build_root: PathBuf::from(DEFAULT_BUILD_ROOT),
        }
    }
}

impl SimdRequest {
    pub fn validate(&self) -> Result<()> {
        self.build.validate()?;
        self.run.validate()
    }

    pub fn build_dir(&self, variant: Variant) -> PathBuf {
        self.build_root.join(variant.dir_name())
    }
}

/// Produces and runs benchmark artifacts for one variant.
pub trait VariantRunner {
    fn build(&self, variant: Variant, params: &BuildParams, build_dir: &Path) -> Result<PathBuf>;
    fn run(&self, artifact: &Path, params: &RunParams) -> Result<String>;
}

/// Runner that configures and builds the C++ suite with CMake.
#[derive(Clone, Debug)]
pub struct CmakeRunner {
    source_dir: PathBuf,
}

impl CmakeRunner {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
        }
    }

    /// Absolute form of `path`; relative paths are taken from the source tree.
    pub fn resolve(&self, path: &Path) -> Result<PathBuf> {
        let joined = self.source_dir.join(path);
        std::path::absolute(&joined).map_err(|e| {
            HeapBenchError::io(format!("unable to resolve {}: {e}", joined.display()))
        })
    }
}

impl VariantRunner for CmakeRunner {
    fn build(&self, variant: Variant, params: &BuildParams, build_dir: &Path) -> Result<PathBuf> {
        let build_dir = self.resolve(build_dir)?;
        fs::create_dir_all(&build_dir).map_err(|e| {
            HeapBenchError::io(format!("unable to create {}: {e}", build_dir.display()))
        })?;
        run_command("cmake", &configure_args(variant, params, &build_dir), &self.source_dir)?;
        run_command("cmake", &build_args(&build_dir), &self.source_dir)?;
        Ok(build_dir.join(BENCH_BINARY))
    }

    fn run(&self, artifact: &Path, params: &RunParams) -> Result<String> {
        let artifact = self.resolve(artifact)?;
        run_command(&artifact.to_string_lossy(), &bench_args(params), &self.source_dir)
    }
}

pub fn configure_args(variant: Variant, params: &BuildParams, build_dir: &Path) -> Vec<String> {
    vec![
        "-S".into(),
        ".".into(),
        "-B".into(),
        build_dir.display().to_string(),
        "-DCMAKE_BUILD_TYPE=Release".into(),
        format!(
            "-DDHEAP_FORCE_SCALAR={}",
            if variant.force_scalar() { "ON" } else { "OFF" }
        ),
        format!("-DDHEAP_NODE_PAYLOAD_BYTES={}", params.payload_bytes),
        format!("-DDHEAP_ARITY={}", params.arity),
        format!("-DDHEAP_SIMD_POLICY={}", params.simd_policy),
    ]
}

pub fn build_args(build_dir: &Path) -> Vec<String> {
    vec!["--build".into(), build_dir.display().to_string(), "-j".into()]
}

pub fn bench_args(params: &RunParams) -> Vec<String> {
    vec![
        "--warmup".into(),
        params.warmup.to_string(),
        "--iters".into(),
        params.iters.to_string(),
        "--sizes".into(),
        params.sizes_arg(),
    ]
}

fn run_command(program: &str, args: &[String], cwd: &Path) -> Result<String> {
    let command_line = format!("{program} {}", args.join(" "));
    debug!(command = %command_line, cwd = %cwd.display(), "spawning");
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| HeapBenchError::process(format!("unable to spawn {command_line}: {e}")))?;
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let code = output
            .status
            .code()
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        return Err(HeapBenchError::process(format!(
            "command failed ({code}): {command_line}\n{stdout}{stderr}"
        )));
    }
    Ok(stdout)
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimdReport {
    pub build: BuildParams,
    pub run: RunParams,
    pub comparison: VariantComparison,
    pub aggregate: GainSummary,
}

/// Builds both variants, runs both, and measures the accelerated build
/// against the forced-scalar one (`gain = scalar / simd`).
pub fn quantify_simd<R: VariantRunner>(runner: &R, request: &SimdRequest) -> Result<SimdReport> {
    request.validate()?;
    let accelerated_bin = build_variant(runner, request, Variant::Accelerated)?;
    let scalar_bin = build_variant(runner, request, Variant::ForcedScalar)?;
    let accelerated = run_variant(runner, request, Variant::Accelerated, &accelerated_bin)?;
    let scalar = run_variant(runner, request, Variant::ForcedScalar, &scalar_bin)?;
    let comparison = compare_variants(&accelerated, &scalar)?;
    let aggregate = comparison.summary()?;
    Ok(SimdReport {
        build: request.build.clone(),
        run: request.run.clone(),
        comparison,
        aggregate,
    })
}

fn build_variant<R: VariantRunner>(
    runner: &R,
    request: &SimdRequest,
    variant: Variant,
) -> Result<PathBuf> {
    let dir = request.build_dir(variant);
    info!(%variant, dir = %dir.display(), "configuring and building variant");
    runner.build(variant, &request.build, &dir)
}

fn run_variant<R: VariantRunner>(
    runner: &R,
    request: &SimdRequest,
    variant: Variant,
    artifact: &Path,
) -> Result<Vec<MeasurementRecord>> {
    info!(
        %variant,
        warmup = request.run.warmup,
        iters = request.run.iters,
        sizes = %request.run.sizes_arg(),
        arity = request.build.arity,
        policy = %request.build.simd_policy,
        payload = request.build.payload_bytes,
        "running benchmark"
    );
    let text = runner.run(artifact, &request.run)?;
    require_records(parse_output(&text), &format!("{variant} benchmark output"))
}
