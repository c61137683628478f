//! Parsing, speedup gating and SIMD contribution analysis for the d-ary heap
//! benchmark suite.
//! Run the parser benchmark with `cargo bench` to inspect reports under `target/criterion`.

pub mod cli;
pub mod errors;
pub mod gate;
pub mod orchestrator;
pub mod parser;
pub mod record;
pub mod report;
pub mod stats;
pub mod thresholds;
pub mod variants;

pub use crate::errors::{HeapBenchError, Result};
pub use crate::gate::{CaseStatus, GateReport, Regression, SpeedupGate};
pub use crate::parser::{parse_line, parse_output};
pub use crate::record::{CaseKey, MeasurementRecord, TestKind};
pub use crate::stats::{GainSummary, geometric_mean};
pub use crate::thresholds::{ThresholdConfig, ThresholdOverride, ThresholdSet};
pub use crate::variants::{VariantComparison, VariantPair, compare_variants};
