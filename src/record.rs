use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

use crate::{errors::HeapBenchError, parser::parse_size};

/// Workload categories printed by the heap benchmark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestKind {
    #[serde(rename = "push-only")]
    PushOnly,
    #[serde(rename = "pop-only")]
    PopOnly,
    #[serde(rename = "mixed (50/50)")]
    Mixed,
}

impl TestKind {
    pub const ALL: [TestKind; 3] = [TestKind::PushOnly, TestKind::PopOnly, TestKind::Mixed];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestKind::PushOnly => "push-only",
            TestKind::PopOnly => "pop-only",
            TestKind::Mixed => "mixed (50/50)",
        }
    }

    pub fn from_literal(literal: &str) -> Option<Self> {
        TestKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == literal)
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestKind {
    type Err = HeapBenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TestKind::from_literal(s)
            .ok_or_else(|| HeapBenchError::invalid_input(format!("unknown test name {s:?}")))
    }
}

/// `(test, n)` identity of one benchmark scenario, rendered as `<test>@<n>`.
///
/// Keys order by the test literal first and then by size, which is the order
/// comparison tables are printed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CaseKey {
    pub test: TestKind,
    pub n: u64,
}

impl CaseKey {
    pub fn new(test: TestKind, n: u64) -> Self {
        Self { test, n }
    }
}

impl fmt::Display for CaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.test, self.n)
    }
}

impl FromStr for CaseKey {
    type Err = HeapBenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (test, n) = s
            .rsplit_once('@')
            .ok_or_else(|| HeapBenchError::invalid_input(format!("case key {s:?} lacks '@'")))?;
        let test = test.parse::<TestKind>()?;
        let n = parse_size(n)
            .ok_or_else(|| HeapBenchError::invalid_input(format!("case key {s:?} has bad size")))?;
        Ok(Self { test, n })
    }
}

impl PartialOrd for CaseKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CaseKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.test
            .as_str()
            .cmp(other.test.as_str())
            .then_with(|| self.n.cmp(&other.n))
    }
}

impl Serialize for CaseKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One parsed benchmark row. The speedup columns are taken verbatim from the
/// benchmark output and never recomputed from the latencies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub test: TestKind,
    pub n: u64,
    #[serde(rename = "dheap_p50_ms")]
    pub subject_p50: f64,
    #[serde(rename = "dheap_p95_ms")]
    pub subject_p95: f64,
    #[serde(rename = "stl_p50_ms")]
    pub baseline_p50: f64,
    #[serde(rename = "stl_p95_ms")]
    pub baseline_p95: f64,
    pub speedup_p50: f64,
    pub speedup_p95: f64,
}

impl MeasurementRecord {
    pub fn key(&self) -> CaseKey {
        CaseKey::new(self.test, self.n)
    }

    /// Renders the record back into the benchmark row grammar.
    ///
    /// `f64`'s `Display` is the shortest exact representation and never uses
    /// exponent notation, so parsing the result yields an identical record.
    pub fn to_line(&self) -> String {
        format!(
            "{} {} {} {} {} {} {}x {}x",
            self.test,
            self.n,
            self.subject_p50,
            self.subject_p95,
            self.baseline_p50,
            self.baseline_p95,
            self.speedup_p50,
            self.speedup_p95
        )
    }

    /// `baseline / subject` per percentile, computed from the latency columns.
    ///
    /// Only useful for cross-checking the reported speedups; a zero subject
    /// latency yields an infinite ratio.
    pub fn recomputed_speedup(&self) -> (f64, f64) {
        (
            self.baseline_p50 / self.subject_p50,
            self.baseline_p95 / self.subject_p95,
        )
    }
}
