use serde::Serialize;
use tracing::warn;

use crate::{
    record::{CaseKey, MeasurementRecord, TestKind},
    thresholds::{ThresholdConfig, ThresholdSet},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CaseStatus {
    Pass,
    Fail,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EvaluatedCase {
    #[serde(flatten)]
    pub record: MeasurementRecord,
    pub threshold: ThresholdConfig,
    pub status: CaseStatus,
}

/// A case below its effective threshold. Both percentiles are always recorded,
/// even when only one of them failed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Regression {
    pub key: CaseKey,
    pub test: TestKind,
    pub n: u64,
    pub speedup_p50: f64,
    pub speedup_p95: f64,
    pub min_speedup_p50: f64,
    pub min_speedup_p95: f64,
}

impl Regression {
    pub fn p50_violated(&self) -> bool {
        self.speedup_p50 < self.min_speedup_p50
    }

    pub fn p95_violated(&self) -> bool {
        self.speedup_p95 < self.min_speedup_p95
    }

    /// The failing percentiles only, e.g. `speedup_p50=2.000 < 2.500`.
    pub fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.p50_violated() {
            out.push(format!(
                "speedup_p50={:.3} < {:.3}",
                self.speedup_p50, self.min_speedup_p50
            ));
        }
        if self.p95_violated() {
            out.push(format!(
                "speedup_p95={:.3} < {:.3}",
                self.speedup_p95, self.min_speedup_p95
            ));
        }
        out
    }
}

pub fn evaluate(
    record: &MeasurementRecord,
    threshold: &ThresholdConfig,
) -> (CaseStatus, Option<Regression>) {
    let p50_ok = record.speedup_p50 >= threshold.min_speedup_p50;
    let p95_ok = record.speedup_p95 >= threshold.min_speedup_p95;
    if p50_ok && p95_ok {
        return (CaseStatus::Pass, None);
    }
    let regression = Regression {
        key: record.key(),
        test: record.test,
        n: record.n,
        speedup_p50: record.speedup_p50,
        speedup_p95: record.speedup_p95,
        min_speedup_p50: threshold.min_speedup_p50,
        min_speedup_p95: threshold.min_speedup_p95,
    };
    (CaseStatus::Fail, Some(regression))
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GateReport {
    pub passed: bool,
    pub thresholds: ThresholdSet,
    pub cases: Vec<EvaluatedCase>,
    pub regressions: Vec<Regression>,
}

#[derive(Clone, Debug)]
pub struct SpeedupGate {
    thresholds: ThresholdSet,
}

impl SpeedupGate {
    pub fn new(thresholds: ThresholdSet) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdSet {
        &self.thresholds
    }

    /// Evaluates `records` in order; cases and regressions keep input order.
    pub fn evaluate(&self, records: &[MeasurementRecord]) -> GateReport {
        let mut cases = Vec::with_capacity(records.len());
        let mut regressions = Vec::new();
        for record in records {
            let threshold = self.thresholds.resolve(&record.key());
            let (status, regression) = evaluate(record, &threshold);
            if let Some(regression) = regression {
                warn!(
                    case = %regression.key,
                    violations = %regression.violations().join(", "),
                    "speedup below threshold"
                );
                regressions.push(regression);
            }
            cases.push(EvaluatedCase {
                record: *record,
                threshold,
                status,
            });
        }
        GateReport {
            passed: regressions.is_empty(),
            thresholds: self.thresholds.clone(),
            cases,
            regressions,
        }
    }
}
