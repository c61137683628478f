use serde::Serialize;

use crate::errors::{HeapBenchError, Result};

/// `exp(mean(ln v))` over strictly positive values.
///
/// An empty slice returns `0.0`, which means "no data" and is never a valid
/// gain; check for emptiness before trusting the result.
pub fn geometric_mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Ok(0.0);
    }
    if let Some(bad) = values.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
        return Err(HeapBenchError::degenerate(format!(
            "geometric mean input {bad} is not strictly positive"
        )));
    }
    let log_sum: f64 = values.iter().map(|v| v.ln()).sum();
    Ok((log_sum / values.len() as f64).exp())
}

/// Per-percentile geometric mean of a set of gains.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GainSummary {
    pub p50: f64,
    pub p95: f64,
    pub cases: usize,
}

impl GainSummary {
    pub fn from_gains(gains_p50: &[f64], gains_p95: &[f64]) -> Result<Self> {
        if gains_p50.len() != gains_p95.len() {
            return Err(HeapBenchError::invalid_input(format!(
                "gain sets differ in length: p50={} p95={}",
                gains_p50.len(),
                gains_p95.len()
            )));
        }
        Ok(Self {
            p50: geometric_mean(gains_p50)?,
            p95: geometric_mean(gains_p95)?,
            cases: gains_p50.len(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.cases == 0
    }
}
