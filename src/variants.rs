use serde::Serialize;

use crate::{
    errors::{HeapBenchError, Result},
    parser::index_by_key,
    record::{CaseKey, MeasurementRecord},
    stats::GainSummary,
};

/// Two variant measurements of the same case and the gain of the primary
/// variant's subject latency over the secondary's.
///
/// Pairs only come out of [`compare_variants`], so both records always share
/// `key`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariantPair {
    key: CaseKey,
    primary: MeasurementRecord,
    secondary: MeasurementRecord,
    gain_p50: f64,
    gain_p95: f64,
}

impl VariantPair {
    fn join(
        key: CaseKey,
        primary: MeasurementRecord,
        secondary: MeasurementRecord,
    ) -> Result<Self> {
        let gain_p50 = gain(&key, "p50", primary.subject_p50, secondary.subject_p50)?;
        let gain_p95 = gain(&key, "p95", primary.subject_p95, secondary.subject_p95)?;
        Ok(Self {
            key,
            primary,
            secondary,
            gain_p50,
            gain_p95,
        })
    }

    pub fn key(&self) -> CaseKey {
        self.key
    }

    pub fn primary(&self) -> &MeasurementRecord {
        &self.primary
    }

    pub fn secondary(&self) -> &MeasurementRecord {
        &self.secondary
    }

    /// `secondary.subject_p50 / primary.subject_p50`.
    pub fn gain_p50(&self) -> f64 {
        self.gain_p50
    }

    pub fn gain_p95(&self) -> f64 {
        self.gain_p95
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct VariantComparison {
    pub pairs: Vec<VariantPair>,
}

impl VariantComparison {
    pub fn gains_p50(&self) -> Vec<f64> {
        self.pairs.iter().map(VariantPair::gain_p50).collect()
    }

    pub fn gains_p95(&self) -> Vec<f64> {
        self.pairs.iter().map(VariantPair::gain_p95).collect()
    }

    pub fn summary(&self) -> Result<GainSummary> {
        GainSummary::from_gains(&self.gains_p50(), &self.gains_p95())
    }
}

/// Joins `secondary` onto every distinct key of `primary`.
///
/// Pairs are ordered by case key. Any primary key without a secondary row
/// aborts the comparison.
pub fn compare_variants(
    primary: &[MeasurementRecord],
    secondary: &[MeasurementRecord],
) -> Result<VariantComparison> {
    let secondary_index = index_by_key(secondary);
    let mut entries: Vec<(CaseKey, &MeasurementRecord)> =
        index_by_key(primary).into_iter().collect();
    entries.sort_by_key(|(key, _)| *key);
    let pairs = entries
        .into_iter()
        .map(|(key, base)| {
            let other = secondary_index
                .get(&key)
                .ok_or_else(|| HeapBenchError::join_mismatch(key.to_string()))?;
            VariantPair::join(key, *base, **other)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(VariantComparison { pairs })
}

fn gain(key: &CaseKey, percentile: &str, primary: f64, secondary: f64) -> Result<f64> {
    for (variant, latency) in [("primary", primary), ("secondary", secondary)] {
        if !(latency.is_finite() && latency > 0.0) {
            return Err(HeapBenchError::degenerate(format!(
                "{key} {variant} {percentile} latency {latency} is not positive"
            )));
        }
    }
    Ok(secondary / primary)
}
