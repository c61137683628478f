use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    errors::{HeapBenchError, Result},
    record::CaseKey,
};

pub const THRESHOLDS_ENV: &str = "HEAPBENCH_THRESHOLDS";

/// Effective speedup gate for one case.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub min_speedup_p50: f64,
    pub min_speedup_p95: f64,
}

impl ThresholdConfig {
    pub fn new(min_speedup_p50: f64, min_speedup_p95: f64) -> Self {
        Self {
            min_speedup_p50,
            min_speedup_p95,
        }
    }
}

/// Partial threshold; present fields replace the defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_speedup_p50: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_speedup_p95: Option<f64>,
}

impl ThresholdOverride {
    pub fn p50(value: f64) -> Self {
        Self {
            min_speedup_p50: Some(value),
            min_speedup_p95: None,
        }
    }

    pub fn p95(value: f64) -> Self {
        Self {
            min_speedup_p50: None,
            min_speedup_p95: Some(value),
        }
    }

    pub fn apply(&self, base: ThresholdConfig) -> ThresholdConfig {
        ThresholdConfig {
            min_speedup_p50: self.min_speedup_p50.unwrap_or(base.min_speedup_p50),
            min_speedup_p95: self.min_speedup_p95.unwrap_or(base.min_speedup_p95),
        }
    }
}

#[derive(Deserialize)]
struct RawThresholds {
    default: Option<ThresholdOverride>,
    #[serde(default)]
    overrides: Option<BTreeMap<String, ThresholdOverride>>,
}

/// Validated threshold configuration: defaults plus per-case overrides.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ThresholdSet {
    #[serde(rename = "default")]
    defaults: ThresholdConfig,
    overrides: BTreeMap<CaseKey, ThresholdOverride>,
}

impl ThresholdSet {
    pub fn new(
        defaults: ThresholdConfig,
        overrides: BTreeMap<CaseKey, ThresholdOverride>,
    ) -> Result<Self> {
        check_positive("default.min_speedup_p50", defaults.min_speedup_p50)?;
        check_positive("default.min_speedup_p95", defaults.min_speedup_p95)?;
        for (key, entry) in &overrides {
            if let Some(value) = entry.min_speedup_p50 {
                check_positive(&format!("overrides[{key}].min_speedup_p50"), value)?;
            }
            if let Some(value) = entry.min_speedup_p95 {
                check_positive(&format!("overrides[{key}].min_speedup_p95"), value)?;
            }
        }
        Ok(Self {
            defaults,
            overrides,
        })
    }

    pub fn uniform(defaults: ThresholdConfig) -> Result<Self> {
        Self::new(defaults, BTreeMap::new())
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: RawThresholds = serde_json::from_str(text)
            .map_err(|e| HeapBenchError::configuration(format!("invalid thresholds json: {e}")))?;
        let default = raw.default.ok_or_else(|| {
            HeapBenchError::configuration("thresholds json must contain a 'default' object")
        })?;
        let defaults = ThresholdConfig {
            min_speedup_p50: require_field(default.min_speedup_p50, "min_speedup_p50")?,
            min_speedup_p95: require_field(default.min_speedup_p95, "min_speedup_p95")?,
        };
        let mut overrides = BTreeMap::new();
        for (key, entry) in raw.overrides.unwrap_or_default() {
            let case = key.parse::<CaseKey>().map_err(|e| {
                HeapBenchError::configuration(format!("override key {key:?} is invalid: {e}"))
            })?;
            overrides.insert(case, entry);
        }
        Self::new(defaults, overrides)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            HeapBenchError::io(format!("unable to read thresholds {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn defaults(&self) -> ThresholdConfig {
        self.defaults
    }

    pub fn overrides(&self) -> &BTreeMap<CaseKey, ThresholdOverride> {
        &self.overrides
    }

    pub fn resolve(&self, key: &CaseKey) -> ThresholdConfig {
        match self.overrides.get(key) {
            Some(entry) => entry.apply(self.defaults),
            None => self.defaults,
        }
    }
}

fn require_field(value: Option<f64>, field: &str) -> Result<f64> {
    value.ok_or_else(|| {
        HeapBenchError::configuration(format!("thresholds.default must include '{field}'"))
    })
}

fn check_positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(HeapBenchError::configuration(format!(
            "{field} must be a positive number, got {value}"
        )))
    }
}
