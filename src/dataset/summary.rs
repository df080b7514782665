//! 统计量的分位数摘要（nearest-rank）

use serde::{Deserialize, Serialize};

/// Distribution summary written to `stats.json` (one per statistic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p99: f64,
    pub max: f64,
    pub mean: f64,
}

impl Summary {
    /// `None` for an empty sample. Quantiles use the nearest-rank method.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();
        let rank = |q: f64| {
            let idx = ((q * n as f64).ceil() as usize).clamp(1, n) - 1;
            sorted[idx]
        };
        Some(Self {
            count: n,
            min: sorted[0],
            p25: rank(0.25),
            p50: rank(0.50),
            p75: rank(0.75),
            p99: rank(0.99),
            max: sorted[n - 1],
            mean: sorted.iter().sum::<f64>() / n as f64,
        })
    }

    pub fn of_counts(values: &[usize]) -> Option<Self> {
        let as_f64: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        Self::of(&as_f64)
    }
}
