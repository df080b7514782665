//! 流量与附加特征的采样
//!
//! - 组织总流量：每个组织一次 Exp(β_org)，均分到前缀得到一个均值。该均值只记入统计，
//!   单条流的大小并不使用它。
//! - 单条流大小：每条记录一次 Exp(β_flow)，与组织总量无关。
//! - 附加特征：每个特征槽在整次运行开始时抽一个取值个数 bound ~ U(lo, hi)，
//!   每条记录取 ⌊Exp(β_feature)⌋ mod bound。

use rand::Rng;
use rand::distributions::Uniform;
use rand_distr::{Distribution, Exp};

use crate::config::GeneratorConfig;
use crate::error::{GenError, Result};

/// 每个附加特征的取值个数，整次运行固定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSpace {
    bounds: Vec<u32>,
}

impl FeatureSpace {
    pub fn sample<R: Rng + ?Sized>(count: usize, range: (f64, f64), rng: &mut R) -> Result<Self> {
        let (lo, hi) = range;
        if count == 0 || !(lo >= 1.0 && lo < hi) {
            return Err(GenError::config(format!(
                "invalid feature space: count={count}, range=({lo}, {hi})"
            )));
        }
        let dist = Uniform::new(lo, hi);
        let bounds = (0..count).map(|_| (dist.sample(rng) as u32).max(1)).collect();
        Ok(Self { bounds })
    }

    pub fn from_bounds(bounds: Vec<u32>) -> Result<Self> {
        if bounds.is_empty() || bounds.contains(&0) {
            return Err(GenError::config(format!("invalid feature bounds {bounds:?}")));
        }
        Ok(Self { bounds })
    }

    pub fn bounds(&self) -> &[u32] {
        &self.bounds
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// 长度正确且每个值都小于各自的 bound
    pub fn contains(&self, values: &[u32]) -> bool {
        values.len() == self.bounds.len() && values.iter().zip(&self.bounds).all(|(v, b)| v < b)
    }
}

#[derive(Debug, Clone)]
pub struct FlowSampler {
    organization_dist: Exp<f64>,
    flow_dist: Exp<f64>,
    feature_dist: Exp<f64>,
    features: FeatureSpace,
}

impl FlowSampler {
    pub fn new(cfg: &GeneratorConfig, features: FeatureSpace) -> Result<Self> {
        Ok(Self {
            organization_dist: exp_with_scale("organization_scale", cfg.organization_scale)?,
            flow_dist: exp_with_scale("flow_scale", cfg.flow_scale)?,
            feature_dist: exp_with_scale("feature_scale", cfg.feature_scale)?,
            features,
        })
    }

    pub fn features(&self) -> &FeatureSpace {
        &self.features
    }

    /// 组织的总流量
    pub fn organization_size<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.organization_dist.sample(rng)
    }

    /// 总流量均分到每个前缀
    pub fn per_prefix_mean(total: f64, prefixes: usize) -> f64 {
        if prefixes == 0 {
            0.0
        } else {
            total / prefixes as f64
        }
    }

    /// 单条流大小，严格为正
    pub fn flow_size<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        loop {
            let size = self.flow_dist.sample(rng);
            if size > 0.0 {
                return size;
            }
        }
    }

    pub fn feature_values<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u32> {
        self.features
            .bounds
            .iter()
            .map(|&bound| (self.feature_dist.sample(rng) as u64 % bound as u64) as u32)
            .collect()
    }
}

fn exp_with_scale(name: &str, scale: f64) -> Result<Exp<f64>> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(GenError::config(format!("{name} must be positive, got {scale}")));
    }
    Exp::new(1.0 / scale).map_err(|e| GenError::config(format!("{name}: {e}")))
}
