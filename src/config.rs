//! 生成参数
//!
//! 既可以从 JSON 读入（所有字段都有默认值），也可以由命令行逐项覆盖。

use std::f64::consts::LN_2;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};
use crate::topo::{Cost, DeviationOpts, MAX_LINK_COST};

/// 出口数量指数分布的 scale 参数
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EgressScale {
    /// β = pool / (4·ln 2)，出口数的中位数约为出口池的四分之一
    #[default]
    PoolQuarterMedian,
    /// 固定的 β
    Fixed(f64),
}

impl EgressScale {
    /// 与出口池大小无关的固定值 β = 4 / ln 2
    pub fn reference() -> Self {
        EgressScale::Fixed(4.0 / LN_2)
    }

    pub fn beta(&self, pool_size: usize) -> f64 {
        match *self {
            EgressScale::PoolQuarterMedian => pool_size as f64 / (4.0 * LN_2),
            EgressScale::Fixed(beta) => beta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub egress_exception_probability: f64,
    pub deviation_probability: f64,
    pub multipath_continue_probability: f64,
    /// 最多分配多少个前缀；None 或 0 表示全部
    pub prefix_limit: Option<usize>,
    pub feature_count: usize,
    pub random_seed: Option<u64>,

    pub egress_scale: EgressScale,
    /// 每个组织总流量的指数分布 scale
    pub organization_scale: f64,
    /// 每条流大小的指数分布 scale
    pub flow_scale: f64,
    /// 附加特征取值的指数分布 scale
    pub feature_scale: f64,
    /// 每个附加特征的取值个数从 Uniform(lo, hi) 中抽取
    pub feature_bound_range: (f64, f64),

    /// 偏离路径允许多出的代价；None 关闭异常注入
    pub deviation_slack: Option<Cost>,
    pub max_deviation_paths: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            egress_exception_probability: 0.01,
            deviation_probability: 0.05,
            multipath_continue_probability: 0.1,
            prefix_limit: None,
            feature_count: 12,
            random_seed: None,
            egress_scale: EgressScale::default(),
            organization_scale: 1_000_000.0,
            flow_scale: 1_000.0,
            feature_scale: 5.0,
            feature_bound_range: (2.0, 100.0),
            deviation_slack: None,
            max_deviation_paths: 64,
        }
    }
}

impl GeneratorConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        let cfg: Self = serde_json::from_str(&raw).map_err(|e| GenError::json(path, e))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, p) in [
            ("egress_exception_probability", self.egress_exception_probability),
            ("deviation_probability", self.deviation_probability),
            ("multipath_continue_probability", self.multipath_continue_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(GenError::config(format!("{name} must be in [0, 1], got {p}")));
            }
        }
        for (name, v) in [
            ("organization_scale", self.organization_scale),
            ("flow_scale", self.flow_scale),
            ("feature_scale", self.feature_scale),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(GenError::config(format!("{name} must be positive, got {v}")));
            }
        }
        if let EgressScale::Fixed(beta) = self.egress_scale {
            if !(beta.is_finite() && beta > 0.0) {
                return Err(GenError::config(format!("fixed egress scale must be positive, got {beta}")));
            }
        }
        if self.feature_count == 0 {
            return Err(GenError::config("feature_count must be at least 1"));
        }
        let (lo, hi) = self.feature_bound_range;
        if !(lo >= 1.0 && lo < hi && hi.is_finite()) {
            return Err(GenError::config(format!(
                "feature_bound_range must satisfy 1 <= lo < hi, got ({lo}, {hi})"
            )));
        }
        if let Some(slack) = self.deviation_slack {
            if slack > MAX_LINK_COST {
                return Err(GenError::config(format!(
                    "deviation_slack must be at most {MAX_LINK_COST}, got {slack}"
                )));
            }
        }
        if self.max_deviation_paths == 0 {
            return Err(GenError::config("max_deviation_paths must be at least 1"));
        }
        Ok(())
    }

    /// prefix_limit 的规范形式：0 等同于不限
    pub fn effective_prefix_limit(&self) -> Option<usize> {
        self.prefix_limit.filter(|&l| l > 0)
    }

    pub fn deviation_opts(&self) -> DeviationOpts {
        DeviationOpts {
            slack: self.deviation_slack,
            max_paths: self.max_deviation_paths,
        }
    }
}
