//! 流记录与按特征取值
//!
//! 下游按特征名查询流属性；这里用 [`Feature`] 枚举代替字符串分支。

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ipnet::IpNet;

use super::sampler::FeatureSpace;
use crate::error::{GenError, Result};
use crate::topo::{NodeId, Path};

/// 数据集中的一条流
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRecord {
    /// ingress ... egress
    pub path: Path,
    pub organization: Arc<str>,
    pub prefix: IpNet,
    pub traffic_size: f64,
    pub shortest_path: bool,
    pub features: Vec<u32>,
}

impl FlowRecord {
    pub fn ingress(&self) -> NodeId {
        self.path[0]
    }

    pub fn egress(&self) -> NodeId {
        self.path[self.path.len() - 1]
    }

    /// 按特征取值
    pub fn get(&self, feature: Feature) -> Option<FeatureValue<'_>> {
        Some(match feature {
            Feature::Path => FeatureValue::Path(&self.path),
            Feature::Destination => FeatureValue::Text(&self.organization),
            Feature::Prefix => FeatureValue::Prefix(self.prefix),
            Feature::Ingress => FeatureValue::Node(self.ingress()),
            Feature::Egress => FeatureValue::Node(self.egress()),
            Feature::ShortestPath => FeatureValue::Flag(self.shortest_path),
            Feature::Extra(i) => FeatureValue::Number(*self.features.get(i)?),
        })
    }

    /// 检查生成结果的不变量
    pub fn check(&self, space: &FeatureSpace) -> Result<()> {
        if self.path.is_empty() {
            return Err(GenError::invariant(format!(
                "empty path for {} / {}",
                self.organization, self.prefix
            )));
        }
        if !(self.traffic_size > 0.0) {
            return Err(GenError::invariant(format!(
                "non-positive traffic size {} for {} / {}",
                self.traffic_size, self.organization, self.prefix
            )));
        }
        if !space.contains(&self.features) {
            return Err(GenError::invariant(format!(
                "feature values {:?} outside bounds {:?}",
                self.features,
                space.bounds()
            )));
        }
        Ok(())
    }
}

/// 可查询的流属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Path,
    Destination,
    Prefix,
    Ingress,
    Egress,
    ShortestPath,
    /// 第 i 个附加特征（`feature_<i>`）
    Extra(usize),
}

impl FromStr for Feature {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "path" => Feature::Path,
            "destination" => Feature::Destination,
            "prefix" => Feature::Prefix,
            "ingress" => Feature::Ingress,
            "egress" => Feature::Egress,
            "shortest_path" => Feature::ShortestPath,
            other => {
                let idx = other
                    .strip_prefix("feature_")
                    .and_then(|i| i.parse().ok())
                    .ok_or_else(|| GenError::config(format!("unknown feature {other:?}")))?;
                Feature::Extra(idx)
            }
        })
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Path => f.write_str("path"),
            Feature::Destination => f.write_str("destination"),
            Feature::Prefix => f.write_str("prefix"),
            Feature::Ingress => f.write_str("ingress"),
            Feature::Egress => f.write_str("egress"),
            Feature::ShortestPath => f.write_str("shortest_path"),
            Feature::Extra(i) => write!(f, "feature_{i}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue<'a> {
    Path(&'a [NodeId]),
    Text(&'a str),
    Prefix(IpNet),
    Node(NodeId),
    Flag(bool),
    Number(u32),
}
