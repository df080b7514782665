//! 按特征值筛选流记录
//!
//! 条件写作 `key=value`，对一个数据集打分即统计命中的记录数。

use std::str::FromStr;

use crate::error::{GenError, Result};
use crate::flow::{Feature, FeatureValue, FlowRecord};
use crate::topo::Topology;

/// `feature=value` condition on a flow record.
///
/// Nodes compare by topology label, paths as labels joined with `->`, and
/// destinations ignore everything but ASCII alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFilter {
    pub feature: Feature,
    pub value: String,
}

impl FromStr for FeatureFilter {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| GenError::config(format!("filter {s:?} is not of the form feature=value")))?;
        Ok(Self {
            feature: key.trim().parse()?,
            value: value.trim().to_string(),
        })
    }
}

impl FeatureFilter {
    pub fn matches(&self, record: &FlowRecord, topo: &Topology) -> bool {
        let Some(value) = record.get(self.feature) else {
            return false;
        };
        match value {
            FeatureValue::Path(path) => {
                let joined = path.iter().map(|&n| topo.label(n)).collect::<Vec<_>>().join("->");
                joined == self.value
            }
            FeatureValue::Text(text) => alnum(text) == alnum(&self.value),
            FeatureValue::Prefix(prefix) => prefix.to_string() == self.value,
            FeatureValue::Node(node) => topo.label(node) == self.value,
            FeatureValue::Flag(flag) => self.value.parse::<bool>().is_ok_and(|v| v == flag),
            FeatureValue::Number(n) => self.value.parse::<u32>().is_ok_and(|v| v == n),
        }
    }
}

fn alnum(s: &str) -> String {
    s.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Total traffic and number of flows matching every filter.
pub fn score(records: &[FlowRecord], topo: &Topology, filters: &[FeatureFilter]) -> (f64, usize) {
    records
        .iter()
        .filter(|r| filters.iter().all(|f| f.matches(r, topo)))
        .fold((0.0, 0), |(traffic, n), r| (traffic + r.traffic_size, n + 1))
}
