//! 统计信息与诊断
//!
//! 每个组织单独累计，结束后按组织顺序合并，因此并行与否结果一致。

use std::collections::{BTreeMap, BTreeSet};

use crate::topo::NodeId;

/// 非致命的数据异常
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    /// origin AS 未知而被排除的前缀通告
    pub unknown_prefixes: usize,
    pub unknown_origins: usize,
    /// 找不到路径而跳过的 (node, prefix) 数
    pub skipped_flows: usize,
    /// 出现过的不可达 (node, egress) 对
    pub unreachable_pairs: BTreeSet<(NodeId, NodeId)>,
}

impl Diagnostics {
    pub fn merge(&mut self, other: Diagnostics) {
        self.unknown_prefixes += other.unknown_prefixes;
        self.unknown_origins += other.unknown_origins;
        self.skipped_flows += other.skipped_flows;
        self.unreachable_pairs.extend(other.unreachable_pairs);
    }

    /// 记录一次跳过；该 (node, egress) 对第一次出现时返回 true。
    pub fn record_unreachable(&mut self, node: NodeId, egress: NodeId) -> bool {
        self.skipped_flows += 1;
        self.unreachable_pairs.insert((node, egress))
    }
}

/// 生成过程的分布统计
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GenerationStats {
    /// 每个组织的活跃出口数
    pub num_egresses: Vec<usize>,
    /// 每个组织抽取的总流量
    pub organization_size: Vec<f64>,
    /// 每个组织的前缀均值（总流量 / 前缀数）
    pub per_prefix_mean: Vec<f64>,
    pub organization_prefixes: Vec<usize>,
    /// 实际生成的流大小之和
    pub organization_traffic: BTreeMap<String, f64>,
    pub egress_traffic: BTreeMap<NodeId, f64>,
    pub ingress_traffic: BTreeMap<NodeId, f64>,
    /// 每个附加特征出现过的取值
    pub feature_values: Vec<BTreeSet<u32>>,
    pub exception_prefixes: usize,
    pub deviation_draws: usize,
    pub flows: usize,
}

impl GenerationStats {
    pub fn with_features(count: usize) -> Self {
        Self {
            feature_values: vec![BTreeSet::new(); count],
            ..Self::default()
        }
    }

    pub fn record_flow(&mut self, organization: &str, ingress: NodeId, egress: NodeId, size: f64, features: &[u32]) {
        self.flows += 1;
        *self.organization_traffic.entry(organization.to_string()).or_default() += size;
        *self.egress_traffic.entry(egress).or_default() += size;
        *self.ingress_traffic.entry(ingress).or_default() += size;
        if self.feature_values.len() < features.len() {
            self.feature_values.resize(features.len(), BTreeSet::new());
        }
        for (slot, &v) in self.feature_values.iter_mut().zip(features) {
            slot.insert(v);
        }
    }

    pub fn merge(&mut self, other: GenerationStats) {
        self.num_egresses.extend(other.num_egresses);
        self.organization_size.extend(other.organization_size);
        self.per_prefix_mean.extend(other.per_prefix_mean);
        self.organization_prefixes.extend(other.organization_prefixes);
        for (k, v) in other.organization_traffic {
            *self.organization_traffic.entry(k).or_default() += v;
        }
        for (k, v) in other.egress_traffic {
            *self.egress_traffic.entry(k).or_default() += v;
        }
        for (k, v) in other.ingress_traffic {
            *self.ingress_traffic.entry(k).or_default() += v;
        }
        if self.feature_values.len() < other.feature_values.len() {
            self.feature_values.resize(other.feature_values.len(), BTreeSet::new());
        }
        for (slot, values) in self.feature_values.iter_mut().zip(other.feature_values) {
            slot.extend(values);
        }
        self.exception_prefixes += other.exception_prefixes;
        self.deviation_draws += other.deviation_draws;
        self.flows += other.flows;
    }
}
