//! 路径分配
//!
//! 对每个组织、它的每个前缀、拓扑中的每个节点：
//! 1. 确定该前缀的活跃出口集合（组织默认或前缀例外）；
//! 2. 选出离当前节点最近的出口（代价严格更小者胜，并列时取集合中靠前的）；
//! 3. 以 `deviation_probability` 取偏离路径集合，否则取最短路集合；
//! 4. 遍历等价路径，每条生成一条记录，之后以 `1 - multipath_continue_probability`
//!    的概率停止。
//!
//! 每个组织使用由运行种子和组织名派生的独立随机数流，组织之间并行处理，
//! 输出按组织顺序拼接。

use ipnet::IpNet;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::egress::EgressSelector;
use super::record::FlowRecord;
use super::sampler::{FeatureSpace, FlowSampler};
use super::stats::{Diagnostics, GenerationStats};
use crate::config::GeneratorConfig;
use crate::error::{GenError, Result};
use crate::org::{Organization, OrganizationAssignment};
use crate::rng::RunSeed;
use crate::topo::{Cost, NodeId, Topology, TopologyIndex};

/// 一次生成的全部输出
#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    pub records: Vec<FlowRecord>,
    pub diagnostics: Diagnostics,
    pub stats: GenerationStats,
}

/// 单个组织的输出
#[derive(Debug, Clone, Default)]
pub struct OrganizationOutput {
    pub records: Vec<FlowRecord>,
    pub diagnostics: Diagnostics,
    pub stats: GenerationStats,
    /// 组织默认的活跃出口集合
    pub egresses: Vec<NodeId>,
    /// 使用了例外出口集合的前缀
    pub exception_prefixes: Vec<IpNet>,
}

pub struct FlowGenerator<'a> {
    topo: &'a Topology,
    index: &'a TopologyIndex,
    egress: EgressSelector,
    sampler: FlowSampler,
    deviation_probability: f64,
    multipath_continue_probability: f64,
    seed: RunSeed,
}

impl<'a> FlowGenerator<'a> {
    pub fn new(
        topo: &'a Topology,
        index: &'a TopologyIndex,
        cfg: &GeneratorConfig,
        features: FeatureSpace,
        seed: RunSeed,
    ) -> Result<Self> {
        cfg.validate()?;
        if index.node_count() != topo.node_count() {
            return Err(GenError::config(format!(
                "topology index covers {} nodes but topology has {}",
                index.node_count(),
                topo.node_count()
            )));
        }
        Ok(Self {
            topo,
            index,
            egress: EgressSelector::new(topo.egresses(), cfg.egress_scale, cfg.egress_exception_probability)?,
            sampler: FlowSampler::new(cfg, features)?,
            deviation_probability: cfg.deviation_probability,
            multipath_continue_probability: cfg.multipath_continue_probability,
            seed,
        })
    }

    pub fn sampler(&self) -> &FlowSampler {
        &self.sampler
    }

    pub fn egress_selector(&self) -> &EgressSelector {
        &self.egress
    }

    /// 为所有组织生成流记录
    #[tracing::instrument(skip_all, fields(organizations = orgs.organizations().len(), prefixes = orgs.prefix_count()))]
    pub fn run(&self, orgs: &OrganizationAssignment) -> Result<GenerationOutput> {
        info!("start computing all the paths");

        let parts: Vec<OrganizationOutput> = orgs
            .organizations()
            .par_iter()
            .map(|org| self.generate_organization(org))
            .collect::<Result<Vec<_>>>()?;

        let mut out = GenerationOutput {
            stats: GenerationStats::with_features(self.sampler.features().len()),
            ..GenerationOutput::default()
        };
        out.diagnostics.unknown_prefixes = orgs.unknown_prefixes();
        out.diagnostics.unknown_origins = orgs.unknown_origins().len();
        for part in parts {
            out.records.extend(part.records);
            out.diagnostics.merge(part.diagnostics);
            out.stats.merge(part.stats);
        }

        info!(
            flows = out.records.len(),
            skipped = out.diagnostics.skipped_flows,
            unreachable_pairs = out.diagnostics.unreachable_pairs.len(),
            exception_prefixes = out.stats.exception_prefixes,
            "paths done"
        );
        Ok(out)
    }

    /// 单个组织：它的所有前缀 × 所有节点
    pub fn generate_organization(&self, org: &Organization) -> Result<OrganizationOutput> {
        if org.prefixes.is_empty() {
            return Err(GenError::invariant(format!(
                "organization {:?} reached path assignment without prefixes",
                org.name
            )));
        }

        let mut rng = self.seed.stream(&format!("org:{}", org.name));
        let mut out = OrganizationOutput {
            stats: GenerationStats::with_features(self.sampler.features().len()),
            ..OrganizationOutput::default()
        };

        let egresses = self.egress.sample_set(&mut rng);
        out.stats.num_egresses.push(egresses.len());

        let total = self.sampler.organization_size(&mut rng);
        out.stats.organization_size.push(total);
        out.stats
            .per_prefix_mean
            .push(FlowSampler::per_prefix_mean(total, org.prefixes.len()));
        out.stats.organization_prefixes.push(org.prefixes.len());

        debug!(
            organization = %org.name,
            prefixes = org.prefixes.len(),
            egresses = ?egresses,
            total_size = total,
            "organization setup"
        );

        for &prefix in &org.prefixes {
            let choice = self.egress.resolve_for_prefix(&egresses, &mut rng);
            if choice.is_exception() {
                out.stats.exception_prefixes += 1;
                out.exception_prefixes.push(prefix);
            }
            let active = choice.nodes();

            for node in self.topo.nodes() {
                self.emit_for_node(org, prefix, node, active, &mut rng, &mut out)?;
            }
        }

        out.egresses = egresses;
        Ok(out)
    }

    fn emit_for_node<R: Rng + ?Sized>(
        &self,
        org: &Organization,
        prefix: IpNet,
        node: NodeId,
        active: &[NodeId],
        rng: &mut R,
        out: &mut OrganizationOutput,
    ) -> Result<()> {
        // 没有可达出口时仍取第一个出口，下面会作为不可达对记录
        let egress = match nearest_egress(self.index, node, active) {
            Some((egress, _)) => egress,
            None => active[0],
        };

        let deviate = rng.gen_bool(self.deviation_probability);
        if deviate {
            out.stats.deviation_draws += 1;
        }
        let paths = if deviate {
            self.index.deviation_paths(node, egress)
        } else {
            self.index.shortest_paths(node, egress)
        };

        let trivial;
        let paths = if paths.is_empty() {
            if node == egress {
                trivial = [vec![egress]];
                &trivial[..]
            } else {
                if out.diagnostics.record_unreachable(node, egress) {
                    warn!(
                        node = %self.topo.label(node),
                        egress = %self.topo.label(egress),
                        "there is a problem with the path from node to egress"
                    );
                }
                return Ok(());
            }
        } else {
            paths
        };

        for path in paths {
            let features = self.sampler.feature_values(rng);
            let traffic_size = self.sampler.flow_size(rng);
            let record = FlowRecord {
                shortest_path: self.index.is_shortest(self.topo, path),
                path: path.clone(),
                organization: org.name.clone(),
                prefix,
                traffic_size,
                features,
            };
            record.check(self.sampler.features())?;
            out.stats
                .record_flow(&org.name, node, egress, traffic_size, &record.features);
            out.records.push(record);

            if !rng.gen_bool(self.multipath_continue_probability) {
                break;
            }
        }
        Ok(())
    }
}

/// 离 `node` 最近的出口。代价严格更小才替换，所以并列时取 `egresses` 中靠前的。
/// 所有出口都不可达时返回 None。
pub fn nearest_egress(index: &TopologyIndex, node: NodeId, egresses: &[NodeId]) -> Option<(NodeId, Cost)> {
    let mut best: Option<(NodeId, Cost)> = None;
    for &egress in egresses {
        let Some(d) = index.distance(node, egress) else {
            continue;
        };
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((egress, d));
        }
    }
    best
}
