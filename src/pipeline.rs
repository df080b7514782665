//! 一次完整生成：划分前缀 -> 抽取特征空间 -> 路径分配
//!
//! 拓扑索引由调用方构建一次，多个 prefix limit 共用。

use tracing::info;

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::flow::{FeatureSpace, FlowGenerator, GenerationOutput};
use crate::org::{AsOrgTable, OrganizationAssignment, RibEntry};
use crate::rng::RunSeed;
use crate::topo::{Topology, TopologyIndex};

pub struct RunOutput {
    pub organizations: OrganizationAssignment,
    pub features: FeatureSpace,
    pub output: GenerationOutput,
}

/// 同一种子下，特征空间与 RIB 打乱顺序对所有 prefix limit 相同，
/// 因此较小 limit 选中的前缀总是较大 limit 的子集。
pub fn run_generation(
    topo: &Topology,
    index: &TopologyIndex,
    table: &AsOrgTable,
    rib: &[RibEntry],
    cfg: &GeneratorConfig,
    seed: RunSeed,
) -> Result<RunOutput> {
    cfg.validate()?;

    let mut shuffle_rng = seed.stream("rib");
    let organizations =
        OrganizationAssignment::assign(table, rib.to_vec(), cfg.effective_prefix_limit(), &mut shuffle_rng);

    let mut feature_rng = seed.stream("features");
    let features = FeatureSpace::sample(cfg.feature_count, cfg.feature_bound_range, &mut feature_rng)?;
    info!(bounds = ?features.bounds(), "feature space");

    let generator = FlowGenerator::new(topo, index, cfg, features.clone(), seed)?;
    let output = generator.run(&organizations)?;

    Ok(RunOutput {
        organizations,
        features,
        output,
    })
}
