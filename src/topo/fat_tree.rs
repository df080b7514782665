//! Fat-tree 拓扑构建
//!
//! 只构建交换机层（core / aggregation / edge），所有链路代价为 1。

use serde::{Deserialize, Serialize};

use super::graph::Topology;
use super::id::NodeId;
use crate::error::{GenError, Result};

/// 哪一层的交换机作为出口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatTreeEgress {
    #[default]
    Core,
    Edge,
    All,
}

#[derive(Debug, Clone)]
pub struct FatTreeOpts {
    pub k: usize,
    pub egress: FatTreeEgress,
}

impl Default for FatTreeOpts {
    fn default() -> Self {
        Self {
            k: 4,
            egress: FatTreeEgress::Core,
        }
    }
}

/// 各层交换机，按 pod 依次排列（第 pod 个 pod 的第 i 台为 `pod * k/2 + i`）
#[derive(Debug, Clone)]
pub struct FatTreeTopology {
    pub k: usize,
    pub edge_switches: Vec<NodeId>,
    pub agg_switches: Vec<NodeId>,
    pub core_switches: Vec<NodeId>,
}

pub fn build_fat_tree(topo: &mut Topology, opts: &FatTreeOpts) -> Result<FatTreeTopology> {
    let k = opts.k;
    if k < 2 || k % 2 != 0 {
        return Err(GenError::config(format!("fat-tree k must be even and >= 2, got {k}")));
    }
    let half = k / 2;

    let mut core_switches = Vec::with_capacity(half * half);
    for group in 0..half {
        for index in 0..half {
            core_switches.push(topo.add_node(format!("c{}_{}", group, index)));
        }
    }

    let mut edge_switches = Vec::with_capacity(k * half);
    let mut agg_switches = Vec::with_capacity(k * half);
    for pod in 0..k {
        for edge in 0..half {
            edge_switches.push(topo.add_node(format!("p{}_e{}", pod, edge)));
        }
        for agg in 0..half {
            agg_switches.push(topo.add_node(format!("p{}_a{}", pod, agg)));
        }
    }

    for pod in 0..k {
        for edge in 0..half {
            for agg in 0..half {
                topo.connect_bidir(edge_switches[pod * half + edge], agg_switches[pod * half + agg], 1)?;
            }
        }
    }

    for pod in 0..k {
        for agg in 0..half {
            let agg_id = agg_switches[pod * half + agg];
            for index in 0..half {
                topo.connect_bidir(agg_id, core_switches[agg * half + index], 1)?;
            }
        }
    }

    let egresses: Vec<NodeId> = match opts.egress {
        FatTreeEgress::Core => core_switches.clone(),
        FatTreeEgress::Edge => edge_switches.clone(),
        FatTreeEgress::All => topo.nodes().collect(),
    };
    topo.set_egresses(egresses)?;

    Ok(FatTreeTopology {
        k,
        edge_switches,
        agg_switches,
        core_switches,
    })
}
