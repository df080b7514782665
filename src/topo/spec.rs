//! 拓扑描述文件 `topology.json`
//!
//! 支持显式的节点/链路列表和参数化的 fat tree，两者都构建成 [`Topology`]。

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::fat_tree::{FatTreeEgress, FatTreeOpts, build_fat_tree};
use super::graph::Topology;
use super::id::Cost;
use crate::error::{GenError, Result};

/// Topology description as read from `topology.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologySpec {
    Explicit {
        nodes: Vec<NodeSpec>,
        #[serde(default)]
        links: Vec<LinkSpec>,
        /// Egress node labels. May be left empty when egresses are picked later
        /// (`--egress` / `--num-egresses`).
        #[serde(default)]
        egresses: Vec<String>,
    },
    FatTree {
        k: usize,
        #[serde(default)]
        egress: Option<FatTreeEgress>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSpec {
    pub a: String,
    pub b: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Cost>,
    /// Undirected unless set.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub directed: bool,
}

impl TopologySpec {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|e| GenError::json(path, e))
    }

    /// Builds the topology. Egresses are set only when the file lists them.
    pub fn build(&self) -> Result<Topology> {
        let mut topo = Topology::new();
        match self {
            TopologySpec::Explicit {
                nodes,
                links,
                egresses,
            } => {
                for node in nodes {
                    topo.add_node(node.id.clone());
                }
                for link in links {
                    let a = lookup(&topo, &link.a)?;
                    let b = lookup(&topo, &link.b)?;
                    let cost = link.cost.unwrap_or(1);
                    if link.directed {
                        topo.connect(a, b, cost)?;
                    } else {
                        topo.connect_bidir(a, b, cost)?;
                    }
                }
                if !egresses.is_empty() {
                    topo.set_egresses_by_label(egresses)?;
                }
            }
            TopologySpec::FatTree { k, egress } => {
                let opts = FatTreeOpts {
                    k: *k,
                    egress: egress.unwrap_or_default(),
                };
                let layout = build_fat_tree(&mut topo, &opts)?;
                debug!(
                    k = layout.k,
                    edge = layout.edge_switches.len(),
                    agg = layout.agg_switches.len(),
                    core = layout.core_switches.len(),
                    egresses = topo.egresses().len(),
                    "built fat tree"
                );
            }
        }
        Ok(topo)
    }

    /// Display names given inline in an explicit spec.
    pub fn inline_names(&self) -> BTreeMap<String, String> {
        match self {
            TopologySpec::Explicit { nodes, .. } => nodes
                .iter()
                .filter_map(|n| n.name.clone().map(|name| (n.id.clone(), name)))
                .collect(),
            TopologySpec::FatTree { .. } => BTreeMap::new(),
        }
    }

    /// Explicit spec describing a built topology, as written next to a dataset.
    /// Links present in both directions with the same cost collapse into one
    /// undirected link.
    pub fn from_topology(topo: &Topology, names: &BTreeMap<String, String>) -> Self {
        let nodes = topo
            .nodes()
            .map(|id| {
                let label = topo.label(id).to_string();
                NodeSpec {
                    name: names.get(&label).cloned(),
                    id: label,
                }
            })
            .collect();

        let mut links = Vec::new();
        for (from, to, cost) in topo.links() {
            let reverse = topo.link_cost(to, from);
            if reverse == Some(cost) {
                if from < to {
                    links.push(LinkSpec {
                        a: topo.label(from).to_string(),
                        b: topo.label(to).to_string(),
                        cost: Some(cost),
                        directed: false,
                    });
                }
            } else {
                links.push(LinkSpec {
                    a: topo.label(from).to_string(),
                    b: topo.label(to).to_string(),
                    cost: Some(cost),
                    directed: true,
                });
            }
        }

        let egresses = topo.egresses().iter().map(|&e| topo.label(e).to_string()).collect();
        TopologySpec::Explicit {
            nodes,
            links,
            egresses,
        }
    }
}

fn lookup(topo: &Topology, label: &str) -> Result<super::NodeId> {
    topo.node_by_label(label)
        .ok_or_else(|| GenError::config(format!("link references unknown node {label:?}")))
}
