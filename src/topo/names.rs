//! 节点显示名
//!
//! 交互式命名不在生成器内部完成：调用方要么给出完整的 label -> name 映射，
//! 要么使用自动命名 `router_<label>`。

use std::collections::BTreeMap;

use super::graph::Topology;
use crate::error::{GenError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeNames {
    pub node_to_name: BTreeMap<String, String>,
    pub name_to_node: BTreeMap<String, String>,
}

impl NodeNames {
    /// 自动命名
    pub fn automatic(topo: &Topology) -> Self {
        let mut names = Self::default();
        for id in topo.nodes() {
            let label = topo.label(id);
            names.insert(label.to_string(), format!("router_{label}"));
        }
        names
    }

    /// 使用给定映射；缺失的节点回落到自动命名，重名视为配置错误。
    pub fn from_map(topo: &Topology, given: &BTreeMap<String, String>) -> Result<Self> {
        for label in given.keys() {
            if topo.node_by_label(label).is_none() {
                return Err(GenError::config(format!("name given for unknown node {label:?}")));
            }
        }
        let mut names = Self::default();
        for id in topo.nodes() {
            let label = topo.label(id);
            let name = given
                .get(label)
                .cloned()
                .unwrap_or_else(|| format!("router_{label}"));
            if names.name_to_node.contains_key(&name) {
                return Err(GenError::config(format!("node name {name:?} used twice")));
            }
            names.insert(label.to_string(), name);
        }
        Ok(names)
    }

    fn insert(&mut self, label: String, name: String) {
        self.name_to_node.insert(name.clone(), label.clone());
        self.node_to_name.insert(label, name);
    }
}
