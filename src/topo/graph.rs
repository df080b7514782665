//! 拓扑图
//!
//! 路由器级拓扑：节点、带代价的有向链路，以及被标记为出口（egress）的节点子集。
//! 无向链路在内部展开为两条方向相反的有向链路。

use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use super::id::{Cost, MAX_LINK_COST, NodeId};
use crate::error::{GenError, Result};

/// 网络拓扑
#[derive(Debug, Default, Clone)]
pub struct Topology {
    labels: Vec<String>,
    by_label: HashMap<String, NodeId>,
    /// adj[from] 为所有出边 (to, cost)，按插入顺序
    adj: Vec<Vec<(NodeId, Cost)>>,
    edges: HashMap<(NodeId, NodeId), Cost>,
    egresses: Vec<NodeId>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加节点；同名节点重复添加时返回已有的 id。
    pub fn add_node(&mut self, label: impl Into<String>) -> NodeId {
        let label = label.into();
        if let Some(&id) = self.by_label.get(&label) {
            return id;
        }
        let id = NodeId(self.labels.len());
        self.by_label.insert(label.clone(), id);
        self.labels.push(label);
        self.adj.push(Vec::new());
        id
    }

    /// 连接两个节点（创建单向链路）
    ///
    /// 同一方向重复连接时只保留较小的代价。
    pub fn connect(&mut self, from: NodeId, to: NodeId, cost: Cost) -> Result<()> {
        let n = self.labels.len();
        if from.0 >= n || to.0 >= n {
            return Err(GenError::config(format!(
                "link {from:?} -> {to:?} references a node outside the topology ({n} nodes)"
            )));
        }
        if cost == 0 {
            return Err(GenError::config(format!(
                "link {} -> {} has zero cost",
                self.labels[from.0], self.labels[to.0]
            )));
        }
        if cost > MAX_LINK_COST {
            return Err(GenError::config(format!(
                "link {} -> {} cost {cost} exceeds the maximum {MAX_LINK_COST}",
                self.labels[from.0], self.labels[to.0]
            )));
        }
        if from == to {
            debug!(node = %self.labels[from.0], "ignoring self loop");
            return Ok(());
        }

        match self.edges.get_mut(&(from, to)) {
            Some(existing) => {
                if cost < *existing {
                    *existing = cost;
                    for entry in self.adj[from.0].iter_mut() {
                        if entry.0 == to {
                            entry.1 = cost;
                        }
                    }
                }
            }
            None => {
                self.edges.insert((from, to), cost);
                self.adj[from.0].push((to, cost));
            }
        }
        Ok(())
    }

    /// 双向连接
    pub fn connect_bidir(&mut self, a: NodeId, b: NodeId, cost: Cost) -> Result<()> {
        self.connect(a, b, cost)?;
        self.connect(b, a, cost)
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.labels.len()).map(NodeId)
    }

    pub fn label(&self, id: NodeId) -> &str {
        &self.labels[id.0]
    }

    pub fn node_by_label(&self, label: &str) -> Option<NodeId> {
        self.by_label.get(label).copied()
    }

    pub fn neighbors(&self, id: NodeId) -> &[(NodeId, Cost)] {
        &self.adj[id.0]
    }

    pub fn link_cost(&self, from: NodeId, to: NodeId) -> Option<Cost> {
        self.edges.get(&(from, to)).copied()
    }

    /// 所有有向链路 (from, to, cost)，按节点和插入顺序
    pub fn links(&self) -> impl Iterator<Item = (NodeId, NodeId, Cost)> + '_ {
        self.adj
            .iter()
            .enumerate()
            .flat_map(|(from, nbrs)| nbrs.iter().map(move |&(to, c)| (NodeId(from), to, c)))
    }

    /// 沿路径累加链路代价；路径中有不存在的链路（或代价溢出）时返回 None。
    pub fn path_cost(&self, path: &[NodeId]) -> Option<Cost> {
        path.windows(2)
            .try_fold(0, |acc: Cost, w| acc.checked_add(self.link_cost(w[0], w[1])?))
    }

    /// 出口节点，保持指定顺序（最近出口的并列按此顺序决出）
    pub fn egresses(&self) -> &[NodeId] {
        &self.egresses
    }

    pub fn is_egress(&self, id: NodeId) -> bool {
        self.egresses.contains(&id)
    }

    /// 设定出口节点集合；重复项被去掉，空集合视为配置错误。
    pub fn set_egresses(&mut self, egresses: impl IntoIterator<Item = NodeId>) -> Result<()> {
        let mut list = Vec::new();
        for id in egresses {
            if id.0 >= self.labels.len() {
                return Err(GenError::config(format!("egress {id:?} is not a topology node")));
            }
            if !list.contains(&id) {
                list.push(id);
            }
        }
        if list.is_empty() {
            return Err(GenError::config("at least one egress node is required"));
        }
        self.egresses = list;
        Ok(())
    }

    /// 按标签设定出口节点
    pub fn set_egresses_by_label<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<()> {
        let ids = labels
            .iter()
            .map(|l| {
                self.node_by_label(l.as_ref())
                    .ok_or_else(|| GenError::config(format!("unknown egress node {:?}", l.as_ref())))
            })
            .collect::<Result<Vec<_>>>()?;
        self.set_egresses(ids)
    }

    /// 从全部节点中不放回地均匀抽取 `count` 个出口。
    pub fn pick_random_egresses<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> Result<()> {
        let n = self.labels.len();
        if count == 0 || count > n {
            return Err(GenError::config(format!(
                "number of egresses must be in [1, {n}], got {count}"
            )));
        }
        let all: Vec<NodeId> = self.nodes().collect();
        let picked: Vec<NodeId> = all.choose_multiple(rng, count).copied().collect();
        self.set_egresses(picked)
    }
}
