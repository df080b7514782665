//! 全源最短路索引（含 ECMP）
//!
//! 对每个源节点做一次 Dijkstra 得到到所有节点的最短代价，再在最短路 DAG 上
//! 枚举 (from, dst) 的所有等价最短路径。另外可选地为每个节点对预计算一组
//! “偏离”路径（代价略高于最短路的简单路径），用来给数据集注入路由噪声。
//!
//! 索引只在生成开始前构建一次，之后只读，可被所有 worker 共享。

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rayon::prelude::*;
use tracing::{debug, info};

use super::graph::Topology;
use super::id::{Cost, NodeId, Path};

/// 偏离路径的生成方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviationOpts {
    /// 允许比最短路多出的代价；None 表示关闭异常注入
    pub slack: Option<Cost>,
    /// 每个节点对最多枚举的偏离路径数
    pub max_paths: usize,
}

impl Default for DeviationOpts {
    fn default() -> Self {
        Self {
            slack: None,
            max_paths: 64,
        }
    }
}

/// 全源最短路代价
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceTable {
    /// dist[from][to]，不可达为 None
    dist: Vec<Vec<Option<Cost>>>,
}

impl DistanceTable {
    pub fn compute(topo: &Topology) -> Self {
        let dist = (0..topo.node_count())
            .into_par_iter()
            .map(|src| dijkstra(topo, NodeId(src)))
            .collect();
        Self { dist }
    }

    pub fn get(&self, from: NodeId, to: NodeId) -> Option<Cost> {
        self.dist[from.0][to.0]
    }

    pub fn node_count(&self) -> usize {
        self.dist.len()
    }

    /// 路径代价是否等于两端点之间的真实最短代价。
    pub fn is_shortest(&self, topo: &Topology, path: &[NodeId]) -> bool {
        let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
            return false;
        };
        match (topo.path_cost(path), self.get(first, last)) {
            (Some(cost), Some(best)) => cost <= best,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TopologyIndex {
    dist: DistanceTable,
    /// paths[from][to]：所有等价最短路径
    paths: Vec<Vec<Vec<Path>>>,
    /// deviations[from][to]；关闭异常注入时为 None，查询时回落到 paths
    deviations: Option<Vec<Vec<Vec<Path>>>>,
}

impl TopologyIndex {
    #[tracing::instrument(skip(topo), fields(nodes = topo.node_count(), links = topo.edge_count()))]
    pub fn build(topo: &Topology, opts: &DeviationOpts) -> Self {
        let n = topo.node_count();

        info!("computing shortest path lengths");
        let dist = DistanceTable::compute(topo);

        info!("computing shortest paths");
        let paths: Vec<Vec<Vec<Path>>> = (0..n)
            .into_par_iter()
            .map(|src| shortest_paths_from(topo, NodeId(src), &dist.dist[src]))
            .collect();

        let deviations = match opts.slack {
            Some(slack) if slack > 0 => {
                info!(slack, max_paths = opts.max_paths, "computing deviation paths");
                let rows: Vec<Vec<Vec<Path>>> = (0..n)
                    .into_par_iter()
                    .map(|src| {
                        (0..n)
                            .map(|dst| {
                                let alt = detour_paths(topo, &dist.dist, NodeId(src), NodeId(dst), slack, opts.max_paths);
                                if alt.is_empty() {
                                    paths[src][dst].clone()
                                } else {
                                    alt
                                }
                            })
                            .collect::<Vec<_>>()
                    })
                    .collect();
                Some(rows)
            }
            _ => None,
        };

        let total: usize = paths.iter().flatten().map(|p| p.len()).sum();
        debug!(total_paths = total, "topology index built");

        Self {
            dist,
            paths,
            deviations,
        }
    }

    pub fn node_count(&self) -> usize {
        self.dist.node_count()
    }

    pub fn distances(&self) -> &DistanceTable {
        &self.dist
    }

    /// 最短路代价；不可达为 None
    pub fn distance(&self, from: NodeId, to: NodeId) -> Option<Cost> {
        self.dist.get(from, to)
    }

    /// 所有达到 `distance(from, to)` 的路径；不可达时为空，from == to 时为 `[[from]]`。
    pub fn shortest_paths(&self, from: NodeId, to: NodeId) -> &[Path] {
        &self.paths[from.0][to.0]
    }

    /// 偏离路径集合；关闭异常注入或该节点对不存在绕行时等于最短路集合。
    pub fn deviation_paths(&self, from: NodeId, to: NodeId) -> &[Path] {
        match &self.deviations {
            Some(rows) => &rows[from.0][to.0],
            None => self.shortest_paths(from, to),
        }
    }

    pub fn deviation_enabled(&self) -> bool {
        self.deviations.is_some()
    }

    pub fn is_shortest(&self, topo: &Topology, path: &[NodeId]) -> bool {
        self.dist.is_shortest(topo, path)
    }
}

fn dijkstra(topo: &Topology, src: NodeId) -> Vec<Option<Cost>> {
    let mut dist: Vec<Option<Cost>> = vec![None; topo.node_count()];
    let mut heap = BinaryHeap::new();
    dist[src.0] = Some(0);
    heap.push(Reverse((0, src)));

    while let Some(Reverse((d, v))) = heap.pop() {
        if dist[v.0].is_some_and(|best| d > best) {
            continue;
        }
        for &(nb, c) in topo.neighbors(v) {
            let Some(nd) = d.checked_add(c) else { continue };
            if dist[nb.0].is_none_or(|best| nd < best) {
                dist[nb.0] = Some(nd);
                heap.push(Reverse((nd, nb)));
            }
        }
    }
    dist
}

/// 在以 src 为根的最短路 DAG 上，从每个 dst 反向回溯出全部最短路径。
fn shortest_paths_from(topo: &Topology, src: NodeId, dist: &[Option<Cost>]) -> Vec<Vec<Path>> {
    let n = topo.node_count();

    // preds[y]：满足 dist[x] + c(x, y) == dist[y] 的 x
    let mut preds: Vec<Vec<NodeId>> = vec![Vec::new(); n];
    for x in 0..n {
        let Some(dx) = dist[x] else { continue };
        for &(y, c) in topo.neighbors(NodeId(x)) {
            if dx.checked_add(c).is_some_and(|d| dist[y.0] == Some(d)) {
                preds[y.0].push(NodeId(x));
            }
        }
    }

    (0..n)
        .map(|dst| {
            if dist[dst].is_none() {
                return Vec::new();
            }
            let mut out = Vec::new();
            let mut stack = vec![NodeId(dst)];
            collect_back(src, &preds, &mut stack, &mut out);
            out
        })
        .collect()
}

fn collect_back(src: NodeId, preds: &[Vec<NodeId>], stack: &mut Vec<NodeId>, out: &mut Vec<Path>) {
    let Some(&head) = stack.last() else { return };
    if head == src {
        out.push(stack.iter().rev().copied().collect());
        return;
    }
    for &p in &preds[head.0] {
        stack.push(p);
        collect_back(src, preds, stack, out);
        stack.pop();
    }
}

/// 代价落在 (best, best + slack] 内的简单路径，最多 `max_paths` 条。
fn detour_paths(
    topo: &Topology,
    dist: &[Vec<Option<Cost>>],
    src: NodeId,
    dst: NodeId,
    slack: Cost,
    max_paths: usize,
) -> Vec<Path> {
    if src == dst {
        return vec![vec![src]];
    }
    let Some(best) = dist[src.0][dst.0] else {
        return Vec::new();
    };
    let bound = best.saturating_add(slack);

    let mut out = Vec::new();
    let mut visited = vec![false; topo.node_count()];
    let mut stack = vec![src];
    visited[src.0] = true;
    walk_detours(topo, dist, dst, best, bound, 0, max_paths, &mut visited, &mut stack, &mut out);
    out
}

#[allow(clippy::too_many_arguments)]
fn walk_detours(
    topo: &Topology,
    dist: &[Vec<Option<Cost>>],
    dst: NodeId,
    best: Cost,
    bound: Cost,
    cost: Cost,
    max_paths: usize,
    visited: &mut [bool],
    stack: &mut Vec<NodeId>,
    out: &mut Vec<Path>,
) {
    if out.len() >= max_paths {
        return;
    }
    let Some(&v) = stack.last() else { return };
    if v == dst {
        if cost > best {
            out.push(stack.clone());
        }
        return;
    }
    for &(nb, c) in topo.neighbors(v) {
        if visited[nb.0] {
            continue;
        }
        let Some(nc) = cost.checked_add(c) else { continue };
        // 剩余部分至少还要 dist[nb][dst]
        let Some(rest) = dist[nb.0][dst.0] else { continue };
        if nc.checked_add(rest).is_none_or(|total| total > bound) {
            continue;
        }
        visited[nb.0] = true;
        stack.push(nb);
        walk_detours(topo, dist, dst, best, bound, nc, max_paths, visited, stack, out);
        stack.pop();
        visited[nb.0] = false;
    }
}
