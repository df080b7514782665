//! 拓扑模块
//!
//! 路由器级拓扑、拓扑描述文件、节点命名，以及全源最短路索引。

mod fat_tree;
mod graph;
mod id;
mod index;
mod names;
mod spec;

pub use fat_tree::{FatTreeEgress, FatTreeOpts, FatTreeTopology, build_fat_tree};
pub use graph::Topology;
pub use id::{Cost, MAX_LINK_COST, NodeId, Path};
pub use index::{DeviationOpts, DistanceTable, TopologyIndex};
pub use names::NodeNames;
pub use spec::{LinkSpec, NodeSpec, TopologySpec};
