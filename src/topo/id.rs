//! 标识符类型
//!
//! 拓扑中的节点在构建时按插入顺序编号，之后所有索引都用这个稠密编号。

/// 节点标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// 链路代价（最短路按代价之和计算，必须 >= 1）
pub type Cost = u64;

/// 单条链路代价与偏离余量的上限。路径代价至多是节点数乘以它，在 u64 内不会溢出。
pub const MAX_LINK_COST: Cost = u32::MAX as Cost;

/// 节点序列，从 ingress 到 egress
pub type Path = Vec<NodeId>;
