//! 出口选择
//!
//! 每个组织从出口池中抽取一个活跃出口子集：子集大小服从指数分布
//! （截断到 [1, pool]），成员均匀不放回抽取。个别前缀以小概率另抽一套。

use rand::Rng;
use rand::seq::index;
use rand_distr::{Distribution, Exp};

use crate::config::EgressScale;
use crate::error::{GenError, Result};
use crate::topo::NodeId;

/// 某个前缀实际使用的出口集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EgressChoice<'a> {
    /// 沿用组织的出口集合
    Organization(&'a [NodeId]),
    /// 该前缀单独抽取的集合
    Exception(Vec<NodeId>),
}

impl EgressChoice<'_> {
    pub fn nodes(&self) -> &[NodeId] {
        match self {
            EgressChoice::Organization(nodes) => nodes,
            EgressChoice::Exception(nodes) => nodes,
        }
    }

    pub fn is_exception(&self) -> bool {
        matches!(self, EgressChoice::Exception(_))
    }
}

#[derive(Debug, Clone)]
pub struct EgressSelector {
    pool: Vec<NodeId>,
    count_dist: Exp<f64>,
    exception_probability: f64,
}

impl EgressSelector {
    pub fn new(pool: &[NodeId], scale: EgressScale, exception_probability: f64) -> Result<Self> {
        if pool.is_empty() {
            return Err(GenError::config("egress pool is empty"));
        }
        let beta = scale.beta(pool.len());
        let count_dist = Exp::new(1.0 / beta)
            .map_err(|e| GenError::config(format!("invalid egress scale {beta}: {e}")))?;
        Ok(Self {
            pool: pool.to_vec(),
            count_dist,
            exception_probability,
        })
    }

    pub fn pool(&self) -> &[NodeId] {
        &self.pool
    }

    /// 抽取活跃出口数：⌊Exp(β)⌋ 截断到 [1, pool]
    pub fn sample_count<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let k = self.count_dist.sample(rng) as usize;
        k.clamp(1, self.pool.len())
    }

    /// 抽取一个活跃出口集合。成员保持出口池中的顺序，最近出口的并列按此顺序决出。
    pub fn sample_set<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<NodeId> {
        let k = self.sample_count(rng);
        let mut picked = index::sample(rng, self.pool.len(), k).into_vec();
        picked.sort_unstable();
        picked.into_iter().map(|i| self.pool[i]).collect()
    }

    /// 前缀的出口集合：以 `exception_probability` 另抽一套，否则沿用组织的。
    pub fn resolve_for_prefix<'a, R: Rng + ?Sized>(
        &self,
        organization_set: &'a [NodeId],
        rng: &mut R,
    ) -> EgressChoice<'a> {
        if rng.gen_bool(self.exception_probability) {
            EgressChoice::Exception(self.sample_set(rng))
        } else {
            EgressChoice::Organization(organization_set)
        }
    }
}
