//! 随机数流
//!
//! 整次运行只有一个种子；每个用途（出口挑选、特征取值范围、RIB 打乱、
//! 每个组织）从种子和一个稳定的标签派生出独立的 `StdRng`。这样按组织并行
//! 时，结果不依赖调度顺序。

use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSeed(pub u64);

impl RunSeed {
    /// 给定种子则使用它，否则从系统熵源取一个（调用方应把它打到日志里以便复现）。
    pub fn new(seed: Option<u64>) -> Self {
        RunSeed(seed.unwrap_or_else(rand::random))
    }

    /// 派生一个带标签的独立随机数流
    pub fn stream(&self, tag: &str) -> StdRng {
        StdRng::seed_from_u64(self.derive(tag))
    }

    pub fn derive(&self, tag: &str) -> u64 {
        mix64(self.0 ^ fnv1a(tag.as_bytes()))
    }
}

/// 64-bit FNV-1a，只用于把标签稳定地映射成整数。
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}

/// 一个简单、确定性的 64-bit mixing（splitmix64）
fn mix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
