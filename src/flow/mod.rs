//! 流生成
//!
//! 出口选择、流量与特征采样，以及把它们串起来的路径分配。

mod assign;
mod egress;
mod record;
mod sampler;
mod stats;

pub use assign::{FlowGenerator, GenerationOutput, OrganizationOutput, nearest_egress};
pub use egress::{EgressChoice, EgressSelector};
pub use record::{Feature, FeatureValue, FlowRecord};
pub use sampler::{FeatureSpace, FlowSampler};
pub use stats::{Diagnostics, GenerationStats};
