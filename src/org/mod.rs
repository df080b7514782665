//! 组织与前缀
//!
//! ASN -> 组织表、RIB 快照解析，以及前缀到组织的划分。

mod as_org;
mod assign;
mod rib;

/// 自治系统号
pub type Asn = u32;

pub use as_org::AsOrgTable;
pub use assign::{Organization, OrganizationAssignment};
pub use rib::{RibEntry, load_rib, parse_origin, parse_rib};
