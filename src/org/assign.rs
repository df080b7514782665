//! 前缀到组织的划分
//!
//! RIB 条目先被打乱以避免位置偏差，然后依次按 origin AS 分配给组织。
//! 同一前缀只认第一次能解析出组织的通告；origin 未知的条目计数后跳过。

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use ipnet::IpNet;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use super::Asn;
use super::as_org::AsOrgTable;
use super::rib::RibEntry;

/// 拥有若干前缀的组织
#[derive(Debug, Clone, PartialEq)]
pub struct Organization {
    pub name: Arc<str>,
    pub prefixes: Vec<IpNet>,
}

#[derive(Debug, Clone, Default)]
pub struct OrganizationAssignment {
    /// 按首次分配的顺序
    organizations: Vec<Organization>,
    by_name: HashMap<Arc<str>, usize>,
    prefix_to_org: HashMap<IpNet, usize>,
    unknown_prefixes: usize,
    unknown_origins: BTreeSet<Asn>,
}

impl OrganizationAssignment {
    /// 打乱 `entries` 后划分；`limit` 为 None 或 0 表示不限。
    pub fn assign<R: Rng + ?Sized>(
        table: &AsOrgTable,
        mut entries: Vec<RibEntry>,
        limit: Option<usize>,
        rng: &mut R,
    ) -> Self {
        entries.shuffle(rng);
        Self::assign_in_order(table, &entries, limit)
    }

    /// 按给定顺序划分（不打乱）
    pub fn assign_in_order(table: &AsOrgTable, entries: &[RibEntry], limit: Option<usize>) -> Self {
        let limit = limit.filter(|&l| l > 0);
        let mut out = Self::default();

        for entry in entries {
            if limit.is_some_and(|l| out.prefix_to_org.len() >= l) {
                break;
            }
            let Some(name) = table.organization_of(entry.origin) else {
                debug!(origin_asn = entry.origin, prefix = %entry.prefix, "unknown origin AS");
                out.unknown_prefixes += 1;
                out.unknown_origins.insert(entry.origin);
                continue;
            };
            if out.prefix_to_org.contains_key(&entry.prefix) {
                continue;
            }
            out.insert(name, entry.prefix);
        }

        if out.unknown_prefixes > 0 {
            warn!(
                unknown_prefixes = out.unknown_prefixes,
                unknown_origins = out.unknown_origins.len(),
                "prefixes with unknown origin AS were excluded"
            );
        }
        info!(
            organizations = out.organizations.len(),
            prefixes = out.prefix_to_org.len(),
            limit = ?limit,
            "assigned prefixes to organizations"
        );
        out
    }

    fn insert(&mut self, name: &str, prefix: IpNet) {
        let idx = match self.by_name.get(name) {
            Some(&idx) => idx,
            None => {
                let name: Arc<str> = Arc::from(name);
                let idx = self.organizations.len();
                self.organizations.push(Organization {
                    name: Arc::clone(&name),
                    prefixes: Vec::new(),
                });
                self.by_name.insert(name, idx);
                idx
            }
        };
        self.organizations[idx].prefixes.push(prefix);
        self.prefix_to_org.insert(prefix, idx);
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }

    pub fn organization(&self, name: &str) -> Option<&Organization> {
        self.by_name.get(name).map(|&idx| &self.organizations[idx])
    }

    pub fn organization_of(&self, prefix: &IpNet) -> Option<&str> {
        self.prefix_to_org
            .get(prefix)
            .map(|&idx| self.organizations[idx].name.as_ref())
    }

    pub fn prefix_count(&self) -> usize {
        self.prefix_to_org.len()
    }

    /// 被跳过的未知 origin 通告数
    pub fn unknown_prefixes(&self) -> usize {
        self.unknown_prefixes
    }

    pub fn unknown_origins(&self) -> &BTreeSet<Asn> {
        &self.unknown_origins
    }

    /// organization -> prefixes，用于导出
    pub fn organization_to_prefix(&self) -> BTreeMap<String, Vec<String>> {
        self.organizations
            .iter()
            .map(|o| (o.name.to_string(), o.prefixes.iter().map(|p| p.to_string()).collect()))
            .collect()
    }

    /// prefix -> organization，用于导出
    pub fn prefix_to_organization(&self) -> BTreeMap<String, String> {
        self.prefix_to_org
            .iter()
            .map(|(p, &idx)| (p.to_string(), self.organizations[idx].name.to_string()))
            .collect()
    }
}
