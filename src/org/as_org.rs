//! ASN -> 组织映射
//!
//! 读取 CAIDA as-org 格式：两类记录由注释行 `# format:org_id...` 和
//! `# format:aut...` 切换。

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::Asn;
use crate::error::{GenError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Orgs,
    Ases,
}

#[derive(Debug, Clone, Default)]
pub struct AsOrgTable {
    asn_to_org: HashMap<Asn, String>,
    /// 组织名，按首次出现的顺序
    organizations: Vec<String>,
}

impl AsOrgTable {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        Self::parse(&raw, &path.display().to_string())
    }

    /// 解析 CAIDA as-org 文本
    ///
    /// ```text
    /// # format:org_id|changed|org_name|country|source
    /// # format:aut|changed|aut_name|org_id|source
    /// ```
    pub fn parse(raw: &str, source_name: &str) -> Result<Self> {
        let mut section = Section::None;
        let mut org_id_to_name: HashMap<String, String> = HashMap::new();
        let mut organizations = Vec::new();
        let mut asn_to_org_id: Vec<(Asn, String)> = Vec::new();

        for (idx, line) in raw.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') {
                if line.starts_with("# format:org_id") {
                    section = Section::Orgs;
                } else if line.starts_with("# format:aut") {
                    section = Section::Ases;
                }
                continue;
            }

            let fields: Vec<&str> = line.split('|').collect();
            match section {
                Section::None => {
                    return Err(GenError::config(format!(
                        "{source_name}:{line_no}: record before any '# format:' marker"
                    )));
                }
                Section::Orgs => {
                    // org_id|changed|org_name|country|source
                    if fields.len() != 5 {
                        return Err(GenError::malformed(
                            source_name,
                            line_no,
                            format!("organization record needs 5 fields, got {}", fields.len()),
                        ));
                    }
                    let name = fields[2].to_string();
                    if !organizations.contains(&name) {
                        organizations.push(name.clone());
                    }
                    org_id_to_name.insert(fields[0].to_string(), name);
                }
                Section::Ases => {
                    // aut|changed|aut_name|org_id|source
                    if fields.len() != 5 {
                        return Err(GenError::malformed(
                            source_name,
                            line_no,
                            format!("AS record needs 5 fields, got {}", fields.len()),
                        ));
                    }
                    let asn = parse_asn(fields[0])
                        .ok_or_else(|| GenError::malformed(source_name, line_no, format!("invalid ASN {:?}", fields[0])))?;
                    asn_to_org_id.push((asn, fields[3].to_string()));
                }
            }
        }

        let mut asn_to_org = HashMap::with_capacity(asn_to_org_id.len());
        for (asn, org_id) in asn_to_org_id {
            match org_id_to_name.get(&org_id) {
                Some(name) => {
                    asn_to_org.insert(asn, name.clone());
                }
                None => debug!(asn, org_id = %org_id, "AS refers to unknown organization id"),
            }
        }

        info!(
            asns = asn_to_org.len(),
            organizations = organizations.len(),
            "loaded AS to organization table"
        );
        Ok(Self {
            asn_to_org,
            organizations,
        })
    }

    /// 简单格式：每行 `org_name-asn`
    pub fn parse_compact(raw: &str, source_name: &str) -> Result<Self> {
        let mut table = Self::default();
        for (idx, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((name, asn)) = line.rsplit_once('-') else {
                return Err(GenError::malformed(source_name, idx + 1, "expected 'name-asn'"));
            };
            let asn = parse_asn(asn)
                .ok_or_else(|| GenError::malformed(source_name, idx + 1, format!("invalid ASN {asn:?}")))?;
            table.insert(asn, name.trim());
        }
        Ok(table)
    }

    pub fn insert(&mut self, asn: Asn, organization: impl Into<String>) {
        let organization = organization.into();
        if !self.organizations.contains(&organization) {
            self.organizations.push(organization.clone());
        }
        self.asn_to_org.insert(asn, organization);
    }

    pub fn organization_of(&self, asn: Asn) -> Option<&str> {
        self.asn_to_org.get(&asn).map(String::as_str)
    }

    pub fn organizations(&self) -> &[String] {
        &self.organizations
    }

    pub fn asn_count(&self) -> usize {
        self.asn_to_org.len()
    }
}

fn parse_asn(s: &str) -> Option<Asn> {
    s.trim().trim_start_matches("AS").parse().ok()
}
