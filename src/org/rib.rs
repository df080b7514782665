//! RIB 快照：前缀及其 origin AS

use std::fs;
use std::path::Path;

use ipnet::IpNet;
use tracing::info;

use super::Asn;
use crate::error::{GenError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RibEntry {
    pub prefix: IpNet,
    pub origin: Asn,
}

/// 读取 RIB 文件
pub fn load_rib(path: &Path) -> Result<Vec<RibEntry>> {
    let raw = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
    parse_rib(&raw, &path.display().to_string())
}

/// 每行以空白分隔：第一个字段是前缀，最后一个字段是 origin。
/// origin 为 AS-set（`{64512,64513}`）时取第一个。
pub fn parse_rib(raw: &str, source_name: &str) -> Result<Vec<RibEntry>> {
    let mut entries = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (Some(&first), Some(&last)) = (tokens.first(), tokens.last()) else {
            continue;
        };
        let prefix: IpNet = first
            .parse()
            .map_err(|_| GenError::malformed(source_name, idx + 1, format!("invalid prefix {first:?}")))?;
        let origin = parse_origin(last)
            .ok_or_else(|| GenError::malformed(source_name, idx + 1, format!("invalid origin {last:?}")))?;
        entries.push(RibEntry { prefix, origin });
    }
    info!(entries = entries.len(), "loaded RIB");
    Ok(entries)
}

/// `13335` 或 `{64512,64513}`
pub fn parse_origin(token: &str) -> Option<Asn> {
    if token.contains('{') {
        let inner = token.trim_start_matches('{').trim_end_matches('}');
        inner.split(',').next()?.trim().parse().ok()
    } else {
        token.parse().ok()
    }
}
