//! 读回导出的数据集
//!
//! `shortest_path` 标签在读入时按拓扑重新计算，不信任文件中的值。

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ipnet::IpNet;
use tracing::info;

use super::export::{FLOWS_FILE, FlowRow, MAPPINGS_FILE, Mappings, TOPOLOGY_FILE};
use crate::error::{GenError, Result};
use crate::flow::FlowRecord;
use crate::topo::{DistanceTable, Topology, TopologySpec};

#[derive(Debug, Clone)]
pub struct Dataset {
    pub dir: PathBuf,
    pub topology: Topology,
    pub mappings: Mappings,
    pub records: Vec<FlowRecord>,
}

impl Dataset {
    pub fn load(dir: &Path) -> Result<Self> {
        let topology = TopologySpec::from_file(&dir.join(TOPOLOGY_FILE))?.build()?;

        let mappings_path = dir.join(MAPPINGS_FILE);
        let raw = fs::read_to_string(&mappings_path).map_err(|e| GenError::io(&mappings_path, e))?;
        let mappings: Mappings = serde_json::from_str(&raw).map_err(|e| GenError::json(&mappings_path, e))?;

        let flows_path = dir.join(FLOWS_FILE);
        let raw = fs::read_to_string(&flows_path).map_err(|e| GenError::io(&flows_path, e))?;
        let distances = DistanceTable::compute(&topology);
        let source_name = flows_path.display().to_string();

        let mut records = Vec::new();
        for (idx, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row: FlowRow = serde_json::from_str(line).map_err(|e| GenError::json(&flows_path, e))?;
            records.push(row_to_record(row, &topology, &distances, &source_name, idx + 1)?);
        }

        info!(
            dir = %dir.display(),
            flows = records.len(),
            nodes = topology.node_count(),
            links = topology.edge_count(),
            "loaded dataset"
        );
        Ok(Self {
            dir: dir.to_path_buf(),
            topology,
            mappings,
            records,
        })
    }
}

fn row_to_record(
    row: FlowRow,
    topo: &Topology,
    distances: &DistanceTable,
    source_name: &str,
    line: usize,
) -> Result<FlowRecord> {
    let path = row
        .path
        .iter()
        .map(|label| {
            topo.node_by_label(label)
                .ok_or_else(|| GenError::malformed(source_name, line, format!("unknown node {label:?}")))
        })
        .collect::<Result<Vec<_>>>()?;
    if path.is_empty() {
        return Err(GenError::malformed(source_name, line, "empty path"));
    }
    let prefix: IpNet = row
        .prefix
        .parse()
        .map_err(|_| GenError::malformed(source_name, line, format!("invalid prefix {:?}", row.prefix)))?;

    Ok(FlowRecord {
        shortest_path: distances.is_shortest(topo, &path),
        path,
        organization: Arc::from(row.destination),
        prefix,
        traffic_size: row.traffic_size,
        features: row.features,
    })
}
