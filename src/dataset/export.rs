//! 数据集导出
//!
//! 每个 prefix limit 一个目录：
//! - `flows.jsonl`：每行一条流记录，顺序与生成顺序一致
//! - `mappings.json`：组织 <-> 前缀、节点 <-> 显示名
//! - `topology.json`：生成时使用的拓扑（explicit 形式）
//! - `stats.json`：诊断计数与各统计量的分布摘要
//! - `config.json`：给下游汇总系统的配置

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::summary::Summary;
use crate::error::{GenError, Result};
use crate::flow::{FlowRecord, GenerationOutput};
use crate::org::OrganizationAssignment;
use crate::topo::{NodeNames, Topology, TopologySpec};

pub const FLOWS_FILE: &str = "flows.jsonl";
pub const MAPPINGS_FILE: &str = "mappings.json";
pub const TOPOLOGY_FILE: &str = "topology.json";
pub const STATS_FILE: &str = "stats.json";
pub const CONFIG_FILE: &str = "config.json";

/// `flows.jsonl` 中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRow {
    pub path: Vec<String>,
    pub destination: String,
    pub prefix: String,
    pub traffic_size: f64,
    pub shortest_path: bool,
    pub features: Vec<u32>,
}

impl FlowRow {
    pub fn from_record(record: &FlowRecord, topo: &Topology) -> Self {
        Self {
            path: record.path.iter().map(|&n| topo.label(n).to_string()).collect(),
            destination: record.organization.to_string(),
            prefix: record.prefix.to_string(),
            traffic_size: record.traffic_size,
            shortest_path: record.shortest_path,
            features: record.features.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mappings {
    pub destination_to_prefix: BTreeMap<String, Vec<String>>,
    pub prefix_to_destination: BTreeMap<String, String>,
    pub node_to_name: BTreeMap<String, String>,
    pub name_to_node: BTreeMap<String, String>,
}

impl Mappings {
    pub fn new(orgs: &OrganizationAssignment, names: &NodeNames) -> Self {
        Self {
            destination_to_prefix: orgs.organization_to_prefix(),
            prefix_to_destination: orgs.prefix_to_organization(),
            node_to_name: names.node_to_name.clone(),
            name_to_node: names.name_to_node.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumerConfig {
    pub ndb_conf: NdbConf,
    pub summarizer_conf: SummarizerConf,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdbConf {
    pub db_type: String,
    pub path: String,
    pub data: String,
    pub topo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizerConf {
    pub summary_mode: String,
    pub tree_mode: String,
    pub splitting_mode: String,
    pub sampling_rate: i64,
}

impl ConsumerConfig {
    pub fn for_dataset(dir_name: &str) -> Self {
        Self {
            ndb_conf: NdbConf {
                db_type: "generated".to_string(),
                path: dir_name.to_string(),
                data: FLOWS_FILE.to_string(),
                topo: TOPOLOGY_FILE.to_string(),
            },
            summarizer_conf: SummarizerConf {
                summary_mode: "tree".to_string(),
                tree_mode: "balanced".to_string(),
                splitting_mode: "traffic_size".to_string(),
                sampling_rate: -1,
            },
            features: ["ingress", "egress", "destination", "shortest_path", "path"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// 写入 `stats.json` 的内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub seed: u64,
    pub prefix_limit: Option<usize>,
    pub flows: usize,
    pub organizations: usize,
    pub prefixes: usize,
    pub unknown_prefixes: usize,
    pub unknown_origins: usize,
    pub skipped_flows: usize,
    /// `[node, egress]` 标签对
    pub unreachable_pairs: Vec<(String, String)>,
    pub exception_prefixes: usize,
    pub deviation_draws: usize,
    pub feature_bounds: Vec<u32>,
    pub distinct_feature_values: Vec<usize>,
    pub distributions: BTreeMap<String, Summary>,
}

impl DatasetStats {
    pub fn new(
        out: &GenerationOutput,
        orgs: &OrganizationAssignment,
        topo: &Topology,
        seed: u64,
        prefix_limit: Option<usize>,
        feature_bounds: &[u32],
    ) -> Self {
        let stats = &out.stats;
        let diag = &out.diagnostics;

        let mut distributions = BTreeMap::new();
        let mut put = |name: &str, summary: Option<Summary>| {
            if let Some(s) = summary {
                distributions.insert(name.to_string(), s);
            }
        };
        put("num_egresses", Summary::of_counts(&stats.num_egresses));
        put("organization_size", Summary::of(&stats.organization_size));
        put("per_prefix_mean", Summary::of(&stats.per_prefix_mean));
        put("organization_prefixes", Summary::of_counts(&stats.organization_prefixes));
        put("organization_traffic", Summary::of(&values(&stats.organization_traffic)));
        put("egress_traffic", Summary::of(&values(&stats.egress_traffic)));
        put("ingress_traffic", Summary::of(&values(&stats.ingress_traffic)));
        let sizes: Vec<f64> = out.records.iter().map(|r| r.traffic_size).collect();
        put("flow_size", Summary::of(&sizes));

        Self {
            seed,
            prefix_limit,
            flows: out.records.len(),
            organizations: orgs.organizations().len(),
            prefixes: orgs.prefix_count(),
            unknown_prefixes: diag.unknown_prefixes,
            unknown_origins: diag.unknown_origins,
            skipped_flows: diag.skipped_flows,
            unreachable_pairs: diag
                .unreachable_pairs
                .iter()
                .map(|&(n, e)| (topo.label(n).to_string(), topo.label(e).to_string()))
                .collect(),
            exception_prefixes: stats.exception_prefixes,
            deviation_draws: stats.deviation_draws,
            feature_bounds: feature_bounds.to_vec(),
            distinct_feature_values: stats.feature_values.iter().map(|s| s.len()).collect(),
            distributions,
        }
    }
}

fn values<K>(m: &BTreeMap<K, f64>) -> Vec<f64> {
    m.values().copied().collect()
}

/// `<out>_<limit>`，不限时为 `<out>_all`
pub fn dataset_dir(out: &Path, prefix_limit: Option<usize>) -> PathBuf {
    let base = out.to_string_lossy();
    let base = base.trim_end_matches('/');
    match prefix_limit {
        Some(limit) if limit > 0 => PathBuf::from(format!("{base}_{limit}")),
        _ => PathBuf::from(format!("{base}_all")),
    }
}

pub struct DatasetWriter {
    dir: PathBuf,
}

impl DatasetWriter {
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| GenError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write_flows(&self, records: &[FlowRecord], topo: &Topology) -> Result<()> {
        let path = self.dir.join(FLOWS_FILE);
        let file = File::create(&path).map_err(|e| GenError::io(&path, e))?;
        let mut w = BufWriter::new(file);
        for record in records {
            serde_json::to_writer(&mut w, &FlowRow::from_record(record, topo))
                .map_err(|e| GenError::json(&path, e))?;
            w.write_all(b"\n").map_err(|e| GenError::io(&path, e))?;
        }
        w.flush().map_err(|e| GenError::io(&path, e))?;
        Ok(())
    }

    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value).map_err(|e| GenError::json(&path, e))?;
        fs::write(&path, json).map_err(|e| GenError::io(&path, e))
    }

    /// 写出完整的数据集目录
    pub fn write_all(
        &self,
        out: &GenerationOutput,
        orgs: &OrganizationAssignment,
        topo: &Topology,
        names: &NodeNames,
        stats: &DatasetStats,
    ) -> Result<()> {
        self.write_flows(&out.records, topo)?;
        self.write_json(MAPPINGS_FILE, &Mappings::new(orgs, names))?;
        self.write_json(TOPOLOGY_FILE, &TopologySpec::from_topology(topo, &names.node_to_name))?;
        self.write_json(STATS_FILE, stats)?;

        let dir_name = self
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.write_json(CONFIG_FILE, &ConsumerConfig::for_dataset(&dir_name))?;

        info!(dir = %self.dir.display(), flows = out.records.len(), "wrote dataset");
        Ok(())
    }
}
