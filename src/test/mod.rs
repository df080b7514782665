mod config;
mod dataset;
mod sampler;
mod topology_index;

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::GeneratorConfig;
use crate::org::{AsOrgTable, RibEntry};
use crate::pipeline::{RunOutput, run_generation};
use crate::rng::RunSeed;
use crate::topo::{DeviationOpts, NodeId, Topology, TopologyIndex};

/// A - B - C，单位代价，出口 {C}
pub(crate) fn line_topology() -> (Topology, [NodeId; 3]) {
    let mut topo = Topology::new();
    let a = topo.add_node("A");
    let b = topo.add_node("B");
    let c = topo.add_node("C");
    topo.connect_bidir(a, b, 1).unwrap();
    topo.connect_bidir(b, c, 1).unwrap();
    topo.set_egresses([c]).unwrap();
    (topo, [a, b, c])
}

/// Diamond:
/// s -> {x, y} -> t，两条等价最短路
pub(crate) fn diamond_topology() -> (Topology, [NodeId; 4]) {
    let mut topo = Topology::new();
    let s = topo.add_node("s");
    let x = topo.add_node("x");
    let y = topo.add_node("y");
    let t = topo.add_node("t");
    topo.connect_bidir(s, x, 1).unwrap();
    topo.connect_bidir(s, y, 1).unwrap();
    topo.connect_bidir(x, t, 1).unwrap();
    topo.connect_bidir(y, t, 1).unwrap();
    topo.set_egresses([t]).unwrap();
    (topo, [s, x, y, t])
}

pub(crate) fn org_table(entries: &[(&str, u32)]) -> AsOrgTable {
    let mut table = AsOrgTable::default();
    for &(name, asn) in entries {
        table.insert(asn, name);
    }
    table
}

pub(crate) fn rib(entries: &[(&str, u32)]) -> Vec<RibEntry> {
    entries
        .iter()
        .map(|&(prefix, origin)| RibEntry {
            prefix: prefix.parse().expect("prefix"),
            origin,
        })
        .collect()
}

/// 关闭所有随机偏离，便于断言具体路径
pub(crate) fn quiet_config() -> GeneratorConfig {
    GeneratorConfig {
        egress_exception_probability: 0.0,
        deviation_probability: 0.0,
        multipath_continue_probability: 0.0,
        random_seed: Some(7),
        ..GeneratorConfig::default()
    }
}

pub(crate) fn generate(topo: &Topology, table: &AsOrgTable, rib: &[RibEntry], cfg: &GeneratorConfig) -> RunOutput {
    let index = TopologyIndex::build(topo, &cfg.deviation_opts());
    run_generation(topo, &index, table, rib, cfg, RunSeed::new(cfg.random_seed)).expect("generation")
}

pub(crate) fn index_of(topo: &Topology) -> TopologyIndex {
    TopologyIndex::build(topo, &DeviationOpts::default())
}

pub(crate) fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("flowsynth-{prefix}-{}-{nanos}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}
