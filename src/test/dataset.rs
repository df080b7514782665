use std::fs;
use std::path::Path;

use super::{generate, line_topology, org_table, quiet_config, rib, unique_temp_dir};
use crate::config::GeneratorConfig;
use crate::dataset::{
    CONFIG_FILE, ConsumerConfig, Dataset, DatasetStats, DatasetWriter, FLOWS_FILE, FeatureFilter, Summary,
    dataset_dir, score,
};
use crate::flow::Feature;
use crate::pipeline::RunOutput;
use crate::topo::{NodeNames, Topology};

fn write_dataset(dir: &Path, topo: &Topology, run: &RunOutput) {
    let names = NodeNames::automatic(topo);
    let stats = DatasetStats::new(&run.output, &run.organizations, topo, 7, None, run.features.bounds());
    let writer = DatasetWriter::create(dir).unwrap();
    writer
        .write_all(&run.output, &run.organizations, topo, &names, &stats)
        .unwrap();
}

fn sample_run() -> (Topology, RunOutput) {
    let (topo, _) = line_topology();
    let table = org_table(&[("Acme Corp.", 1), ("globex", 2)]);
    let entries = rib(&[("10.0.0.0/24", 1), ("10.0.1.0/24", 2), ("2001:db8::/48", 2)]);
    let cfg = GeneratorConfig {
        multipath_continue_probability: 0.5,
        feature_count: 3,
        ..quiet_config()
    };
    let run = generate(&topo, &table, &entries, &cfg);
    (topo, run)
}

#[test]
fn dataset_dir_names_by_limit() {
    assert_eq!(dataset_dir(Path::new("out/ds"), Some(1000)), Path::new("out/ds_1000"));
    assert_eq!(dataset_dir(Path::new("out/ds"), None), Path::new("out/ds_all"));
    assert_eq!(dataset_dir(Path::new("out/ds/"), Some(0)), Path::new("out/ds_all"));
}

#[test]
fn written_dataset_loads_back() {
    let (topo, run) = sample_run();
    let root = unique_temp_dir("dataset");
    let dir = root.join("ds_all");
    write_dataset(&dir, &topo, &run);

    let loaded = Dataset::load(&dir).expect("load");
    assert_eq!(loaded.topology.node_count(), topo.node_count());
    assert_eq!(loaded.topology.edge_count(), topo.edge_count());
    assert_eq!(loaded.records.len(), run.output.records.len());
    for (got, want) in loaded.records.iter().zip(&run.output.records) {
        let got_labels: Vec<&str> = got.path.iter().map(|&n| loaded.topology.label(n)).collect();
        let want_labels: Vec<&str> = want.path.iter().map(|&n| topo.label(n)).collect();
        assert_eq!(got_labels, want_labels);
        assert_eq!(got.organization, want.organization);
        assert_eq!(got.prefix, want.prefix);
        assert_eq!(got.shortest_path, want.shortest_path);
        assert_eq!(got.features, want.features);
        assert!((got.traffic_size - want.traffic_size).abs() <= 1e-9 * want.traffic_size);
    }

    let m = &loaded.mappings;
    assert_eq!(m.prefix_to_destination["10.0.0.0/24"], "Acme Corp.");
    assert_eq!(m.destination_to_prefix["globex"].len(), 2);
    assert_eq!(m.node_to_name["A"], "router_A");

    let raw = fs::read_to_string(dir.join(CONFIG_FILE)).unwrap();
    let consumer: ConsumerConfig = serde_json::from_str(&raw).unwrap();
    assert_eq!(consumer, ConsumerConfig::for_dataset("ds_all"));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn flows_file_is_reproducible() {
    let root = unique_temp_dir("dataset-repro");
    let (topo, first) = sample_run();
    let (_, second) = sample_run();
    write_dataset(&root.join("a"), &topo, &first);
    write_dataset(&root.join("b"), &topo, &second);

    let a = fs::read(root.join("a").join(FLOWS_FILE)).unwrap();
    let b = fs::read(root.join("b").join(FLOWS_FILE)).unwrap();
    assert!(!a.is_empty());
    assert_eq!(a, b);
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn consumer_config_shape() {
    let cfg = ConsumerConfig::for_dataset("ds_100");
    let v = serde_json::to_value(&cfg).unwrap();
    assert_eq!(v["ndb_conf"]["path"], "ds_100");
    assert_eq!(v["ndb_conf"]["data"], FLOWS_FILE);
    assert_eq!(v["summarizer_conf"]["sampling_rate"], -1);
    assert_eq!(
        v["features"],
        serde_json::json!(["ingress", "egress", "destination", "shortest_path", "path"])
    );
}

#[test]
fn stats_record_counts_and_distributions() {
    let (topo, run) = sample_run();
    let stats = DatasetStats::new(&run.output, &run.organizations, &topo, 7, Some(10), run.features.bounds());

    assert_eq!(stats.flows, run.output.records.len());
    assert_eq!(stats.organizations, 2);
    assert_eq!(stats.prefixes, 3);
    assert_eq!(stats.feature_bounds.len(), 3);
    assert_eq!(stats.distinct_feature_values.len(), 3);
    assert_eq!(stats.distributions["flow_size"].count, stats.flows);
    assert_eq!(stats.distributions["organization_prefixes"].count, 2);
}

#[test]
fn filters_and_score() {
    let (topo, run) = sample_run();
    let records = &run.output.records;

    let all: (f64, usize) = score(records, &topo, &[]);
    assert_eq!(all.1, records.len());

    // 目的地比较只看字母数字，大小写仍然区分
    let lower: FeatureFilter = "destination=acmecorp".parse().unwrap();
    assert_eq!(score(records, &topo, &[lower]), (0.0, 0));

    let acme: FeatureFilter = "destination=AcmeCorp".parse().unwrap();
    let (traffic, flows) = score(records, &topo, &[acme]);
    let expected: Vec<_> = records.iter().filter(|r| &*r.organization == "Acme Corp.").collect();
    assert!(!expected.is_empty());
    assert_eq!(flows, expected.len());
    let want: f64 = expected.iter().map(|r| r.traffic_size).sum();
    assert!((traffic - want).abs() < 1e-9);

    let path: FeatureFilter = "path=A->B->C".parse().unwrap();
    let egress: FeatureFilter = "egress=C".parse().unwrap();
    let (_, flows) = score(records, &topo, &[path, egress]);
    assert_eq!(flows, records.iter().filter(|r| r.path.len() == 3).count());

    let shortest: FeatureFilter = "shortest_path=true".parse().unwrap();
    assert_eq!(score(records, &topo, &[shortest]).1, records.len());

    let f: FeatureFilter = "feature_0=0".parse().unwrap();
    assert_eq!(f.feature, Feature::Extra(0));
    assert!("nonsense".parse::<FeatureFilter>().is_err());
    assert!("colour=red".parse::<FeatureFilter>().is_err());

    let out_of_range: FeatureFilter = "feature_9=0".parse().unwrap();
    assert_eq!(score(records, &topo, &[out_of_range]).1, 0);
}

#[test]
fn feature_names_round_trip_through_display() {
    for name in ["path", "destination", "prefix", "ingress", "egress", "shortest_path", "feature_11"] {
        let f: Feature = name.parse().unwrap();
        assert_eq!(f.to_string(), name);
    }
}

#[test]
fn summary_nearest_rank() {
    assert!(Summary::of(&[]).is_none());

    let values: Vec<f64> = (1..=100).map(f64::from).collect();
    let s = Summary::of(&values).unwrap();
    assert_eq!(s.count, 100);
    assert_eq!(s.min, 1.0);
    assert_eq!(s.p25, 25.0);
    assert_eq!(s.p50, 50.0);
    assert_eq!(s.p99, 99.0);
    assert_eq!(s.max, 100.0);
    assert_eq!(s.mean, 50.5);

    let s = Summary::of_counts(&[3]).unwrap();
    assert_eq!((s.min, s.p50, s.max), (3.0, 3.0, 3.0));
}

#[test]
fn unknown_node_in_flows_is_malformed() {
    let (topo, run) = sample_run();
    let root = unique_temp_dir("dataset-bad");
    write_dataset(&root, &topo, &run);
    fs::write(
        root.join(FLOWS_FILE),
        r#"{"path":["A","Q"],"destination":"x","prefix":"10.0.0.0/24","traffic_size":1.0,"shortest_path":true,"features":[]}
"#,
    )
    .unwrap();
    let err = Dataset::load(&root).unwrap_err();
    assert!(matches!(err, crate::error::GenError::Malformed { line: 1, .. }), "{err}");
    let _ = fs::remove_dir_all(&root);
}
