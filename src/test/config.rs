use std::fs;

use super::{line_topology, org_table, quiet_config, rib, unique_temp_dir};
use crate::config::{EgressScale, GeneratorConfig};
use crate::error::GenError;
use crate::pipeline::run_generation;
use crate::rng::RunSeed;
use crate::topo::{MAX_LINK_COST, TopologyIndex};

#[test]
fn defaults() {
    let cfg = GeneratorConfig::default();
    assert_eq!(cfg.egress_exception_probability, 0.01);
    assert_eq!(cfg.deviation_probability, 0.05);
    assert_eq!(cfg.multipath_continue_probability, 0.1);
    assert_eq!(cfg.feature_count, 12);
    assert_eq!(cfg.prefix_limit, None);
    assert_eq!(cfg.egress_scale, EgressScale::PoolQuarterMedian);
    assert!(cfg.validate().is_ok());
    assert!(cfg.deviation_opts().slack.is_none());
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg: GeneratorConfig = serde_json::from_str(
        r#"{ "deviation_probability": 0.2, "prefix_limit": 1000, "egress_scale": { "fixed": 5.77 } }"#,
    )
    .unwrap();
    assert_eq!(cfg.deviation_probability, 0.2);
    assert_eq!(cfg.effective_prefix_limit(), Some(1000));
    assert_eq!(cfg.egress_scale, EgressScale::Fixed(5.77));
    assert_eq!(cfg.feature_count, 12);

    let cfg: GeneratorConfig = serde_json::from_str(r#"{ "prefix_limit": 0, "egress_scale": "pool_quarter_median" }"#).unwrap();
    assert_eq!(cfg.effective_prefix_limit(), None);
}

#[test]
fn out_of_range_values_fail_validation() {
    let bad = [
        GeneratorConfig {
            deviation_probability: 1.5,
            ..GeneratorConfig::default()
        },
        GeneratorConfig {
            egress_exception_probability: -0.1,
            ..GeneratorConfig::default()
        },
        GeneratorConfig {
            feature_count: 0,
            ..GeneratorConfig::default()
        },
        GeneratorConfig {
            flow_scale: 0.0,
            ..GeneratorConfig::default()
        },
        GeneratorConfig {
            egress_scale: EgressScale::Fixed(-1.0),
            ..GeneratorConfig::default()
        },
        GeneratorConfig {
            feature_bound_range: (10.0, 3.0),
            ..GeneratorConfig::default()
        },
        GeneratorConfig {
            deviation_slack: Some(u64::MAX),
            ..GeneratorConfig::default()
        },
    ];
    for cfg in bad {
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, GenError::Config(_)), "{err}");
    }
}

#[test]
fn oversized_deviation_slack_is_a_configuration_error() {
    let (topo, _) = line_topology();
    let cfg = GeneratorConfig {
        deviation_slack: Some(u64::MAX),
        deviation_probability: 1.0,
        ..quiet_config()
    };
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("deviation_slack"), "{err}");

    // 索引本身也不会因溢出而 panic；生成在配置校验处失败
    let index = TopologyIndex::build(&topo, &cfg.deviation_opts());
    let table = org_table(&[("acme", 1)]);
    let entries = rib(&[("10.0.0.0/24", 1)]);
    let err = run_generation(&topo, &index, &table, &entries, &cfg, RunSeed(1))
        .err()
        .expect("generation must fail");
    assert!(matches!(err, GenError::Config(_)), "{err}");

    let at_limit = GeneratorConfig {
        deviation_slack: Some(MAX_LINK_COST),
        ..quiet_config()
    };
    assert!(at_limit.validate().is_ok());
}

#[test]
fn from_file_validates() {
    let dir = unique_temp_dir("config");
    let ok = dir.join("ok.json");
    fs::write(&ok, r#"{ "random_seed": 42, "deviation_slack": 2 }"#).unwrap();
    let cfg = GeneratorConfig::from_file(&ok).unwrap();
    assert_eq!(cfg.random_seed, Some(42));
    assert_eq!(cfg.deviation_opts().slack, Some(2));

    let bad = dir.join("bad.json");
    fs::write(&bad, r#"{ "multipath_continue_probability": 3 }"#).unwrap();
    assert!(GeneratorConfig::from_file(&bad).is_err());

    let broken = dir.join("broken.json");
    fs::write(&broken, "{").unwrap();
    assert!(matches!(GeneratorConfig::from_file(&broken).unwrap_err(), GenError::Json { .. }));

    assert!(matches!(
        GeneratorConfig::from_file(&dir.join("missing.json")).unwrap_err(),
        GenError::Io { .. }
    ));
    let _ = fs::remove_dir_all(&dir);
}
