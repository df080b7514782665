//! 合成流数据集生成
//!
//! 读入拓扑、ASN -> 组织表和 RIB 快照，为每个 prefix limit 写出一个数据集目录。

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use flowsynth_rs::config::GeneratorConfig;
use flowsynth_rs::dataset::{DatasetStats, DatasetWriter, dataset_dir};
use flowsynth_rs::error::{GenError, Result};
use flowsynth_rs::org::{AsOrgTable, load_rib};
use flowsynth_rs::pipeline::run_generation;
use flowsynth_rs::rng::RunSeed;
use flowsynth_rs::topo::{NodeNames, TopologyIndex, TopologySpec};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AsOrgFormat {
    /// CAIDA as-org (`# format:` sections)
    Caida,
    /// One `org_name-asn` per line
    Compact,
}

#[derive(Debug, Parser)]
#[command(name = "generate", about = "Generate synthetic flow datasets on a router topology")]
struct Args {
    /// Path to topology.json
    #[arg(long)]
    topology: PathBuf,

    /// ASN to organization table
    #[arg(long)]
    as_org: PathBuf,

    #[arg(long, value_enum, default_value_t = AsOrgFormat::Caida)]
    as_org_format: AsOrgFormat,

    /// RIB snapshot (prefix ... origin per line)
    #[arg(long)]
    rib: PathBuf,

    /// Output path; one directory `<out>_<limit>` (or `<out>_all`) per prefix limit
    #[arg(long)]
    out: PathBuf,

    /// Generator config JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Prefix limit, repeatable; 0 means all prefixes
    #[arg(long = "prefix-limit")]
    prefix_limits: Vec<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Egress node label, repeatable; overrides the topology file
    #[arg(long = "egress")]
    egresses: Vec<String>,

    /// Pick this many egress nodes at random instead
    #[arg(long, conflicts_with = "egresses")]
    num_egresses: Option<usize>,

    /// JSON object mapping node label to display name
    #[arg(long)]
    names: Option<PathBuf>,

    #[arg(long)]
    egress_exception_probability: Option<f64>,

    #[arg(long)]
    deviation_probability: Option<f64>,

    #[arg(long)]
    multipath_continue_probability: Option<f64>,

    #[arg(long)]
    feature_count: Option<usize>,

    /// Extra cost allowed for deviation paths; enables anomaly injection
    #[arg(long)]
    deviation_slack: Option<u64>,
}

fn load_config(args: &Args) -> Result<GeneratorConfig> {
    let mut cfg = match &args.config {
        Some(path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(p) = args.egress_exception_probability {
        cfg.egress_exception_probability = p;
    }
    if let Some(p) = args.deviation_probability {
        cfg.deviation_probability = p;
    }
    if let Some(p) = args.multipath_continue_probability {
        cfg.multipath_continue_probability = p;
    }
    if let Some(n) = args.feature_count {
        cfg.feature_count = n;
    }
    if args.deviation_slack.is_some() {
        cfg.deviation_slack = args.deviation_slack;
    }
    if args.seed.is_some() {
        cfg.random_seed = args.seed;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn run(args: Args) -> Result<()> {
    let cfg = load_config(&args)?;
    let seed = RunSeed::new(cfg.random_seed);
    info!(seed = seed.0, "run seed");

    let spec = TopologySpec::from_file(&args.topology)?;
    let mut topo = spec.build()?;
    if !args.egresses.is_empty() {
        topo.set_egresses_by_label(&args.egresses)?;
    } else if let Some(n) = args.num_egresses {
        topo.pick_random_egresses(n, &mut seed.stream("egresses"))?;
    }
    if topo.egresses().is_empty() {
        return Err(GenError::config(
            "no egress nodes: list them in the topology file or pass --egress / --num-egresses",
        ));
    }

    let mut given_names = spec.inline_names();
    if let Some(path) = &args.names {
        let raw = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        let extra: BTreeMap<String, String> = serde_json::from_str(&raw).map_err(|e| GenError::json(path, e))?;
        given_names.extend(extra);
    }
    let names = if given_names.is_empty() {
        NodeNames::automatic(&topo)
    } else {
        NodeNames::from_map(&topo, &given_names)?
    };
    info!(
        nodes = topo.node_count(),
        links = topo.edge_count(),
        egresses = topo.egresses().len(),
        "graph done"
    );

    let table = match args.as_org_format {
        AsOrgFormat::Caida => AsOrgTable::from_file(&args.as_org)?,
        AsOrgFormat::Compact => {
            let raw = fs::read_to_string(&args.as_org).map_err(|e| GenError::io(&args.as_org, e))?;
            AsOrgTable::parse_compact(&raw, &args.as_org.display().to_string())?
        }
    };
    info!(asns = table.asn_count(), "organizations done");

    let rib = load_rib(&args.rib)?;
    let index = TopologyIndex::build(&topo, &cfg.deviation_opts());

    let limits: Vec<Option<usize>> = if args.prefix_limits.is_empty() {
        vec![cfg.effective_prefix_limit()]
    } else {
        args.prefix_limits.iter().map(|&l| Some(l).filter(|&l| l > 0)).collect()
    };

    for limit in limits {
        let run_cfg = GeneratorConfig {
            prefix_limit: limit,
            ..cfg.clone()
        };
        let result = run_generation(&topo, &index, &table, &rib, &run_cfg, seed)?;

        let dir = dataset_dir(&args.out, limit);
        let stats = DatasetStats::new(
            &result.output,
            &result.organizations,
            &topo,
            seed.0,
            limit,
            result.features.bounds(),
        );
        let writer = DatasetWriter::create(&dir)?;
        writer.write_all(&result.output, &result.organizations, &topo, &names, &stats)?;

        println!(
            "dataset {} flows={} organizations={} prefixes={} unknown_prefixes={} skipped_flows={}",
            dir.display(),
            stats.flows,
            stats.organizations,
            stats.prefixes,
            stats.unknown_prefixes,
            stats.skipped_flows
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
