//! 查看生成的数据集
//!
//! 打印流、组织、前缀数量，每个组织的前缀数，实际用到的出口，随机一条流，
//! 以及按 `--filter` 条件累计的流量。

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use flowsynth_rs::dataset::{Dataset, FeatureFilter, score};
use flowsynth_rs::error::Result;
use rand::seq::SliceRandom;
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "inspect-dataset", about = "Summarize a generated flow dataset")]
struct Args {
    /// Dataset directory (as written by `generate`)
    #[arg(long)]
    dir: PathBuf,

    /// Print the prefix count of every destination
    #[arg(long)]
    per_destination: bool,

    /// `feature=value` condition, repeatable; all must hold
    #[arg(long = "filter")]
    filters: Vec<String>,
}

fn run(args: Args) -> Result<()> {
    let dataset = Dataset::load(&args.dir)?;
    let topo = &dataset.topology;
    let mappings = &dataset.mappings;

    println!(
        "flows={} destinations={} prefixes={}",
        dataset.records.len(),
        mappings.destination_to_prefix.len(),
        mappings.prefix_to_destination.len()
    );
    println!("nodes={} links={}", topo.node_count(), topo.edge_count());

    if args.per_destination {
        for (destination, prefixes) in &mappings.destination_to_prefix {
            println!("destination {:?} prefixes={}", destination, prefixes.len());
        }
    }

    let egresses: BTreeSet<&str> = dataset.records.iter().map(|r| topo.label(r.egress())).collect();
    println!(
        "egresses_used={} [{}]",
        egresses.len(),
        egresses.iter().copied().collect::<Vec<_>>().join(", ")
    );

    if let Some(r) = dataset.records.choose(&mut rand::thread_rng()) {
        let path = r.path.iter().map(|&n| topo.label(n)).collect::<Vec<_>>().join(" -> ");
        println!(
            "sample_flow {} - {} - {} - {}",
            path, r.organization, r.prefix, r.traffic_size
        );
    }

    if !args.filters.is_empty() {
        let filters = args
            .filters
            .iter()
            .map(|f| f.parse::<FeatureFilter>())
            .collect::<Result<Vec<_>>>()?;
        let (traffic, flows) = score(&dataset.records, topo, &filters);
        println!("score traffic={traffic:.6} flows={flows} filters={:?}", args.filters);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
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
