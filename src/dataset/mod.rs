//! 数据集导出、读回与查询

mod export;
mod load;
mod query;
mod summary;

pub use export::{
    CONFIG_FILE, ConsumerConfig, DatasetStats, DatasetWriter, FLOWS_FILE, FlowRow, MAPPINGS_FILE, Mappings,
    NdbConf, STATS_FILE, SummarizerConf, TOPOLOGY_FILE, dataset_dir,
};
pub use load::Dataset;
pub use query::{FeatureFilter, score};
pub use summary::Summary;
