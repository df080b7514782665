pub mod config;
pub mod dataset;
pub mod error;
pub mod flow;
pub mod org;
pub mod pipeline;
pub mod rng;
pub mod topo;

#[cfg(test)]
mod test;
