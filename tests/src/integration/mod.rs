//! Integration scenarios across the ingestor, runner and reporter.

#[cfg(test)]
mod harness;

pub mod concurrency;
pub mod e2e_pipeline;
pub mod pruning;
pub mod workload_packaging;
