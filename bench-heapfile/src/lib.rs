//! Benchmark data generation for heap files: builds tables of integer tuples, splits them
//! across a simulated cluster and writes every partition with the `heapfile` encoder.

pub mod cluster;
pub mod config;
pub mod datasets;
pub mod display;
pub mod generate;
pub mod planner;
pub mod presets;
pub mod shuffle;
pub mod utils;

pub use cluster::ClusterLayout;
pub use config::{BenchmarkConfig, ClusterConfig, DatasetConfig, Partitioning, TableConfig};
pub use generate::{WrittenFile, generate, write_benchmark};
pub use planner::{PartitionPlanner, TableInput, TablePlan};
pub use presets::Preset;

#[macro_export]
macro_rules! feature_flagged_allocator {
    () => {
        cfg_if::cfg_if! {
            if #[cfg(feature = "mimalloc")] {
                #[global_allocator]
                static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;
            }
        }
    };
}
