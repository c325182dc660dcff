//! JSON description of a benchmark: its tables, how each is partitioned, and the cluster the
//! partitions are laid out for.

use std::fs;
use std::path::Path;

use heapfile::{DEFAULT_PAGE_SIZE, TupleBatch};
use heapfile_error::{HeapResult, heap_bail};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::datasets::{SparsePattern, TupleSource, UniformInts};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchmarkConfig {
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "BenchmarkConfig::default_page_size")]
    pub page_size: usize,
    /// Shuffle each table before it is split into partitions.
    #[serde(default = "BenchmarkConfig::default_randomize")]
    pub randomize: bool,
    #[serde(default)]
    pub cluster: ClusterConfig,
    pub tables: Vec<TableConfig>,
}

impl BenchmarkConfig {
    pub fn new(tables: Vec<TableConfig>) -> Self {
        Self {
            seed: 0,
            page_size: DEFAULT_PAGE_SIZE,
            randomize: true,
            cluster: ClusterConfig::default(),
            tables,
        }
    }

    pub fn from_json(json: &str) -> HeapResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> HeapResult<Self> {
        Self::from_json(&fs::read_to_string(path)?)
            .map_err(|e| e.with_context(format!("reading {}", path.display())))
    }

    pub fn to_json_pretty(&self) -> HeapResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn default_page_size() -> usize {
        DEFAULT_PAGE_SIZE
    }

    fn default_randomize() -> bool {
        true
    }
}

/// Where the simulated nodes listen. Node `p` gets port `starting_port + p`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClusterConfig {
    pub host: String,
    pub starting_port: u16,
    /// Port of the pseudo-node holding every table unpartitioned.
    pub unpartitioned_port: u16,
}

impl ClusterConfig {
    pub const DEFAULT_HOST: &'static str = "127.0.0.1";
    pub const DEFAULT_STARTING_PORT: u16 = 8001;
    pub const DEFAULT_UNPARTITIONED_PORT: u16 = 9999;
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_owned(),
            starting_port: Self::DEFAULT_STARTING_PORT,
            unpartitioned_port: Self::DEFAULT_UNPARTITIONED_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    pub dataset: DatasetConfig,
    pub partitioning: Partitioning,
}

impl TableConfig {
    pub fn new(dataset: DatasetConfig, partitioning: Partitioning) -> Self {
        Self {
            dataset,
            partitioning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetConfig {
    Uniform(UniformInts),
    Sparse,
}

impl TupleSource for DatasetConfig {
    fn name(&self) -> String {
        match self {
            DatasetConfig::Uniform(source) => source.name(),
            DatasetConfig::Sparse => SparsePattern.name(),
        }
    }

    fn num_fields(&self) -> usize {
        match self {
            DatasetConfig::Uniform(source) => source.num_fields(),
            DatasetConfig::Sparse => SparsePattern.num_fields(),
        }
    }

    fn num_tuples(&self) -> usize {
        match self {
            DatasetConfig::Uniform(source) => source.num_tuples(),
            DatasetConfig::Sparse => SparsePattern.num_tuples(),
        }
    }

    fn generate(&self, rng: &mut StdRng) -> HeapResult<TupleBatch> {
        match self {
            DatasetConfig::Uniform(source) => source.generate(rng),
            DatasetConfig::Sparse => SparsePattern.generate(rng),
        }
    }
}

/// How many tuples of a table each node receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Partitioning {
    /// Explicit partition sizes, one per node.
    Sizes(Vec<usize>),
    /// Split the table across `even` nodes; the first `len % even` nodes get one extra tuple.
    Even { even: usize },
}

impl Partitioning {
    /// Resolves the partition sizes for a table of `num_tuples` slots.
    pub fn sizes(&self, num_tuples: usize) -> HeapResult<Vec<usize>> {
        match self {
            Partitioning::Sizes(sizes) => Ok(sizes.clone()),
            Partitioning::Even { even: 0 } => {
                heap_bail!(InvalidConfig: "an even partitioning needs at least one node")
            }
            Partitioning::Even { even } => {
                let (base, extra) = (num_tuples / even, num_tuples % even);
                Ok((0..*even).map(|p| base + usize::from(p < extra)).collect())
            }
        }
    }
}
