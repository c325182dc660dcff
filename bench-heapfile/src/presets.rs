use std::fmt::{Display, Formatter};

use clap::ValueEnum;

use crate::config::{BenchmarkConfig, DatasetConfig, Partitioning, TableConfig};
use crate::datasets::UniformInts;

/// Ready-made benchmark layouts.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Preset {
    /// A wide and a wider table over disjoint value ranges, two nodes.
    #[clap(name = "two-tables")]
    TwoTables,
    /// Three million narrow tuples, two nodes.
    #[clap(name = "wide-scan")]
    WideScan,
    /// A single-column table, four nodes.
    #[clap(name = "four-way")]
    FourWay,
    /// Four small all-zero tables, two nodes.
    #[clap(name = "hash-partition")]
    HashPartition,
    /// The sparse occupancy fixture on a single node.
    #[clap(name = "sparse")]
    Sparse,
}

impl Preset {
    pub fn name(&self) -> &'static str {
        match self {
            Preset::TwoTables => "two-tables",
            Preset::WideScan => "wide-scan",
            Preset::FourWay => "four-way",
            Preset::HashPartition => "hash-partition",
            Preset::Sparse => "sparse",
        }
    }

    pub fn config(&self) -> BenchmarkConfig {
        let uniform = |tuples, fields, low, high, partitioning| {
            TableConfig::new(
                DatasetConfig::Uniform(UniformInts::new(tuples, fields, low, high)),
                partitioning,
            )
        };

        let tables = match self {
            Preset::TwoTables => vec![
                uniform(50_000, 100, 0, 100, Partitioning::Sizes(vec![25_000, 25_000])),
                uniform(20_000, 200, 200, 300, Partitioning::Sizes(vec![10_000, 10_000])),
            ],
            Preset::WideScan => vec![uniform(
                3_000_000,
                2,
                0,
                100,
                Partitioning::Sizes(vec![1_500_000, 1_500_000]),
            )],
            Preset::FourWay => vec![uniform(100_000, 1, 0, 100, Partitioning::Even { even: 4 })],
            Preset::HashPartition => (0..4)
                .map(|_| uniform(100, 10, 0, 0, Partitioning::Sizes(vec![50, 50])))
                .collect(),
            Preset::Sparse => vec![TableConfig::new(
                DatasetConfig::Sparse,
                Partitioning::Even { even: 1 },
            )],
        };
        BenchmarkConfig::new(tables)
    }
}

impl Display for Preset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
