//! Splits benchmark tables into per-node partitions.
//!
//! Every check runs before anything touches the disk, so an inconsistent plan never leaves a
//! half-written cluster behind.

use heapfile::TupleBatch;
use heapfile_error::{HeapResult, heap_bail};
use itertools::Itertools;
use tracing::debug;

use crate::cluster::table_name;
use crate::shuffle::{Stream, rng_for, shuffle};

/// One table together with how many of its slots each node receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInput {
    batch: TupleBatch,
    field_count: Option<usize>,
    partition_sizes: Vec<usize>,
}

impl TableInput {
    /// The field count is taken from the first present tuple of `batch`.
    pub fn new(batch: TupleBatch, partition_sizes: Vec<usize>) -> Self {
        let field_count = batch.field_count();
        Self {
            batch,
            field_count,
            partition_sizes,
        }
    }

    /// Overrides the inferred field count, which tables without any present tuple need.
    pub fn with_field_count(mut self, field_count: usize) -> Self {
        self.field_count = Some(field_count);
        self
    }
}

/// What gets written for one table: the whole table for the unpartitioned node and one
/// contiguous slice per partition node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePlan {
    pub index: usize,
    pub name: String,
    pub field_count: usize,
    pub unpartitioned: TupleBatch,
    pub partitions: Vec<TupleBatch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionPlanner {
    randomize: bool,
    seed: u64,
}

impl Default for PartitionPlanner {
    fn default() -> Self {
        Self {
            randomize: true,
            seed: 0,
        }
    }
}

impl PartitionPlanner {
    pub fn new(randomize: bool, seed: u64) -> Self {
        Self { randomize, seed }
    }

    /// Validates `tables` and cuts each into partitions.
    ///
    /// The unpartitioned copy keeps the original order. Partitions are taken from the shuffled
    /// table when randomizing, each table with its own stream derived from the seed.
    pub fn plan(&self, tables: Vec<TableInput>) -> HeapResult<Vec<TablePlan>> {
        let Some(first) = tables.first() else {
            heap_bail!(InvalidConfig: "a benchmark needs at least one table");
        };
        let nodes = first.partition_sizes.len();
        if nodes == 0 {
            heap_bail!(PartitionMismatch: "{} is split across zero nodes", table_name(0));
        }

        let field_counts = tables
            .iter()
            .enumerate()
            .map(|(index, table)| Self::check(index, table, nodes))
            .collect::<HeapResult<Vec<_>>>()?;

        Ok(tables
            .into_iter()
            .zip(field_counts)
            .enumerate()
            .map(|(index, (table, field_count))| self.split(index, table, field_count))
            .collect())
    }

    fn check(index: usize, table: &TableInput, nodes: usize) -> HeapResult<usize> {
        let name = table_name(index);
        if table.partition_sizes.len() != nodes {
            heap_bail!(
                PartitionMismatch: "{name} is split across {} nodes but {} uses {nodes}",
                table.partition_sizes.len(),
                table_name(0)
            );
        }
        if table.batch.is_empty() {
            heap_bail!(EmptyBatch: "{name} has no tuples");
        }
        let total = table
            .partition_sizes
            .iter()
            .try_fold(0usize, |total, size| total.checked_add(*size));
        let Some(total) = total else {
            heap_bail!(PartitionMismatch: "partition sizes of {name} overflow");
        };
        if total != table.batch.len() {
            heap_bail!(
                PartitionMismatch: "partitions of {name} hold {total} tuples but the table has {}",
                table.batch.len()
            );
        }
        let Some(field_count) = table.field_count else {
            heap_bail!(InvalidConfig: "{name} has no present tuple to take a field count from");
        };
        table
            .batch
            .validate(field_count)
            .map_err(|e| e.with_context(format!("validating {name}")))?;
        Ok(field_count)
    }

    fn split(&self, index: usize, table: TableInput, field_count: usize) -> TablePlan {
        let TableInput {
            batch,
            partition_sizes,
            ..
        } = table;

        let shuffled = self
            .randomize
            .then(|| shuffle(batch.clone(), &mut rng_for(self.seed, index, Stream::Shuffle)));
        let source = shuffled.as_ref().unwrap_or(&batch);

        let mut start = 0;
        let partitions = partition_sizes
            .iter()
            .map(|size| {
                let partition = source.slice(start..start + size);
                start += size;
                partition
            })
            .collect();
        debug!(
            "planned {} with sizes {}",
            table_name(index),
            partition_sizes.iter().join("/")
        );

        TablePlan {
            index,
            name: table_name(index),
            field_count,
            unpartitioned: batch,
            partitions,
        }
    }
}
