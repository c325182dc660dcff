use std::iter;
use std::path::{Path, PathBuf};

use heapfile::{HeapWriteOptions, PageLayout, WriteSummary};
use heapfile_error::{HeapResult, heap_bail};
use indicatif::ProgressBar;
use itertools::Itertools;
use rayon::prelude::*;
use tracing::info;

use crate::cluster::{ClusterLayout, table_file_name};
use crate::config::BenchmarkConfig;
use crate::datasets::TupleSource;
use crate::planner::{PartitionPlanner, TableInput, TablePlan};
use crate::shuffle::{Stream, rng_for};

/// One heap file produced for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub table: String,
    pub port: u16,
    pub path: PathBuf,
    pub summary: WriteSummary,
}

/// Resets the cluster directories, then writes every planned table to the unpartitioned node
/// and its partitions to the partition nodes, followed by the catalogs and the address list.
///
/// Nothing is removed unless every table fits `page_size`. Files are encoded in parallel on
/// the global rayon pool; `progress` ticks once per file.
pub fn write_benchmark(
    plans: &[TablePlan],
    cluster: &ClusterLayout,
    page_size: usize,
    progress: &ProgressBar,
) -> HeapResult<Vec<WrittenFile>> {
    if let Some(plan) = plans.iter().find(|p| p.partitions.len() != cluster.nodes()) {
        heap_bail!(
            PartitionMismatch: "{} has {} partitions but the cluster has {} nodes",
            plan.name,
            plan.partitions.len(),
            cluster.nodes()
        );
    }

    for plan in plans {
        PageLayout::try_new(plan.field_count, page_size)
            .map_err(|e| e.with_context(format!("laying out {}", plan.name)))?;
    }

    cluster.reset()?;

    let jobs = plans
        .iter()
        .flat_map(|plan| {
            let partitions = plan
                .partitions
                .iter()
                .enumerate()
                .map(move |(node, batch)| (cluster.node_port(node), batch));
            iter::once((cluster.unpartitioned_port(), &plan.unpartitioned))
                .chain(partitions)
                .map(move |(port, batch)| (plan, port, batch))
        })
        .collect_vec();
    progress.set_length(jobs.len() as u64);

    let files = jobs
        .into_par_iter()
        .map(|(plan, port, batch)| {
            let path = cluster.port_dir(port).join(table_file_name(plan.index));
            let summary = HeapWriteOptions::new(plan.field_count)
                .with_page_size(page_size)
                .write(batch, &path)
                .map_err(|e| e.with_context(format!("writing {}", path.display())))?;
            progress.inc(1);
            Ok(WrittenFile {
                table: plan.name.clone(),
                port,
                path,
                summary,
            })
        })
        .collect::<HeapResult<Vec<_>>>()?;

    cluster.write_catalogs(
        &plans
            .iter()
            .map(|plan| (plan.index, plan.field_count))
            .collect_vec(),
    )?;
    let addresses = cluster.write_address_list()?;
    info!(
        "wrote {} heap files for {} nodes, address list at {}",
        files.len(),
        cluster.nodes(),
        addresses.display()
    );

    Ok(files)
}

/// Generates every table of `config`, plans its partitions and writes the cluster under `root`.
pub fn generate(
    config: &BenchmarkConfig,
    root: &Path,
    progress: &ProgressBar,
) -> HeapResult<Vec<WrittenFile>> {
    let tables = config
        .tables
        .par_iter()
        .enumerate()
        .map(|(index, table)| {
            let mut rng = rng_for(config.seed, index, Stream::Generate);
            let batch = table.dataset.generate(&mut rng)?;
            info!("generated {} tuples from {}", batch.len(), table.dataset.name());
            let sizes = table.partitioning.sizes(batch.len())?;
            Ok(TableInput::new(batch, sizes).with_field_count(table.dataset.num_fields()))
        })
        .collect::<HeapResult<Vec<_>>>()?;

    let plans = PartitionPlanner::new(config.randomize, config.seed).plan(tables)?;
    let nodes = plans.first().map_or(0, |plan| plan.partitions.len());
    let cluster = ClusterLayout::try_new(root, &config.cluster, nodes)?;
    write_benchmark(&plans, &cluster, config.page_size, progress)
}
