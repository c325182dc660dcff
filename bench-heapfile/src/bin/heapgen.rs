use std::path::PathBuf;

use anyhow::{Context, bail};
use bench_heapfile::datasets::{TupleSource, UniformInts};
use bench_heapfile::display::render_summary;
use bench_heapfile::utils::{default_env_filter, setup_logger};
use bench_heapfile::{BenchmarkConfig, Preset, feature_flagged_allocator, generate};
use clap::{Parser, Subcommand};
use heapfile::{DEFAULT_PAGE_SIZE, HeapWriteOptions};
use humansize::{DECIMAL, format_size};
use indicatif::ProgressBar;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

feature_flagged_allocator!();

#[derive(Parser, Debug)]
#[command(version, about = "Generate heap file benchmark data", long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a partitioned benchmark from a preset or a JSON config.
    Generate {
        #[arg(long, value_enum, conflicts_with = "config", required_unless_present = "config")]
        preset: Option<Preset>,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(short, long, default_value = "benchmark")]
        output_dir: PathBuf,
        /// Overrides the seed of the preset or config.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        page_size: Option<usize>,
        /// Keep tables in generation order when partitioning.
        #[arg(long)]
        no_shuffle: bool,
        #[arg(short, long)]
        threads: Option<usize>,
    },
    /// Write one heap file of uniformly random tuples.
    Single {
        #[arg(long)]
        fields: usize,
        #[arg(long)]
        tuples: usize,
        #[arg(long, default_value_t = 0)]
        low: i32,
        #[arg(long, default_value_t = UniformInts::DEFAULT_HIGH)]
        high: i32,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
        path: PathBuf,
    },
    /// Print the JSON config of a preset, as a starting point for custom benchmarks.
    ShowPreset {
        #[arg(value_enum)]
        preset: Preset,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logger(default_env_filter(cli.verbose))?;

    match cli.command {
        Command::Generate {
            preset,
            config,
            output_dir,
            seed,
            page_size,
            no_shuffle,
            threads,
        } => {
            let mut config = match (preset, config) {
                (Some(preset), _) => preset.config(),
                (None, Some(path)) => BenchmarkConfig::from_path(&path)?,
                (None, None) => bail!("either --preset or --config is required"),
            };
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if let Some(page_size) = page_size {
                config.page_size = page_size;
            }
            if no_shuffle {
                config.randomize = false;
            }
            run_generate(&config, output_dir, threads)
        }
        Command::Single {
            fields,
            tuples,
            low,
            high,
            seed,
            page_size,
            path,
        } => {
            let source = UniformInts::new(tuples, fields, low, high);
            let batch = source.generate(&mut StdRng::seed_from_u64(seed))?;
            let summary = HeapWriteOptions::new(fields)
                .with_page_size(page_size)
                .write(&batch, &path)?;
            println!(
                "{}: {} tuples in {} pages ({})",
                path.display(),
                summary.tuple_count,
                summary.page_count,
                format_size(summary.bytes_written, DECIMAL)
            );
            Ok(())
        }
        Command::ShowPreset { preset } => {
            println!("{}", preset.config().to_json_pretty()?);
            Ok(())
        }
    }
}

fn run_generate(
    config: &BenchmarkConfig,
    output_dir: PathBuf,
    threads: Option<usize>,
) -> anyhow::Result<()> {
    match threads {
        Some(0) => bail!("can't generate with 0 threads"),
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("building the rayon thread pool")?,
        None => {}
    }

    info!(
        "generating {} tables into {}",
        config.tables.len(),
        output_dir.display()
    );
    let progress = ProgressBar::new(0);
    let files = generate(config, &output_dir, &progress)?;
    progress.finish();

    println!("{}", render_summary(&files));
    Ok(())
}
