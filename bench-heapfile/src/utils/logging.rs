use std::io::IsTerminal;

use itertools::Itertools;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Crates whose records pass the default filter. Everything else is held to WARN.
const LOGGED_CRATES: [&str; 3] = ["heapfile", "bench_heapfile", "heapgen"];

/// Installs the global subscriber, writing to stderr so stdout stays free for summaries.
///
/// Records from the `log` facade, which the encoder logs through, are forwarded as well.
pub fn setup_logger(filter: EnvFilter) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_level(true)
        .with_line_number(true)
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

/// `RUST_LOG` wins when set; otherwise our crates log at INFO, or TRACE when verbose.
pub fn default_env_filter(is_verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = if is_verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(
            LOGGED_CRATES
                .iter()
                .map(|krate| format!("{krate}={level}"))
                .join(","),
        )
}
