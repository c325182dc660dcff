//! On-disk layout of a simulated cluster: one directory per node under `child/`, plus the
//! coordinator's `head/` directory holding the node address list.
//!
//! ```text
//! <root>/
//!   child/<unpartitioned_port>/{catalog.txt, test.0.dat, ...}
//!   child/<starting_port + p>/{catalog.txt, test.0.dat, ...}
//!   head/local.txt
//! ```

use std::fs;
use std::iter;
use std::path::PathBuf;

use heapfile_error::{HeapExpect, HeapResult, heap_bail};
use itertools::Itertools;
use tracing::info;

use crate::config::ClusterConfig;
use crate::utils::{clear_dir, ensure_dir};

pub const CATALOG_FILE: &str = "catalog.txt";
pub const ADDRESS_LIST_FILE: &str = "local.txt";

/// The name a table is registered under in every catalog.
pub fn table_name(table: usize) -> String {
    format!("test.{table}")
}

pub fn table_file_name(table: usize) -> String {
    format!("{}.dat", table_name(table))
}

/// A catalog entry such as `test.0 (f1 int, f2 int)`.
pub fn catalog_line(table: usize, field_count: usize) -> String {
    format!(
        "{} ({})",
        table_name(table),
        (1..=field_count).map(|f| format!("f{f} int")).join(", ")
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterLayout {
    root: PathBuf,
    host: String,
    starting_port: u16,
    unpartitioned_port: u16,
    nodes: usize,
}

impl ClusterLayout {
    /// Checks that `nodes` ports starting at `starting_port` fit and don't collide with the
    /// unpartitioned node.
    pub fn try_new(
        root: impl Into<PathBuf>,
        config: &ClusterConfig,
        nodes: usize,
    ) -> HeapResult<Self> {
        let last = match nodes.checked_sub(1) {
            None => Some(config.starting_port),
            Some(offset) => u16::try_from(offset)
                .ok()
                .and_then(|offset| config.starting_port.checked_add(offset)),
        };
        let Some(last) = last else {
            heap_bail!(
                InvalidConfig: "{nodes} nodes starting at port {} run past port 65535",
                config.starting_port
            );
        };
        if nodes > 0 && (config.starting_port..=last).contains(&config.unpartitioned_port) {
            heap_bail!(
                InvalidConfig: "unpartitioned port {} overlaps node ports {}..={last}",
                config.unpartitioned_port,
                config.starting_port
            );
        }

        Ok(Self {
            root: root.into(),
            host: config.host.clone(),
            starting_port: config.starting_port,
            unpartitioned_port: config.unpartitioned_port,
            nodes,
        })
    }

    pub fn nodes(&self) -> usize {
        self.nodes
    }

    pub fn child_dir(&self) -> PathBuf {
        self.root.join("child")
    }

    pub fn head_dir(&self) -> PathBuf {
        self.root.join("head")
    }

    /// Port of node `node`. Callers stay below [`Self::nodes`], which `try_new` checked fits.
    pub fn node_port(&self, node: usize) -> u16 {
        u16::try_from(node)
            .ok()
            .and_then(|offset| self.starting_port.checked_add(offset))
            .heap_expect("node index past the last valid port")
    }

    pub fn unpartitioned_port(&self) -> u16 {
        self.unpartitioned_port
    }

    pub fn port_dir(&self, port: u16) -> PathBuf {
        self.child_dir().join(port.to_string())
    }

    pub fn node_dir(&self, node: usize) -> PathBuf {
        self.port_dir(self.node_port(node))
    }

    pub fn unpartitioned_dir(&self) -> PathBuf {
        self.port_dir(self.unpartitioned_port)
    }

    /// Every port that receives files, the unpartitioned pseudo-node first.
    pub fn ports(&self) -> impl Iterator<Item = u16> + '_ {
        iter::once(self.unpartitioned_port).chain((0..self.nodes).map(|n| self.node_port(n)))
    }

    pub fn address_list_path(&self) -> PathBuf {
        self.head_dir().join(ADDRESS_LIST_FILE)
    }

    /// `host:port` of every partition node, in node order.
    pub fn addresses(&self) -> Vec<String> {
        (0..self.nodes)
            .map(|n| format!("{}:{}", self.host, self.node_port(n)))
            .collect()
    }

    /// Empties `child/` and creates the per-port directories and `head/`.
    pub fn reset(&self) -> HeapResult<()> {
        clear_dir(&self.child_dir())?;
        for port in self.ports() {
            ensure_dir(&self.port_dir(port))?;
        }
        ensure_dir(&self.head_dir())?;
        info!("reset cluster layout under {}", self.root.display());
        Ok(())
    }

    pub fn write_address_list(&self) -> HeapResult<PathBuf> {
        let path = self.address_list_path();
        fs::write(&path, lines(self.addresses()))?;
        Ok(path)
    }

    /// Writes `catalog.txt` into every port directory, one line per `(table, field_count)`.
    pub fn write_catalogs(&self, tables: &[(usize, usize)]) -> HeapResult<()> {
        let catalog = lines(tables.iter().map(|&(t, f)| catalog_line(t, f)));
        for port in self.ports() {
            fs::write(self.port_dir(port).join(CATALOG_FILE), &catalog)?;
        }
        Ok(())
    }
}

fn lines(lines: impl IntoIterator<Item = String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}
