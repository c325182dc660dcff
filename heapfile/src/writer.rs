use std::io::{BufWriter, Write};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use heapfile_error::HeapResult;
use log::{debug, info};

use crate::layout::{DEFAULT_PAGE_SIZE, PageLayout};
use crate::page::PageEncoder;
use crate::tuple::TupleBatch;

/// Counts describing a heap file that was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteSummary {
    /// Slots written, present or absent.
    pub tuple_count: usize,
    pub present_count: usize,
    pub page_count: usize,
    pub bytes_written: u64,
}

/// Configures how a [`TupleBatch`] is encoded into a heap file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapWriteOptions {
    field_count: usize,
    page_size: usize,
}

impl HeapWriteOptions {
    pub fn new(field_count: usize) -> Self {
        Self {
            field_count,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn field_count(&self) -> usize {
        self.field_count
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn layout(&self) -> HeapResult<PageLayout> {
        PageLayout::try_new(self.field_count, self.page_size)
    }

    /// Writes `batch` as a heap file at `path`, replacing any file already there.
    ///
    /// Pages go to a temporary file next to `path` that is renamed over it once every page has
    /// been flushed. If encoding fails nothing is left at `path`, or the previous file is
    /// left untouched.
    pub fn write(&self, batch: &TupleBatch, path: impl AsRef<Path>) -> HeapResult<WriteSummary> {
        let path = path.as_ref();
        let layout = self.layout()?;
        batch.validate(self.field_count)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut builder = tempfile::Builder::new();
        builder.prefix(".heapfile-").suffix(".tmp");
        // Readable by everyone, subject to the umask, like a plain `File::create`.
        #[cfg(unix)]
        builder.permissions(std::fs::Permissions::from_mode(0o644));
        let mut temp = builder.tempfile_in(dir)?;
        let summary = write_pages(batch, layout, temp.as_file_mut())?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;

        info!(
            "Created heap file at {} with {} tuples each with {} fields ({} pages)",
            path.display(),
            summary.tuple_count,
            self.field_count,
            summary.page_count
        );
        Ok(summary)
    }

    /// Writes `batch` as heap file pages to `write`.
    pub fn write_to<W: Write>(&self, batch: &TupleBatch, write: W) -> HeapResult<WriteSummary> {
        let layout = self.layout()?;
        batch.validate(self.field_count)?;
        write_pages(batch, layout, write)
    }

    /// Encodes `batch` into an in-memory heap file.
    pub fn write_to_vec(&self, batch: &TupleBatch) -> HeapResult<Vec<u8>> {
        let layout = self.layout()?;
        let capacity = usize::try_from(layout.file_size(batch.len())).unwrap_or(0);
        let mut bytes = Vec::with_capacity(capacity);
        self.write_to(batch, &mut bytes)?;
        Ok(bytes)
    }
}

/// Writes `batch` to a heap file at `path` with `field_count` fields per tuple and pages of
/// `page_size` bytes.
pub fn encode(
    batch: &TupleBatch,
    field_count: usize,
    page_size: usize,
    path: impl AsRef<Path>,
) -> HeapResult<WriteSummary> {
    HeapWriteOptions::new(field_count)
        .with_page_size(page_size)
        .write(batch, path)
}

fn write_pages<W: Write>(
    batch: &TupleBatch,
    layout: PageLayout,
    write: W,
) -> HeapResult<WriteSummary> {
    let mut writer = BufWriter::with_capacity(layout.page_size().max(8 * 1024), write);
    let mut encoder = PageEncoder::new(layout);
    let mut summary = WriteSummary {
        tuple_count: batch.len(),
        present_count: batch.present_count(),
        ..Default::default()
    };

    for (page_index, page) in batch.pages(&layout).enumerate() {
        writer.write_all(encoder.encode(page_index, page)?)?;
        summary.page_count += 1;
        summary.bytes_written += layout.page_size() as u64;
    }
    writer.flush()?;

    debug!(
        "encoded {} slots into {} pages of {} bytes ({} slots per page, {} header bytes)",
        summary.tuple_count,
        summary.page_count,
        layout.page_size(),
        layout.tuples_per_page(),
        layout.header_size()
    );
    Ok(summary)
}
