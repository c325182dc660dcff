use std::fs::{self, create_dir_all};
use std::io;
use std::path::{Path, PathBuf};

use heapfile_error::{HeapError, HeapResult};
use tracing::debug;

fn cleanup_failed(path: &Path) -> impl FnOnce(io::Error) -> HeapError {
    let path = path.to_path_buf();
    move |source| HeapError::CleanupFailed { path, source }
}

/// Deletes everything inside `dir`, recursively, and leaves `dir` itself in place.
///
/// A missing `dir` is created. Any failure is reported as [`HeapError::CleanupFailed`]
/// naming the path that could not be removed.
pub fn clear_dir(dir: &Path) -> HeapResult<()> {
    if !dir.exists() {
        return create_dir_all(dir).map_err(cleanup_failed(dir));
    }

    for entry in fs::read_dir(dir).map_err(cleanup_failed(dir))? {
        let path = entry.map_err(cleanup_failed(dir))?.path();
        let file_type = fs::symlink_metadata(&path)
            .map_err(cleanup_failed(&path))?
            .file_type();
        if file_type.is_dir() {
            fs::remove_dir_all(&path).map_err(cleanup_failed(&path))?;
        } else {
            fs::remove_file(&path).map_err(cleanup_failed(&path))?;
        }
        debug!("removed {}", path.display());
    }
    Ok(())
}

/// Creates `dir` and its parents if they don't already exist.
pub fn ensure_dir(dir: &Path) -> HeapResult<PathBuf> {
    if !dir.exists() {
        create_dir_all(dir)?;
    }
    Ok(dir.to_path_buf())
}
