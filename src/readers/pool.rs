use crate::error::Result;
use crate::utils::filename::has_image_extension;
use std::path::{Path, PathBuf};
use tracing::warn;

/// List the image files in a pool directory, sorted by filename.
///
/// A missing pool is logged and treated as empty; downstream stages are
/// expected to tolerate partially-built pipelines.
pub fn list_pool(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        warn!(pool = %dir.display(), "pool directory does not exist");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_image_extension(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Filenames (not paths) of a pool's images, sorted.
pub fn pool_filenames(dir: &Path) -> Result<Vec<String>> {
    Ok(list_pool(dir)?
        .into_iter()
        .filter_map(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
        })
        .collect())
}
