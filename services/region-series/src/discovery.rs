//! Input file discovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;
use walkdir::WalkDir;

/// List the files directly inside `dir` whose names end with `suffix`,
/// sorted by file name.
///
/// Model output names embed their timestamps, so name order is time order.
pub fn discover_files(dir: impl AsRef<Path>, suffix: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    anyhow::ensure!(dir.is_dir(), "Input directory {:?} does not exist", dir);

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to list {:?}", dir))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .file_name()
            .to_str()
            .map(|name| name.ends_with(suffix))
            .unwrap_or(false);

        if matches {
            files.push(entry.into_path());
        }
    }

    debug!(dir = %dir.display(), suffix, count = files.len(), "Discovered input files");
    Ok(files)
}

/// Remove `excluded` from `files`.
///
/// Paths are compared after canonicalisation, so a relative output path
/// still matches the discovered absolute one.
pub fn exclude_file(files: Vec<PathBuf>, excluded: &Path) -> Vec<PathBuf> {
    let excluded = excluded
        .canonicalize()
        .unwrap_or_else(|_| excluded.to_path_buf());

    files
        .into_iter()
        .filter(|path| {
            let same = path.canonicalize().map(|p| p == excluded).unwrap_or(false)
                || path == &excluded;
            if same {
                debug!(path = %path.display(), "Skipping output file in input directory");
            }
            !same
        })
        .collect()
}
