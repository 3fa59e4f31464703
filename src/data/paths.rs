// ============================================================
// Layer 4: Dataset Path Expansion
// ============================================================
// A dataset argument can be any of:
//   - a single file            data/corpus.npz
//   - a directory (recursive)  data/
//   - a glob pattern           data/shard_*.txt
//
// The result is always sorted so the chunk order, and with it
// every seeded sampling run, is reproducible across machines.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expand a dataset path specification into a sorted list of files.
pub fn expand_paths(target: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(target);

    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut paths = if path.is_dir() {
        walk_dir(path)?
    } else {
        glob_files(target)?
    };
    paths.sort();

    if paths.is_empty() {
        bail!("No dataset files matched '{}'", target);
    }

    tracing::debug!("Expanded '{}' to {} file(s)", target, paths.len());
    Ok(paths)
}

/// Every regular file under `root`, following symlinks.
fn walk_dir(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry
            .with_context(|| format!("Cannot walk directory '{}'", root.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Every regular file matching a glob pattern.
fn glob_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in glob::glob(pattern)
        .with_context(|| format!("Invalid dataset glob pattern '{}'", pattern))?
    {
        let path = entry.with_context(|| format!("Cannot read a match of '{}'", pattern))?;
        if path.is_file() {
            files.push(path);
        }
    }

    Ok(files)
}
