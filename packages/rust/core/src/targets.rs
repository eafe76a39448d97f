//! Input discovery and output placement.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use notebookify_shared::{ConvertConfig, NotebookError, Result};

/// Extension of written notebooks.
pub const NOTEBOOK_EXTENSION: &str = "ipynb";

/// Collect the scripts to convert under `path`, sorted.
///
/// A file is returned as is when it has the expected extension and rejected
/// otherwise. In a directory, non-matching files are skipped silently;
/// without `recursive`, only direct children are considered and hidden
/// entries are ignored.
pub fn collect_targets(path: &Path, extension: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(NotebookError::NotFound {
            path: path.to_path_buf(),
        });
    }

    if path.is_file() {
        if !has_extension(path, extension) {
            return Err(NotebookError::UnsupportedInput {
                path: path.to_path_buf(),
                expected: extension.to_string(),
            });
        }
        return Ok(vec![path.to_path_buf()]);
    }

    let mut targets = if recursive {
        walk_recursive(path, extension)
    } else {
        list_children(path, extension)?
    };
    targets.sort();

    debug!(path = %path.display(), count = targets.len(), recursive, "collected targets");

    if targets.is_empty() {
        return Err(NotebookError::NoInputs {
            path: path.to_path_buf(),
            extension: extension.to_string(),
        });
    }
    Ok(targets)
}

fn list_children(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| NotebookError::io(dir, e))?;

    let mut targets = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| NotebookError::io(dir, e))?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_file() && has_extension(&path, extension) {
            targets.push(path);
        }
    }
    Ok(targets)
}

fn walk_recursive(dir: &Path, extension: &str) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && has_extension(entry.path(), extension))
        .map(|entry| entry.into_path())
        .collect()
}

/// Case-insensitive extension check; `extension` has no leading dot.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
}

/// Where notebooks go: the configured directory, or a sibling folder named
/// `output_dir_name` (inside a directory input, next to a file input).
pub fn resolve_output_dir(input: &Path, config: &ConvertConfig) -> PathBuf {
    if let Some(dir) = &config.output_dir {
        return dir.clone();
    }
    let base = if input.is_dir() {
        input
    } else {
        input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    };
    base.join(&config.output_dir_name)
}

/// Create the output directory (and parents).
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| NotebookError::output_dir(dir, e))?;
    debug!(path = %dir.display(), "output directory ready");
    Ok(())
}

/// Output path for `target`, keeping its subdirectory relative to `root`.
pub fn output_path(target: &Path, root: &Path, output_dir: &Path) -> PathBuf {
    let relative = target
        .parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .unwrap_or(Path::new(""));

    let mut name: OsString = target.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(NOTEBOOK_EXTENSION);

    output_dir.join(relative).join(name)
}
