//! Batch conversion: path → targets → notebooks on disk.
//!
//! Per-file failures are logged and recorded in the [`BatchReport`]; they
//! never stop the remaining files. Only planning errors (missing input, no
//! targets, uncreatable output directory) abort a batch.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, error, info, instrument};

use notebookify_notebook::{
    IdGenerator, NotebookWriter, RandomIds, convert_source, write_notebook, writer_for,
};
use notebookify_shared::{CellKind, ConvertConfig, NotebookError, NotebookMetadata, Result};

use crate::targets::{collect_targets, output_path, prepare_output_dir, resolve_output_dir};

/// Resolved inputs and destination of a batch.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    /// Directory relative output paths are computed from.
    pub root: PathBuf,
    /// Scripts to convert, sorted.
    pub targets: Vec<PathBuf>,
    /// Directory notebooks are written to (already created).
    pub output_dir: PathBuf,
}

/// A successfully converted script.
#[derive(Debug, Clone)]
pub struct ConvertedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    pub code_cells: usize,
    pub markdown_cells: usize,
}

/// A script that failed to convert.
#[derive(Debug)]
pub struct FailedFile {
    pub input: PathBuf,
    pub error: NotebookError,
}

/// Outcome of a batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<ConvertedFile>,
    pub failed: Vec<FailedFile>,
    pub elapsed: std::time::Duration,
}

impl BatchReport {
    /// True when at least one file converted.
    pub fn any_converted(&self) -> bool {
        !self.converted.is_empty()
    }

    /// Number of files attempted.
    pub fn total(&self) -> usize {
        self.converted.len() + self.failed.len()
    }
}

/// Progress callback for reporting batch status.
pub trait ProgressReporter: Send + Sync {
    /// Called once targets are known.
    fn started(&self, total: usize);
    /// Called after each successful conversion.
    fn converted(&self, file: &ConvertedFile, current: usize, total: usize);
    /// Called after each failed conversion.
    fn failed(&self, input: &Path, error: &NotebookError, current: usize, total: usize);
    /// Called when the batch completes.
    fn done(&self, report: &BatchReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn started(&self, _total: usize) {}
    fn converted(&self, _file: &ConvertedFile, _current: usize, _total: usize) {}
    fn failed(&self, _input: &Path, _error: &NotebookError, _current: usize, _total: usize) {}
    fn done(&self, _report: &BatchReport) {}
}

/// Resolve targets, then create the output directory.
///
/// Target errors come first, so a missing input never creates a folder.
#[instrument(skip(config), fields(recursive = config.recursive))]
pub fn plan(input: &Path, config: &ConvertConfig) -> Result<BatchPlan> {
    let targets = collect_targets(input, &config.extension, config.recursive)?;
    let output_dir = resolve_output_dir(input, config);
    prepare_output_dir(&output_dir)?;

    let root = if input.is_dir() {
        input.to_path_buf()
    } else {
        input.parent().map(Path::to_path_buf).unwrap_or_default()
    };

    Ok(BatchPlan {
        root,
        targets,
        output_dir,
    })
}

/// Convert every target of `plan`.
#[instrument(skip_all, fields(targets = plan.targets.len(), out = %plan.output_dir.display()))]
pub fn run_batch(
    plan: &BatchPlan,
    config: &ConvertConfig,
    ids: &mut dyn IdGenerator,
    progress: &dyn ProgressReporter,
) -> BatchReport {
    let start = Instant::now();
    let writer = writer_for(config.writer);
    let total = plan.targets.len();
    let mut report = BatchReport::default();

    progress.started(total);

    for (index, input) in plan.targets.iter().enumerate() {
        let output = output_path(input, &plan.root, &plan.output_dir);
        match convert_file(input, &output, &config.metadata, writer.as_ref(), ids) {
            Ok(file) => {
                progress.converted(&file, index + 1, total);
                report.converted.push(file);
            }
            Err(e) => {
                error!(path = %input.display(), error = %e, "failed to convert");
                progress.failed(input, &e, index + 1, total);
                report.failed.push(FailedFile {
                    input: input.clone(),
                    error: e,
                });
            }
        }
    }

    report.elapsed = start.elapsed();
    info!(
        converted = report.converted.len(),
        failed = report.failed.len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "batch complete"
    );
    progress.done(&report);
    report
}

/// Plan and run a batch with random cell ids.
pub fn convert_path(
    input: &Path,
    config: &ConvertConfig,
    progress: &dyn ProgressReporter,
) -> Result<BatchReport> {
    let plan = plan(input, config)?;
    Ok(run_batch(&plan, config, &mut RandomIds, progress))
}

/// Convert one script into a notebook at `output`.
pub fn convert_file(
    input: &Path,
    output: &Path,
    metadata: &NotebookMetadata,
    writer: &dyn NotebookWriter,
    ids: &mut dyn IdGenerator,
) -> Result<ConvertedFile> {
    let source = std::fs::read_to_string(input).map_err(|e| NotebookError::io(input, e))?;
    let notebook = convert_source(&source, metadata, ids);

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| NotebookError::io(parent, e))?;
    }
    write_notebook(output, &notebook, writer)?;

    let file = ConvertedFile {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        code_cells: notebook.count(CellKind::Code),
        markdown_cells: notebook.count(CellKind::Markdown),
    };
    debug!(
        input = %file.input.display(),
        output = %file.output.display(),
        code = file.code_cells,
        markdown = file.markdown_cells,
        "converted"
    );
    Ok(file)
}
