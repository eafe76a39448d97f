//! Batch orchestration for notebookify.
//!
//! Ties target discovery, script conversion, and notebook writing together
//! into end-to-end runs (e.g., [`convert_path`]).

pub mod batch;
pub mod targets;

pub use batch::{
    BatchPlan, BatchReport, ConvertedFile, FailedFile, ProgressReporter, SilentProgress,
    convert_file, convert_path, plan, run_batch,
};
pub use notebookify_notebook::{IdGenerator, RandomIds, SequentialIds};
pub use targets::{collect_targets, has_extension, output_path, resolve_output_dir};
