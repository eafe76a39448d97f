//! Shared types, error model, and configuration for notebookify.
//!
//! This crate is the foundation depended on by all other notebookify crates.
//! It provides:
//! - [`NotebookError`]: the unified error type
//! - Document types ([`SourceCell`], [`Notebook`], [`NotebookCell`], [`CellKind`])
//! - Configuration ([`AppConfig`], [`ConvertConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ConvertConfig, DefaultsConfig, KernelConfig, WriterStrategy, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{NotebookError, Result};
pub use types::{
    CellKind, CellMetadata, KernelSpec, LanguageInfo, NBFORMAT, NBFORMAT_MINOR, Notebook,
    NotebookCell, NotebookMetadata, SourceCell,
};
