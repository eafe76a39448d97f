//! Notebook serialization strategies.
//!
//! - [`StructuredWriter`]: validates the document like a notebook library
//!   would, then writes the canonical layout (sorted keys, one-space indent).
//! - [`PlainWriter`]: direct structural JSON of the same shape, no checks.
//! - [`FallbackWriter`]: tries one writer and transparently uses another on
//!   failure.
//!
//! Writers render into memory; [`write_notebook`] then writes the file in one
//! call, so a failed render never leaves a partial file behind.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::{Value, json};
use tracing::{debug, warn};

use notebookify_shared::{
    CellKind, NBFORMAT, NBFORMAT_MINOR, Notebook, NotebookCell, NotebookError, Result,
    WriterStrategy,
};

/// Serializes a notebook to bytes.
pub trait NotebookWriter {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Render the notebook as a UTF-8 JSON document.
    fn render(&self, notebook: &Notebook) -> Result<Vec<u8>>;
}

/// Writer for a configured strategy.
pub fn writer_for(strategy: WriterStrategy) -> Box<dyn NotebookWriter> {
    match strategy {
        WriterStrategy::Auto => Box::new(FallbackWriter::new(
            Box::new(StructuredWriter),
            Box::new(PlainWriter),
        )),
        WriterStrategy::Structured => Box::new(StructuredWriter),
        WriterStrategy::Plain => Box::new(PlainWriter),
    }
}

/// Render `notebook` with `writer` and write it to `path`.
pub fn write_notebook(path: &Path, notebook: &Notebook, writer: &dyn NotebookWriter) -> Result<()> {
    let bytes = writer.render(notebook)?;
    std::fs::write(path, &bytes).map_err(|e| NotebookError::io(path, e))?;
    debug!(path = %path.display(), writer = writer.name(), bytes = bytes.len(), "wrote notebook");
    Ok(())
}

// ---------------------------------------------------------------------------
// Structured writer
// ---------------------------------------------------------------------------

/// Allowed cell id shape for nbformat 4.5.
static CELL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{1,64}$").expect("cell id regex"));

/// Validating writer producing the canonical notebook layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredWriter;

impl StructuredWriter {
    /// Check the structural rules a notebook reader enforces.
    pub fn validate(notebook: &Notebook) -> Result<()> {
        if (notebook.nbformat, notebook.nbformat_minor) != (NBFORMAT, NBFORMAT_MINOR) {
            return Err(NotebookError::validation(format!(
                "unsupported notebook format {}.{} (expected {NBFORMAT}.{NBFORMAT_MINOR})",
                notebook.nbformat, notebook.nbformat_minor
            )));
        }

        let kernelspec = &notebook.metadata.kernelspec;
        if kernelspec.name.is_empty() || kernelspec.display_name.is_empty() {
            return Err(NotebookError::validation(
                "kernelspec requires a name and display_name",
            ));
        }

        let mut seen = HashSet::with_capacity(notebook.cells.len());
        for cell in &notebook.cells {
            let id = cell.id();
            if !CELL_ID_RE.is_match(id) {
                return Err(NotebookError::validation(format!("invalid cell id '{id}'")));
            }
            if !seen.insert(id) {
                return Err(NotebookError::validation(format!("duplicate cell id '{id}'")));
            }
        }
        Ok(())
    }
}

impl NotebookWriter for StructuredWriter {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn render(&self, notebook: &Notebook) -> Result<Vec<u8>> {
        Self::validate(notebook)?;

        let value = serde_json::to_value(notebook)
            .map_err(|e| NotebookError::Serialization(e.to_string()))?;
        check_cell_types(&value)?;

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        SortedKeys(&value)
            .serialize(&mut ser)
            .map_err(|e| NotebookError::Serialization(e.to_string()))?;
        buf.push(b'\n');
        Ok(buf)
    }
}

/// Every serialized cell must carry a known `cell_type`.
fn check_cell_types(document: &Value) -> Result<()> {
    let cells = document["cells"].as_array().map(Vec::as_slice).unwrap_or_default();
    for cell in cells {
        let tag = cell["cell_type"].as_str().unwrap_or_default();
        tag.parse::<CellKind>()?;
    }
    Ok(())
}

/// Serializes a JSON value with object keys in sorted order at every depth,
/// whatever map type `serde_json` was built with.
struct SortedKeys<'a>(&'a Value);

impl Serialize for SortedKeys<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| (key, SortedKeys(value)))
                .collect::<BTreeMap<_, _>>()
                .serialize(serializer),
            Value::Array(items) => serializer.collect_seq(items.iter().map(SortedKeys)),
            other => other.serialize(serializer),
        }
    }
}

// ---------------------------------------------------------------------------
// Plain writer
// ---------------------------------------------------------------------------

/// Direct structural serialization, independent of the typed model's serde
/// derives.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainWriter;

impl PlainWriter {
    fn document(notebook: &Notebook) -> Value {
        let kernelspec = &notebook.metadata.kernelspec;
        json!({
            "cells": notebook.cells.iter().map(Self::cell).collect::<Vec<_>>(),
            "metadata": {
                "kernelspec": {
                    "name": kernelspec.name,
                    "language": kernelspec.language,
                    "display_name": kernelspec.display_name,
                },
                "language_info": {
                    "name": notebook.metadata.language_info.name,
                },
            },
            "nbformat": notebook.nbformat,
            "nbformat_minor": notebook.nbformat_minor,
        })
    }

    fn cell(cell: &NotebookCell) -> Value {
        match cell {
            NotebookCell::Markdown {
                id,
                metadata,
                source,
            } => json!({
                "cell_type": "markdown",
                "id": id,
                "metadata": { "language": metadata.language, "id": metadata.id },
                "source": source,
            }),
            NotebookCell::Code {
                id,
                metadata,
                execution_count,
                outputs,
                source,
            } => json!({
                "cell_type": "code",
                "id": id,
                "metadata": { "language": metadata.language, "id": metadata.id },
                "execution_count": execution_count,
                "outputs": outputs,
                "source": source,
            }),
        }
    }
}

impl NotebookWriter for PlainWriter {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn render(&self, notebook: &Notebook) -> Result<Vec<u8>> {
        let mut buf = serde_json::to_vec_pretty(&Self::document(notebook))
            .map_err(|e| NotebookError::Serialization(e.to_string()))?;
        buf.push(b'\n');
        Ok(buf)
    }
}

// ---------------------------------------------------------------------------
// Fallback writer
// ---------------------------------------------------------------------------

/// Uses `primary`, switching to `fallback` when it fails.
pub struct FallbackWriter {
    primary: Box<dyn NotebookWriter>,
    fallback: Box<dyn NotebookWriter>,
}

impl FallbackWriter {
    pub fn new(primary: Box<dyn NotebookWriter>, fallback: Box<dyn NotebookWriter>) -> Self {
        Self { primary, fallback }
    }
}

impl NotebookWriter for FallbackWriter {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn render(&self, notebook: &Notebook) -> Result<Vec<u8>> {
        match self.primary.render(notebook) {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                warn!(
                    writer = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %e,
                    "notebook writer failed, using fallback"
                );
                self.fallback.render(notebook)
            }
        }
    }
}
