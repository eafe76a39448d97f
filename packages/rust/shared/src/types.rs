//! Core document types for notebookify.

use serde::{Deserialize, Serialize};

use crate::error::NotebookError;

/// Major notebook format version written by notebookify.
pub const NBFORMAT: u32 = 4;

/// Minor notebook format version (4.5 introduced cell ids).
pub const NBFORMAT_MINOR: u32 = 5;

// ---------------------------------------------------------------------------
// CellKind
// ---------------------------------------------------------------------------

/// The type tag of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Code,
    Markdown,
}

impl CellKind {
    /// The tag as it appears in the notebook document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Markdown => "markdown",
        }
    }
}

impl std::fmt::Display for CellKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CellKind {
    type Err = NotebookError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "code" => Ok(Self::Code),
            "markdown" => Ok(Self::Markdown),
            other => Err(NotebookError::validation(format!(
                "unknown cell type '{other}': expected 'code' or 'markdown'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// SourceCell
// ---------------------------------------------------------------------------

/// A contiguous run of script lines sharing one type, as produced by the splitter.
///
/// Lines carry no trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCell {
    pub kind: CellKind,
    pub lines: Vec<String>,
}

impl SourceCell {
    pub fn new(kind: CellKind, lines: Vec<String>) -> Self {
        Self { kind, lines }
    }

    /// True when no line has non-whitespace content.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Notebook document
// ---------------------------------------------------------------------------

/// Per-cell metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellMetadata {
    /// `markdown` for markdown cells, the kernel language for code cells.
    pub language: String,
    /// Short cell identifier (mirrors the cell's top-level `id`).
    pub id: String,
}

/// A single notebook cell, tagged by `cell_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum NotebookCell {
    Markdown {
        id: String,
        metadata: CellMetadata,
        source: Vec<String>,
    },
    Code {
        id: String,
        metadata: CellMetadata,
        /// Always `null`: cells are never executed.
        execution_count: Option<u32>,
        outputs: Vec<serde_json::Value>,
        source: Vec<String>,
    },
}

impl NotebookCell {
    pub fn kind(&self) -> CellKind {
        match self {
            Self::Markdown { .. } => CellKind::Markdown,
            Self::Code { .. } => CellKind::Code,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Markdown { id, .. } | Self::Code { id, .. } => id,
        }
    }

    pub fn metadata(&self) -> &CellMetadata {
        match self {
            Self::Markdown { metadata, .. } | Self::Code { metadata, .. } => metadata,
        }
    }

    /// Source lines, each terminated with `\n`.
    pub fn source(&self) -> &[String] {
        match self {
            Self::Markdown { source, .. } | Self::Code { source, .. } => source,
        }
    }
}

/// `metadata.kernelspec`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelSpec {
    pub name: String,
    pub language: String,
    pub display_name: String,
}

/// `metadata.language_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
}

/// Document-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookMetadata {
    pub kernelspec: KernelSpec,
    pub language_info: LanguageInfo,
}

impl Default for NotebookMetadata {
    fn default() -> Self {
        Self {
            kernelspec: KernelSpec {
                name: "python3".into(),
                language: "python".into(),
                display_name: "Python 3".into(),
            },
            language_info: LanguageInfo {
                name: "python".into(),
            },
        }
    }
}

/// Root structure of an `.ipynb` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<NotebookCell>,
    pub metadata: NotebookMetadata,
    pub nbformat: u32,
    pub nbformat_minor: u32,
}

impl Notebook {
    /// An empty notebook at the current format version.
    pub fn new(metadata: NotebookMetadata) -> Self {
        Self {
            cells: Vec::new(),
            metadata,
            nbformat: NBFORMAT,
            nbformat_minor: NBFORMAT_MINOR,
        }
    }

    /// Number of cells of the given kind.
    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|c| c.kind() == kind).count()
    }

    /// The language cells of the given kind are tagged with.
    pub fn cell_language(&self, kind: CellKind) -> &str {
        match kind {
            CellKind::Markdown => "markdown",
            CellKind::Code => &self.metadata.kernelspec.language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_cell(id: &str, line: &str) -> NotebookCell {
        NotebookCell::Code {
            id: id.into(),
            metadata: CellMetadata {
                language: "python".into(),
                id: id.into(),
            },
            execution_count: None,
            outputs: vec![],
            source: vec![format!("{line}\n")],
        }
    }

    #[test]
    fn cell_kind_parses_known_tags() {
        assert_eq!("code".parse::<CellKind>().unwrap(), CellKind::Code);
        assert_eq!("markdown".parse::<CellKind>().unwrap(), CellKind::Markdown);
    }

    #[test]
    fn cell_kind_rejects_unknown_tag() {
        let err = "raw".parse::<CellKind>().unwrap_err();
        assert!(err.to_string().contains("unknown cell type 'raw'"));
    }

    #[test]
    fn code_cell_serializes_unexecuted_state() {
        let json = serde_json::to_value(code_cell("0a1b2c3d", "x = 1")).expect("serialize");
        assert_eq!(json["cell_type"], "code");
        assert_eq!(json["id"], "0a1b2c3d");
        assert_eq!(json["metadata"]["language"], "python");
        assert_eq!(json["metadata"]["id"], "0a1b2c3d");
        assert!(json["execution_count"].is_null());
        assert_eq!(json["outputs"], serde_json::json!([]));
        assert_eq!(json["source"], serde_json::json!(["x = 1\n"]));
    }

    #[test]
    fn markdown_cell_has_no_execution_fields() {
        let cell = NotebookCell::Markdown {
            id: "ffff0000".into(),
            metadata: CellMetadata {
                language: "markdown".into(),
                id: "ffff0000".into(),
            },
            source: vec!["# Title\n".into()],
        };
        let json = serde_json::to_value(&cell).expect("serialize");
        assert_eq!(json["cell_type"], "markdown");
        assert!(json.get("execution_count").is_none());
        assert!(json.get("outputs").is_none());
    }

    #[test]
    fn notebook_roundtrip_keeps_cells_in_order() {
        let mut nb = Notebook::new(NotebookMetadata::default());
        nb.cells.push(code_cell("00000001", "a = 1"));
        nb.cells.push(code_cell("00000002", "b = 2"));

        let json = serde_json::to_string(&nb).expect("serialize");
        let parsed: Notebook = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, nb);
        assert_eq!(parsed.nbformat, 4);
        assert_eq!(parsed.nbformat_minor, 5);
        assert_eq!(parsed.cells[1].id(), "00000002");
        assert_eq!(parsed.count(CellKind::Code), 2);
        assert_eq!(parsed.count(CellKind::Markdown), 0);
    }

    #[test]
    fn source_cell_blankness() {
        let blank = SourceCell::new(CellKind::Code, vec!["".into(), "   \t".into()]);
        assert!(blank.is_blank());

        let filled = SourceCell::new(CellKind::Markdown, vec!["".into(), "text".into()]);
        assert!(!filled.is_blank());
    }
}
