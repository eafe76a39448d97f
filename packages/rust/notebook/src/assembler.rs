//! Notebook assembler.
//!
//! Turns splitter cells into a [`Notebook`]: trims blank edges, drops empty
//! cells, and attaches ids and language metadata.

use tracing::debug;
use uuid::Uuid;

use notebookify_shared::{CellKind, CellMetadata, Notebook, NotebookCell, NotebookMetadata, SourceCell};

/// Length of generated cell ids.
pub const CELL_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// Cell id generation
// ---------------------------------------------------------------------------

/// Source of cell identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random 8-character lowercase hex ids (prefix of a v4 UUID).
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> String {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(CELL_ID_LEN);
        id
    }
}

/// Deterministic ids `00000000`, `00000001`, ... for reproducible output.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u32,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{:08x}", self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Build a notebook from splitter cells.
pub fn assemble(
    cells: &[SourceCell],
    metadata: &NotebookMetadata,
    ids: &mut dyn IdGenerator,
) -> Notebook {
    let mut notebook = Notebook::new(metadata.clone());

    for cell in cells {
        let lines = trim_blank_edges(&cell.lines);
        if lines.is_empty() {
            continue;
        }

        let source = lines.iter().map(|l| format!("{l}\n")).collect();
        let language = notebook.cell_language(cell.kind).to_string();
        notebook
            .cells
            .push(build_cell(cell.kind, source, language, ids.next_id()));
    }

    debug!(
        input_cells = cells.len(),
        cells = notebook.cells.len(),
        "notebook assembled"
    );
    notebook
}

/// Strip leading and trailing whitespace-only lines.
pub fn trim_blank_edges(lines: &[String]) -> &[String] {
    let is_content = |l: &String| !l.trim().is_empty();
    match (
        lines.iter().position(is_content),
        lines.iter().rposition(is_content),
    ) {
        (Some(start), Some(end)) => &lines[start..=end],
        _ => &[],
    }
}

fn build_cell(kind: CellKind, source: Vec<String>, language: String, id: String) -> NotebookCell {
    let metadata = CellMetadata {
        language,
        id: id.clone(),
    };
    match kind {
        CellKind::Markdown => NotebookCell::Markdown {
            id,
            metadata,
            source,
        },
        CellKind::Code => NotebookCell::Code {
            id,
            metadata,
            execution_count: None,
            outputs: Vec::new(),
            source,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellKind, lines: &[&str]) -> SourceCell {
        SourceCell::new(kind, lines.iter().map(|l| l.to_string()).collect())
    }

    fn strings(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn trims_blank_edges_repeatedly() {
        let lines = strings(&["", "  ", "a", "", "b", "\t", ""]);
        assert_eq!(trim_blank_edges(&lines), &strings(&["a", "", "b"])[..]);
    }

    #[test]
    fn trimming_is_idempotent() {
        let lines = strings(&[" ", "x", " ", "y", ""]);
        let once = trim_blank_edges(&lines).to_vec();
        let twice = trim_blank_edges(&once).to_vec();
        assert_eq!(once, twice);
    }

    #[test]
    fn all_blank_trims_to_empty() {
        assert!(trim_blank_edges(&strings(&["", "   "])).is_empty());
        assert!(trim_blank_edges(&[]).is_empty());
    }

    #[test]
    fn assembles_cells_with_metadata() {
        let cells = vec![
            cell(CellKind::Markdown, &["", "# Title", ""]),
            cell(CellKind::Code, &["x = 1", "y = 2"]),
        ];
        let nb = assemble(&cells, &NotebookMetadata::default(), &mut SequentialIds::new());

        assert_eq!(nb.cells.len(), 2);
        assert_eq!(nb.nbformat, 4);
        assert_eq!(nb.nbformat_minor, 5);

        let md = &nb.cells[0];
        assert_eq!(md.kind(), CellKind::Markdown);
        assert_eq!(md.id(), "00000000");
        assert_eq!(md.metadata().language, "markdown");
        assert_eq!(md.source(), &strings(&["# Title\n"])[..]);

        match &nb.cells[1] {
            NotebookCell::Code {
                id,
                metadata,
                execution_count,
                outputs,
                source,
            } => {
                assert_eq!(id, "00000001");
                assert_eq!(metadata.id, "00000001");
                assert_eq!(metadata.language, "python");
                assert!(execution_count.is_none());
                assert!(outputs.is_empty());
                assert_eq!(source, &strings(&["x = 1\n", "y = 2\n"]));
            }
            other => panic!("expected code cell, got {other:?}"),
        }
    }

    #[test]
    fn blank_cells_are_dropped() {
        let cells = vec![
            cell(CellKind::Code, &["", " "]),
            cell(CellKind::Code, &["keep"]),
            cell(CellKind::Markdown, &[""]),
        ];
        let nb = assemble(&cells, &NotebookMetadata::default(), &mut SequentialIds::new());
        assert_eq!(nb.cells.len(), 1);
        assert_eq!(nb.cells[0].source(), &strings(&["keep\n"])[..]);
        // Ids are only drawn for emitted cells.
        assert_eq!(nb.cells[0].id(), "00000000");
    }

    #[test]
    fn code_language_follows_kernel() {
        let mut metadata = NotebookMetadata::default();
        metadata.kernelspec.language = "scala".into();
        let nb = assemble(
            &[cell(CellKind::Code, &["val x = 1"])],
            &metadata,
            &mut SequentialIds::new(),
        );
        assert_eq!(nb.cells[0].metadata().language, "scala");
    }

    #[test]
    fn interior_whitespace_is_verbatim() {
        let nb = assemble(
            &[cell(CellKind::Code, &["def f():", "    return 1  "])],
            &NotebookMetadata::default(),
            &mut SequentialIds::new(),
        );
        assert_eq!(
            nb.cells[0].source(),
            &strings(&["def f():\n", "    return 1  \n"])[..]
        );
    }

    #[test]
    fn random_ids_are_short_hex() {
        let mut ids = RandomIds;
        let id = ids.next_id();
        assert_eq!(id.len(), CELL_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn random_ids_do_not_repeat_within_a_document() {
        let mut ids = RandomIds;
        let drawn: std::collections::HashSet<String> = (0..200).map(|_| ids.next_id()).collect();
        assert_eq!(drawn.len(), 200);
    }
}
