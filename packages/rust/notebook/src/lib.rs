//! Script-to-notebook conversion.
//!
//! A script annotated with cell markers (Databricks `# COMMAND` / `# MAGIC`
//! exports and `# %%` percent cells) goes through two stages:
//! 1. [`split_cells`] partitions the lines into typed cells
//! 2. [`assemble`] trims them and builds a [`Notebook`]
//!
//! Serialization lives in [`writer`] and is chosen by the caller.

pub mod assembler;
pub mod markers;
pub mod splitter;
pub mod writer;

use tracing::instrument;

use notebookify_shared::{Notebook, NotebookMetadata};

pub use assembler::{IdGenerator, RandomIds, SequentialIds, assemble, trim_blank_edges};
pub use markers::{MagicPayload, Marker, classify_line};
pub use splitter::{split_cells, split_source};
pub use writer::{
    FallbackWriter, NotebookWriter, PlainWriter, StructuredWriter, write_notebook, writer_for,
};

/// Convert script text into a notebook.
#[instrument(skip_all, fields(bytes = source.len()))]
pub fn convert_source(
    source: &str,
    metadata: &NotebookMetadata,
    ids: &mut dyn IdGenerator,
) -> Notebook {
    let cells = split_source(source);
    assemble(&cells, metadata, ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notebookify_shared::{CellKind, NotebookCell};

    fn fixture(name: &str) -> String {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/scripts")
            .join(name);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"))
    }

    fn convert(source: &str) -> Notebook {
        convert_source(source, &NotebookMetadata::default(), &mut SequentialIds::new())
    }

    fn text(cell: &NotebookCell) -> String {
        cell.source().concat()
    }

    #[test]
    fn pure_code_script() {
        let nb = convert("x = 1\ny = 2\n");
        assert_eq!(nb.cells.len(), 1);
        assert_eq!(nb.cells[0].kind(), CellKind::Code);
        assert_eq!(text(&nb.cells[0]), "x = 1\ny = 2\n");
    }

    #[test]
    fn only_boundaries_gives_empty_notebook() {
        let nb = convert("# COMMAND ----------\n# COMMAND ----------\n");
        assert!(nb.cells.is_empty());
    }

    #[test]
    fn databricks_export_fixture() {
        let nb = convert(&fixture("bronze_ingestion.py"));

        let kinds: Vec<CellKind> = nb.cells.iter().map(NotebookCell::kind).collect();
        assert_eq!(
            kinds,
            vec![
                CellKind::Markdown,
                CellKind::Markdown,
                CellKind::Code,
                CellKind::Code,
                CellKind::Markdown,
                CellKind::Code,
            ]
        );

        assert_eq!(
            text(&nb.cells[0]),
            "# Bronze ingestion\nLoads raw events into the bronze layer.\n"
        );
        assert_eq!(
            text(&nb.cells[1]),
            "<div style=\"color: gray\">\nSource: landing zone\n</div>\n"
        );
        assert_eq!(text(&nb.cells[2]), "import json\nfrom pyspark.sql import functions as F\n");
        assert_eq!(text(&nb.cells[3]), "%sql\nSELECT count(*) FROM bronze.events\n");
        assert_eq!(text(&nb.cells[4]), "Write stream\nStarts the streaming write.\n");
        assert!(text(&nb.cells[5]).starts_with("query = (\n"));
        // The banner never reaches the output.
        assert!(nb
            .cells
            .iter()
            .all(|c| !text(c).contains("Databricks notebook source")));
    }

    #[test]
    fn percent_format_fixture() {
        let nb = convert(&fixture("percent_cells.py"));

        assert_eq!(nb.cells.len(), 4);
        assert_eq!(nb.cells[0].kind(), CellKind::Markdown);
        assert_eq!(text(&nb.cells[0]), "# Analysis\n\nSteps to reproduce the report.\n");
        assert_eq!(nb.cells[1].kind(), CellKind::Code);
        assert_eq!(text(&nb.cells[1]), "import pandas as pd\n\n# load\ndf = pd.read_csv(\"data.csv\")\n");
        assert_eq!(nb.cells[2].kind(), CellKind::Markdown);
        assert_eq!(text(&nb.cells[2]), "## Summary\n");
        assert_eq!(text(&nb.cells[3]), "df.describe()\n");
    }

    /// Non-blank content lines a script should contribute, derived line by
    /// line from its markers: markers and the banner contribute nothing,
    /// titles and magic payloads contribute their text, and plain lines are
    /// unescaped while a markdown cell is open.
    fn expected_content(source: &str) -> Vec<String> {
        let mut open = CellKind::Code;
        let mut expected = Vec::new();
        for line in source.lines() {
            let content = match classify_line(line) {
                Marker::Banner => None,
                Marker::CommandBoundary => {
                    open = CellKind::Code;
                    None
                }
                Marker::SplitMarker(kind) => {
                    open = kind;
                    None
                }
                Marker::Title(title) => {
                    open = CellKind::Markdown;
                    title
                }
                Marker::Magic(MagicPayload::Markdown(text)) => {
                    open = CellKind::Markdown;
                    Some(text)
                }
                Marker::Magic(MagicPayload::Raw(text)) => Some(text),
                Marker::Content(text) if open == CellKind::Markdown => {
                    Some(markers::unescape_markdown(text))
                }
                Marker::Content(text) => Some(text),
            };
            if let Some(text) = content.filter(|t| !t.trim().is_empty()) {
                expected.push(text.to_string());
            }
        }
        expected.sort();
        expected
    }

    fn emitted_content(nb: &Notebook) -> Vec<String> {
        let mut emitted: Vec<String> = nb
            .cells
            .iter()
            .flat_map(|cell| cell.source().iter())
            .map(|line| line.strip_suffix('\n').unwrap_or(line).to_string())
            .filter(|line| !line.trim().is_empty())
            .collect();
        emitted.sort();
        emitted
    }

    #[test]
    fn every_content_line_lands_in_exactly_one_cell() {
        for name in ["bronze_ingestion.py", "percent_cells.py"] {
            let source = fixture(name);
            let expected = expected_content(&source);
            assert!(!expected.is_empty(), "{name} has content");
            assert_eq!(emitted_content(&convert(&source)), expected, "{name}");
        }
    }

    #[test]
    fn completeness_covers_magic_titles_and_unescaped_lines() {
        let expected = expected_content(&fixture("bronze_ingestion.py"));
        for line in [
            "Source: landing zone",
            "SELECT count(*) FROM bronze.events",
            "Write stream",
            "Starts the streaming write.",
            "    .toTable(\"bronze.events\")",
        ] {
            assert!(expected.iter().any(|l| l == line), "missing {line:?}");
        }
        assert!(!expected.iter().any(|l| l.contains("Databricks notebook source")));
        assert!(!expected.iter().any(|l| l.starts_with("# COMMAND")));
    }
}
