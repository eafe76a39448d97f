//! Cell splitter: partitions script lines into typed cells.

use tracing::{debug, trace};

use notebookify_shared::{CellKind, SourceCell};

use crate::markers::{MagicPayload, Marker, classify_line, matching_rule, unescape_markdown};

/// Split script lines into an ordered sequence of cells.
///
/// Pure and deterministic. Cells made only of blank lines are never produced
/// by a boundary, though a trailing buffer is flushed as is and left for the
/// assembler to trim.
pub fn split_cells<I, S>(lines: I) -> Vec<SourceCell>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut splitter = Splitter::new();
    for line in lines {
        splitter.feed(line.as_ref());
    }
    let cells = splitter.finish();
    debug!(cells = cells.len(), "split complete");
    cells
}

/// Split a whole script, normalizing `\n` and `\r\n` line endings.
pub fn split_source(source: &str) -> Vec<SourceCell> {
    split_cells(source.lines())
}

/// Open-cell state.
struct Splitter {
    cells: Vec<SourceCell>,
    kind: CellKind,
    buffer: Vec<String>,
}

impl Splitter {
    fn new() -> Self {
        Self {
            cells: Vec::new(),
            kind: CellKind::Code,
            buffer: Vec::new(),
        }
    }

    fn feed(&mut self, line: &str) {
        trace!(rule = matching_rule(line).unwrap_or("content"), open = %self.kind, "line");
        match classify_line(line) {
            Marker::Banner => {}
            Marker::CommandBoundary => self.start(CellKind::Code),
            Marker::Title(title) => {
                self.start(CellKind::Markdown);
                if let Some(title) = title {
                    self.push(title);
                }
            }
            Marker::Magic(MagicPayload::Markdown(content)) => {
                if self.kind != CellKind::Markdown {
                    self.start(CellKind::Markdown);
                }
                self.push(content);
            }
            // Continues an open markdown block verbatim; otherwise it is code,
            // which is the only other state.
            Marker::Magic(MagicPayload::Raw(payload)) => self.push(payload),
            Marker::SplitMarker(kind) => self.start(kind),
            Marker::Content(text) => {
                let text = match self.kind {
                    CellKind::Markdown => unescape_markdown(text),
                    CellKind::Code => text,
                };
                self.push(text);
            }
        }
    }

    fn push(&mut self, line: &str) {
        self.buffer.push(line.to_string());
    }

    /// Close the open cell and open a new one of `kind`.
    fn start(&mut self, kind: CellKind) {
        self.flush();
        self.kind = kind;
    }

    /// Emit the buffer if any line has content; reset it either way.
    fn flush(&mut self) {
        let lines = std::mem::take(&mut self.buffer);
        if lines.iter().any(|l| !l.trim().is_empty()) {
            self.cells.push(SourceCell::new(self.kind, lines));
        }
    }

    fn finish(mut self) -> Vec<SourceCell> {
        if !self.buffer.is_empty() {
            let lines = std::mem::take(&mut self.buffer);
            self.cells.push(SourceCell::new(self.kind, lines));
        }
        if self.cells.first().is_some_and(SourceCell::is_blank) {
            self.cells.remove(0);
        }
        self.cells
    }
}
