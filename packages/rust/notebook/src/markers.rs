//! Line classification for exported notebook scripts.
//!
//! Each line is matched against an ordered rule table; the first rule that
//! matches decides the [`Marker`]. Anything no rule claims is plain content.
//!
//! Precedence:
//! 1. `# Databricks notebook source` banner (ignored)
//! 2. `# COMMAND` boundary
//! 3. `# DBTITLE` title annotation
//! 4. `# MAGIC` wrapped directive
//! 5. `# %%` / `#%%` split marker
//! 6. plain content

use notebookify_shared::CellKind;

/// First line of a Databricks source export.
pub const BANNER: &str = "# Databricks notebook source";

/// Explicit cell break with no type information.
pub const COMMAND_MARKER: &str = "# COMMAND";

/// Title annotation for the next cell.
pub const TITLE_MARKER: &str = "# DBTITLE";

/// Prefix wrapping an embedded directive or markdown fragment.
pub const MAGIC_MARKER: &str = "# MAGIC";

/// Percent-format cell separators, with and without the space.
pub const SPLIT_MARKERS: [&str; 2] = ["#%%", "# %%"];

/// Magic payload token switching a cell to markdown (`%md`, `%md-sandbox`).
pub const MARKDOWN_MODE: &str = "%md";

/// Payload prefixes that read as markdown or HTML.
const MARKDOWN_PREFIXES: [&str; 6] = [MARKDOWN_MODE, "<", "&", "|", "##", "# "];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The outcome of classifying one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker<'a> {
    /// Export banner, dropped.
    Banner,
    /// Close the current cell and open a code cell.
    CommandBoundary,
    /// Close the current cell and open a markdown cell seeded with the title.
    Title(Option<&'a str>),
    /// A `# MAGIC` line and its classified payload.
    Magic(MagicPayload<'a>),
    /// Close the current cell and open one of the hinted kind.
    SplitMarker(CellKind),
    /// Any other line, verbatim.
    Content(&'a str),
}

/// Classified payload of a `# MAGIC` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicPayload<'a> {
    /// Markdown-looking payload, with any `%md` token removed.
    Markdown(&'a str),
    /// Anything else, left-trimmed but otherwise raw.
    Raw(&'a str),
}

/// A named predicate in the precedence table.
pub(crate) struct Rule {
    pub name: &'static str,
    pub matches: fn(&str) -> Option<Marker<'_>>,
}

/// Classification rules in precedence order.
pub(crate) const RULES: &[Rule] = &[
    Rule {
        name: "banner",
        matches: banner,
    },
    Rule {
        name: "command",
        matches: command_boundary,
    },
    Rule {
        name: "title",
        matches: title,
    },
    Rule {
        name: "magic",
        matches: magic,
    },
    Rule {
        name: "split",
        matches: split_marker,
    },
];

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classify a single line. Exactly one marker is produced per line.
pub fn classify_line(line: &str) -> Marker<'_> {
    RULES
        .iter()
        .find_map(|rule| (rule.matches)(line))
        .unwrap_or(Marker::Content(line))
}

/// Name of the rule that claims `line`, or `None` for plain content.
pub fn matching_rule(line: &str) -> Option<&'static str> {
    RULES
        .iter()
        .find(|rule| (rule.matches)(line).is_some())
        .map(|rule| rule.name)
}

fn banner(line: &str) -> Option<Marker<'_>> {
    line.trim_start()
        .starts_with(BANNER)
        .then_some(Marker::Banner)
}

fn command_boundary(line: &str) -> Option<Marker<'_>> {
    line.trim_start()
        .starts_with(COMMAND_MARKER)
        .then_some(Marker::CommandBoundary)
}

fn title(line: &str) -> Option<Marker<'_>> {
    if !line.trim_start().starts_with(TITLE_MARKER) {
        return None;
    }
    Some(Marker::Title(extract_title(line)))
}

fn magic(line: &str) -> Option<Marker<'_>> {
    if !line.trim_start().starts_with(MAGIC_MARKER) {
        return None;
    }
    let (_, payload) = line.split_once(MAGIC_MARKER)?;
    Some(Marker::Magic(classify_magic(payload.trim_start())))
}

fn split_marker(line: &str) -> Option<Marker<'_>> {
    let stripped = line.trim_start();
    if !SPLIT_MARKERS.iter().any(|m| stripped.starts_with(m)) {
        return None;
    }
    // Both separators are ASCII, so byte 3 is a char boundary.
    let hint = stripped[3..].to_lowercase();
    let kind = if hint.contains("markdown") {
        CellKind::Markdown
    } else {
        CellKind::Code
    };
    Some(Marker::SplitMarker(kind))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Title text of a `# DBTITLE` line: everything after the first comma, with
/// leading `#`, double quotes and whitespace removed in any order, and
/// trailing quotes and whitespace removed.
pub fn extract_title(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once(',')?;
    let title = rest
        .trim_start_matches(|c: char| c == '#' || c == '"' || c.is_whitespace())
        .trim_end_matches(|c: char| c == '"' || c.is_whitespace());
    (!title.is_empty()).then_some(title)
}

/// Classify the (left-trimmed) payload of a `# MAGIC` line.
pub fn classify_magic(payload: &str) -> MagicPayload<'_> {
    if !looks_like_markdown(payload) {
        return MagicPayload::Raw(payload);
    }

    let content = match payload.split_once(char::is_whitespace) {
        Some((token, rest)) if token.starts_with(MARKDOWN_MODE) => rest.trim_start(),
        None if payload.starts_with(MARKDOWN_MODE) => "",
        _ => payload,
    };
    MagicPayload::Markdown(content)
}

/// Markdown heuristic for magic payloads.
pub fn looks_like_markdown(payload: &str) -> bool {
    MARKDOWN_PREFIXES.iter().any(|p| payload.starts_with(p))
}

/// Undo comment-wrapping of a markdown line: drop everything up to the first
/// `#` and one space after it. Lines without a leading `#` are returned as is.
pub fn unescape_markdown(line: &str) -> &str {
    match line.trim_start().strip_prefix('#') {
        Some(after) => after.strip_prefix(' ').unwrap_or(after),
        None => line,
    }
}
