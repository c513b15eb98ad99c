//! Text block parsing
//!
//! Splits a pasted report block into lines, normalizes them, and runs
//! each through the grammar parser with recovery as the fallback. Output
//! order follows input order; it becomes spreadsheet row order downstream.

use serde::Serialize;

use crate::grammar;
use crate::record::{ParseFailureReason, TaskLineRecord};
use crate::recovery;

/// How much whitespace to remove from a line before matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhitespaceMode {
    /// Remove every space and tab inside the line. Chat clients pad
    /// pasted lines freely, so this is the default.
    #[default]
    StripSpaces,
    /// Only trim leading and trailing whitespace.
    Trim,
}

/// Options for one block parse.
#[derive(Debug, Clone, Default)]
pub struct BlockOptions {
    pub whitespace: WhitespaceMode,
    /// Keep only lines containing this name. Useful when the paste holds
    /// a whole team's entries.
    pub filter_name: Option<String>,
}

/// A line that failed both the grammar and recovery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedLine {
    pub line: String,
    pub reason: ParseFailureReason,
}

/// Original→cleaned audit entry for a recovered line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedLine {
    pub original: String,
    pub cleaned: String,
}

/// Result of parsing a block.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BlockParse {
    /// Successfully parsed records, in input line order.
    pub matched: Vec<TaskLineRecord>,
    /// How many of `matched` went through recovery.
    pub recovered: usize,
    /// Lines that failed both stages, with reasons.
    pub unmatched: Vec<UnmatchedLine>,
    /// Audit trail for recovered lines.
    pub cleaned: Vec<CleanedLine>,
}

/// Parse a newline-delimited block of report lines.
pub fn parse_block(block: &str, options: &BlockOptions) -> BlockParse {
    let mut result = BlockParse::default();

    for raw in block.lines() {
        if raw.trim().is_empty() {
            continue;
        }
        if let Some(name) = &options.filter_name {
            if !raw.contains(name.as_str()) {
                continue;
            }
        }

        let line = normalize(raw, options.whitespace);

        if let Some(record) = grammar::match_line(&line) {
            result.matched.push(record);
            continue;
        }

        match recovery::recover(&line) {
            Some(recovered) => {
                tracing::debug!(original = %line, cleaned = %recovered.cleaned, "recovered line");
                result.matched.push(recovered.record);
                result.recovered += 1;
                result.cleaned.push(CleanedLine {
                    original: line,
                    cleaned: recovered.cleaned,
                });
            }
            None => {
                let reason = recovery::failure_reason(&line);
                tracing::debug!(%line, reason = reason.describe(), "unmatched line");
                result.unmatched.push(UnmatchedLine { line, reason });
            }
        }
    }

    result
}

fn normalize(line: &str, mode: WhitespaceMode) -> String {
    match mode {
        WhitespaceMode::StripSpaces => line
            .chars()
            .filter(|ch| *ch != ' ' && *ch != '\t')
            .collect(),
        WhitespaceMode::Trim => line.trim().to_string(),
    }
}
