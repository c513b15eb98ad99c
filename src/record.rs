//! Parsed report-line records
//!
//! A [`TaskLineRecord`] is the structured form of one report line. It is
//! created once per successfully parsed (or recovered) line and never
//! mutated afterwards.

use serde::Serialize;

/// One task entry extracted from a report line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskLineRecord {
    /// Ordinal prefix of the line ("1", "2", ...)
    pub sequence: String,
    /// Self-estimated hours from the leading value block
    pub self_estimated_hours: f64,
    /// Project name as written in the line
    pub project: String,
    /// Task title, without its surrounding brackets
    pub title: String,
    /// Tracker link; must carry a `/wp/<digits>` segment to be usable
    pub link: String,
    /// Hours reported in the trailing value block
    pub reported_value: f64,
}

impl TaskLineRecord {
    /// Numeric task id derived from the `/wp/<digits>` segment of the link.
    ///
    /// Leading zeros are normalized away by the integer parse, so
    /// `/wp/042` and `/wp/42` name the same task. Returns `None` when the
    /// link has no such segment; records without an id are dropped before
    /// validation.
    pub fn task_id(&self) -> Option<u64> {
        let start = self.link.find("/wp/")? + "/wp/".len();
        let digits: String = self.link[start..]
            .chars()
            .take_while(|ch| ch.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            return None;
        }
        digits.parse().ok()
    }
}

/// Why a line failed both the grammar and recovery.
///
/// Classification priority when several apply: missing brackets, then
/// missing link, then generic format mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFailureReason {
    MissingBrackets,
    MissingLink,
    FormatMismatch,
}

impl ParseFailureReason {
    /// Human-readable reason shown next to an unmatched line.
    pub fn describe(&self) -> &'static str {
        match self {
            ParseFailureReason::MissingBrackets => "missing required 【】 brackets",
            ParseFailureReason::MissingLink => "missing a valid http(s) link",
            ParseFailureReason::FormatMismatch => "line does not fit the report format",
        }
    }
}

/// Result of running one line through the parsing stage.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Matched(TaskLineRecord),
    Unmatched {
        line: String,
        reason: ParseFailureReason,
    },
}
