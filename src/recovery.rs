//! Heuristic recovery for lines that fail the strict grammar
//!
//! Real-world report lines often miss the canonical form by one slip: a
//! stray space, a doubled bracket around the title, a dropped delimiter.
//! Recovery re-derives each field independently, reassembles a canonical
//! line, and lets the grammar parser arbitrate: only a reassembly that
//! re-matches counts as recovered.

use crate::grammar::{self, CLOSE, OPEN};
use crate::record::{ParseFailureReason, TaskLineRecord};

/// A successfully recovered line: the record plus the canonical text it
/// was re-parsed from. Callers keep the original→cleaned pair for audit.
#[derive(Debug, Clone, PartialEq)]
pub struct Recovered {
    pub record: TaskLineRecord,
    pub cleaned: String,
}

/// Attempt to recover a line that the grammar rejected.
///
/// Re-invoked on an already-canonical line this reproduces the same
/// record, so running it after a parser match would be harmless, just
/// pointless.
pub fn recover(line: &str) -> Option<Recovered> {
    let chars: Vec<char> = line.trim().chars().collect();

    let (sequence, after_dot) = find_sequence(&chars)?;

    // An intact leading 【hours】 block is kept as the self-estimate;
    // otherwise the trailing value stands in for it.
    let (leading_value, project_start) = match decimal_block_at(&chars, after_dot) {
        Some((value, end)) => (Some(value), end),
        None => (None, after_dot),
    };

    let title_open = find_char(&chars, OPEN, project_start)?;
    let project: String = chars[project_start..title_open].iter().collect();
    let project = project.trim().to_string();
    if project.is_empty() {
        return None;
    }

    let url_start = find_url(&chars, 0).unwrap_or(chars.len());
    if title_open >= url_start {
        return None;
    }
    let title = extract_title(&chars[title_open + 1..url_start])?;

    let link = take_link(&chars, url_start);
    let trailing_value = last_decimal_block(&chars)?;
    let self_value = leading_value.unwrap_or_else(|| trailing_value.clone());

    let cleaned = format!(
        "{sequence}.{OPEN}{self_value}{CLOSE}{project}{OPEN}{title}{CLOSE}{link}{OPEN}{trailing_value}{CLOSE}"
    );

    grammar::match_line(&cleaned).map(|record| Recovered { record, cleaned })
}

/// Classify why a line is unrecoverable.
///
/// Priority: missing brackets, then missing link, then format mismatch.
pub fn failure_reason(line: &str) -> ParseFailureReason {
    if !line.contains(OPEN) || !line.contains(CLOSE) {
        ParseFailureReason::MissingBrackets
    } else if !line.contains("http://") && !line.contains("https://") {
        ParseFailureReason::MissingLink
    } else {
        ParseFailureReason::FormatMismatch
    }
}

/// First run of digits immediately followed by a dot. Returns the digits
/// and the index just past the dot.
fn find_sequence(chars: &[char]) -> Option<(String, usize)> {
    let mut idx = 0;
    while idx < chars.len() {
        if chars[idx].is_ascii_digit() {
            let start = idx;
            while idx < chars.len() && chars[idx].is_ascii_digit() {
                idx += 1;
            }
            if chars.get(idx) == Some(&'.') {
                let digits: String = chars[start..idx].iter().collect();
                return Some((digits, idx + 1));
            }
        } else {
            idx += 1;
        }
    }
    None
}

/// `【decimal】` starting exactly at `pos`. Returns the decimal text and
/// the index just past the closing bracket.
fn decimal_block_at(chars: &[char], pos: usize) -> Option<(String, usize)> {
    if chars.get(pos) != Some(&OPEN) {
        return None;
    }
    let mut idx = pos + 1;
    let mut digits = 0usize;
    let mut dots = 0usize;
    let start = idx;
    while let Some(&ch) = chars.get(idx) {
        if ch.is_ascii_digit() {
            digits += 1;
        } else if ch == '.' {
            dots += 1;
        } else {
            break;
        }
        idx += 1;
    }
    if digits == 0 || dots > 1 || chars.get(idx) != Some(&CLOSE) {
        return None;
    }
    let text: String = chars[start..idx].iter().collect();
    Some((text, idx + 1))
}

/// Contents of the last `【decimal】` group anywhere in the line.
fn last_decimal_block(chars: &[char]) -> Option<String> {
    let mut found = None;
    let mut idx = 0;
    while idx < chars.len() {
        if chars[idx] == OPEN {
            if let Some((value, end)) = decimal_block_at(chars, idx) {
                found = Some(value);
                idx = end;
                continue;
            }
        }
        idx += 1;
    }
    found
}

/// Title text from the candidate between the opening bracket and the URL.
///
/// The candidate may carry one stray layer of brackets; the branches peel
/// it off so the reassembly can re-bracket canonically:
/// - a nested open and close pair strips to the text between them,
/// - an open with no close runs to the URL,
/// - a close with no open truncates there, dropping trailing junk,
/// - no brackets at all is already the title.
fn extract_title(candidate: &[char]) -> Option<String> {
    let inner_start = candidate.iter().position(|&ch| ch == OPEN);
    let inner_end = candidate.iter().rposition(|&ch| ch == CLOSE);

    let title: String = match (inner_start, inner_end) {
        (Some(start), Some(end)) if start < end => candidate[start + 1..end].iter().collect(),
        // Close before open leaves no title between them.
        (Some(_), Some(_)) => return None,
        (Some(start), None) => candidate[start + 1..].iter().collect(),
        (None, Some(end)) => candidate[..end].iter().collect(),
        (None, None) => candidate.iter().collect(),
    };

    let title = title.trim().to_string();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// URL run from `start` up to the next opening bracket or whitespace.
fn take_link(chars: &[char], start: usize) -> String {
    let mut end = start;
    while let Some(&ch) = chars.get(end) {
        if ch == OPEN || ch.is_whitespace() {
            break;
        }
        end += 1;
    }
    chars[start..end].iter().collect()
}

fn find_char(chars: &[char], needle: char, from: usize) -> Option<usize> {
    chars[from..]
        .iter()
        .position(|&ch| ch == needle)
        .map(|offset| from + offset)
}

/// Earliest index at which `http://` or `https://` begins.
fn find_url(chars: &[char], from: usize) -> Option<usize> {
    let http = find_sub(chars, "http://", from);
    let https = find_sub(chars, "https://", from);
    match (http, https) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

fn find_sub(chars: &[char], needle: &str, from: usize) -> Option<usize> {
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() || chars.len() < needle.len() {
        return None;
    }
    for idx in from..=chars.len() - needle.len() {
        if chars[idx..idx + needle.len()] == needle[..] {
            return Some(idx);
        }
    }
    None
}
