//! Report line grammar parser
//!
//! Matches one text line against the canonical bracketed report form:
//!
//! ```text
//! <seq> "." 【<hours>】 <project> 【<title>】 <url> 【<hours>】
//! ```
//!
//! The title block is the only element that may nest: its body may carry
//! one balanced `【...】` pair, one level deep. The parser is an explicit
//! scanner, so that rule is a real branch instead of a regex side effect.
//!
//! On failure the parser returns `None` and produces no diagnostic of its
//! own; classifying the failure is the recovery layer's job. Whitespace
//! normalization happens in the caller (see [`crate::block`]).

use crate::record::TaskLineRecord;

/// Match a single line against the report grammar.
pub fn match_line(line: &str) -> Option<TaskLineRecord> {
    let mut scanner = Scanner::new(line);

    let sequence = scanner.take_digits()?;
    scanner.expect('.')?;

    scanner.expect(OPEN)?;
    let self_estimated_hours = scanner.take_decimal()?;
    scanner.expect(CLOSE)?;

    let project = scanner.take_project()?;
    let title = scanner.take_title_block()?;
    let link = scanner.take_url()?;

    scanner.expect(OPEN)?;
    let reported_value = scanner.take_decimal()?;
    scanner.expect(CLOSE)?;

    if !scanner.at_end() {
        return None;
    }

    Some(TaskLineRecord {
        sequence,
        self_estimated_hours,
        project: project.trim().to_string(),
        title: title.trim().to_string(),
        link: link.trim().to_string(),
        reported_value,
    })
}

pub const OPEN: char = '【';
pub const CLOSE: char = '】';

struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn new(input: &str) -> Self {
        Self {
            chars: input.trim().chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn expect(&mut self, expected: char) -> Option<()> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    /// Non-empty run of ASCII digits.
    fn take_digits(&mut self) -> Option<String> {
        let start = self.pos;
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        Some(self.chars[start..self.pos].iter().collect())
    }

    /// Decimal number: digits and dots, at least one digit, at most one
    /// dot. Keeps a malformed value like `3.5.6` from reaching `parse`.
    fn take_decimal(&mut self) -> Option<f64> {
        let start = self.pos;
        let mut digits = 0usize;
        let mut dots = 0usize;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
            } else if ch == '.' {
                dots += 1;
            } else {
                break;
            }
            self.pos += 1;
        }
        if digits == 0 || dots > 1 {
            return None;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse().ok()
    }

    /// One or more characters up to the next opening bracket.
    fn take_project(&mut self) -> Option<String> {
        let start = self.pos;
        while matches!(self.peek(), Some(ch) if ch != OPEN) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        Some(self.chars[start..self.pos].iter().collect())
    }

    /// Title block: `【` body `】`, where the body may contain one
    /// balanced nested pair. Non-greedy: the first close bracket at outer
    /// depth that is immediately followed by the URL ends the title.
    fn take_title_block(&mut self) -> Option<String> {
        self.expect(OPEN)?;
        let mut body = String::new();
        let mut nested_seen = false;

        loop {
            match self.bump()? {
                OPEN => {
                    // One level of nesting, once per title.
                    if nested_seen {
                        return None;
                    }
                    nested_seen = true;
                    body.push(OPEN);
                    loop {
                        match self.bump()? {
                            OPEN => return None,
                            CLOSE => {
                                body.push(CLOSE);
                                break;
                            }
                            ch => body.push(ch),
                        }
                    }
                }
                CLOSE => {
                    // A bare close bracket cannot be body content, so the
                    // URL must start right here.
                    if self.url_ahead() {
                        return Some(body);
                    }
                    return None;
                }
                ch => body.push(ch),
            }
        }
    }

    fn url_ahead(&self) -> bool {
        self.lookahead("http://") || self.lookahead("https://")
    }

    fn lookahead(&self, prefix: &str) -> bool {
        let mut idx = self.pos;
        for expected in prefix.chars() {
            if self.chars.get(idx) != Some(&expected) {
                return false;
            }
            idx += 1;
        }
        true
    }

    /// `http://` or `https://` followed by characters excluding
    /// whitespace and the opening bracket.
    fn take_url(&mut self) -> Option<String> {
        if !self.url_ahead() {
            return None;
        }
        let start = self.pos;
        while matches!(self.peek(), Some(ch) if ch != OPEN && !ch.is_whitespace()) {
            self.pos += 1;
        }
        Some(self.chars[start..self.pos].iter().collect())
    }
}
