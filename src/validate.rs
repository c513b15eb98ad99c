//! Reconciliation of report lines against authoritative task records
//!
//! Every check runs unconditionally; a failing check appends one
//! discrepancy and never stops the rest. `is_valid` is the AND of all
//! checks. Content mismatches are never errors; only a failed lookup is,
//! and that is handled at the record boundary in [`crate::report`].

use chrono::NaiveDate;
use serde::Serialize;

use crate::duration;
use crate::record::TaskLineRecord;
use crate::source::AuthoritativeTaskRecord;
use crate::week;

/// Outcome of reconciling one record. Fresh per call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub discrepancies: Vec<String>,
}

/// Cross-field validator, configured once per run.
#[derive(Debug, Clone)]
pub struct Validator {
    allowed_statuses: Vec<String>,
    handler: String,
    monday: NaiveDate,
    sunday: NaiveDate,
    require_description_hours: bool,
}

impl Validator {
    pub fn new(
        allowed_statuses: Vec<String>,
        handler: impl Into<String>,
        week: (NaiveDate, NaiveDate),
        require_description_hours: bool,
    ) -> Self {
        Self {
            allowed_statuses,
            handler: handler.into(),
            monday: week.0,
            sunday: week.1,
            require_description_hours,
        }
    }

    /// Run every check against the record pair and fold the results.
    pub fn validate(
        &self,
        record: &TaskLineRecord,
        authoritative: &AuthoritativeTaskRecord,
    ) -> ValidationReport {
        let checks = [
            self.check_task_id(record, authoritative),
            self.check_title(record, authoritative),
            self.check_status(authoritative),
            self.check_project(record, authoritative),
            self.check_estimated_hours(record, authoritative),
            self.check_responsible(authoritative),
            self.check_week(authoritative),
            self.check_description_hours(authoritative),
        ];

        let discrepancies: Vec<String> = checks.into_iter().flatten().collect();
        ValidationReport {
            is_valid: discrepancies.is_empty(),
            discrepancies,
        }
    }

    fn check_task_id(
        &self,
        record: &TaskLineRecord,
        authoritative: &AuthoritativeTaskRecord,
    ) -> Option<String> {
        match record.task_id() {
            Some(id) if id == authoritative.id => None,
            Some(id) => Some(format!(
                "task id mismatch: link says {id}, tracker says {}",
                authoritative.id
            )),
            None => Some(format!(
                "link '{}' carries no /wp/<id> segment",
                record.link
            )),
        }
    }

    fn check_title(
        &self,
        record: &TaskLineRecord,
        authoritative: &AuthoritativeTaskRecord,
    ) -> Option<String> {
        if authoritative.subject == record.title {
            return None;
        }
        Some(format!(
            "title mismatch: tracker '{}' vs line '{}'",
            authoritative.subject, record.title
        ))
    }

    fn check_status(&self, authoritative: &AuthoritativeTaskRecord) -> Option<String> {
        if self
            .allowed_statuses
            .iter()
            .any(|status| status == &authoritative.status)
        {
            return None;
        }
        Some(format!(
            "status '{}' not in allowed set [{}]",
            authoritative.status,
            self.allowed_statuses.join(", ")
        ))
    }

    fn check_project(
        &self,
        record: &TaskLineRecord,
        authoritative: &AuthoritativeTaskRecord,
    ) -> Option<String> {
        if authoritative.project == record.project {
            return None;
        }
        Some(format!(
            "project mismatch: tracker '{}' vs line '{}'",
            authoritative.project, record.project
        ))
    }

    fn check_estimated_hours(
        &self,
        record: &TaskLineRecord,
        authoritative: &AuthoritativeTaskRecord,
    ) -> Option<String> {
        let tracker_hours = duration::to_hours(&authoritative.estimated_time_iso);
        let line_hours = duration::round2(record.self_estimated_hours);
        if tracker_hours == line_hours {
            return None;
        }
        Some(format!(
            "estimated hours mismatch: tracker {tracker_hours} vs line {line_hours}"
        ))
    }

    fn check_responsible(&self, authoritative: &AuthoritativeTaskRecord) -> Option<String> {
        if authoritative.responsible == self.handler {
            return None;
        }
        Some(format!(
            "responsible mismatch: expected '{}', tracker says '{}'",
            self.handler, authoritative.responsible
        ))
    }

    fn check_week(&self, authoritative: &AuthoritativeTaskRecord) -> Option<String> {
        let start_ok = week::in_week(&authoritative.start_date, self.monday, self.sunday);
        let due_ok = week::in_week(&authoritative.due_date, self.monday, self.sunday);
        if start_ok && due_ok {
            return None;
        }
        Some(format!(
            "dates outside reference week {}..{}: start '{}', due '{}'",
            self.monday, self.sunday, authoritative.start_date, authoritative.due_date
        ))
    }

    fn check_description_hours(&self, authoritative: &AuthoritativeTaskRecord) -> Option<String> {
        if !self.require_description_hours {
            return None;
        }
        match extract_annotated_hours(&authoritative.description_html) {
            Some(hours) if hours > 0.0 => None,
            Some(hours) => Some(format!(
                "description estimate annotation must be positive, found {hours}"
            )),
            None => Some("description carries no estimate annotation".to_string()),
        }
    }
}

/// Estimated hours from the labeled annotation inside the description
/// markup: `预估工时/时长` followed by a colon (full- or half-width) and a
/// number. Returns the first occurrence that carries a parseable number.
pub fn extract_annotated_hours(html: &str) -> Option<f64> {
    const LABEL: &str = "预估工时/时长";

    let mut search_from = 0;
    while let Some(offset) = html[search_from..].find(LABEL) {
        let after_label = search_from + offset + LABEL.len();
        if let Some(hours) = number_after_colon(&html[after_label..]) {
            return Some(hours);
        }
        search_from = after_label;
    }
    None
}

fn number_after_colon(text: &str) -> Option<f64> {
    let mut chars = text.chars().peekable();
    match chars.next() {
        Some('：') | Some(':') => {}
        _ => return None,
    }
    while matches!(chars.peek(), Some(ch) if ch.is_whitespace()) {
        chars.next();
    }

    // Digits, then at most one dot followed by optional digits.
    let mut number = String::new();
    while matches!(chars.peek(), Some(ch) if ch.is_ascii_digit()) {
        number.push(chars.next().unwrap());
    }
    if number.is_empty() {
        return None;
    }
    if chars.peek() == Some(&'.') {
        number.push(chars.next().unwrap());
        while matches!(chars.peek(), Some(ch) if ch.is_ascii_digit()) {
            number.push(chars.next().unwrap());
        }
    }
    number.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 9).unwrap(),
        )
    }

    fn validator() -> Validator {
        Validator::new(
            vec!["已完成".to_string(), "已关闭".to_string()],
            "张三",
            week(),
            true,
        )
    }

    fn line_record() -> TaskLineRecord {
        TaskLineRecord {
            sequence: "1".to_string(),
            self_estimated_hours: 3.5,
            project: "ProjectA".to_string(),
            title: "Fix login bug".to_string(),
            link: "https://track.example/wp/42".to_string(),
            reported_value: 3.5,
        }
    }

    fn tracker_record() -> AuthoritativeTaskRecord {
        AuthoritativeTaskRecord {
            id: 42,
            subject: "Fix login bug".to_string(),
            status: "已完成".to_string(),
            project: "ProjectA".to_string(),
            responsible: "张三".to_string(),
            category: "任务".to_string(),
            estimated_time_iso: "PT3H30M".to_string(),
            start_date: "2026-08-03".to_string(),
            due_date: "2026-08-05".to_string(),
            completed_hours: 3.5,
            description_html: "<p>预估工时/时长：3.5</p>".to_string(),
        }
    }

    #[test]
    fn agreeing_pair_is_valid() {
        let report = validator().validate(&line_record(), &tracker_record());
        assert!(report.is_valid, "{:?}", report.discrepancies);
        assert!(report.discrepancies.is_empty());
    }

    #[test]
    fn two_mismatches_yield_two_discrepancies() {
        let mut tracker = tracker_record();
        tracker.subject = "Something else".to_string();
        tracker.responsible = "李四".to_string();

        let report = validator().validate(&line_record(), &tracker);
        assert!(!report.is_valid);
        assert_eq!(report.discrepancies.len(), 2, "{:?}", report.discrepancies);
        assert!(report.discrepancies[0].contains("title mismatch"));
        assert!(report.discrepancies[1].contains("responsible mismatch"));
    }

    #[test]
    fn status_outside_allow_list_fails() {
        let mut tracker = tracker_record();
        tracker.status = "进行中".to_string();
        let report = validator().validate(&line_record(), &tracker);
        assert_eq!(report.discrepancies.len(), 1);
        assert!(report.discrepancies[0].contains("not in allowed set"));
    }

    #[test]
    fn estimate_mismatch_uses_rounded_hours() {
        let mut tracker = tracker_record();
        tracker.estimated_time_iso = "PT3H".to_string();
        let report = validator().validate(&line_record(), &tracker);
        assert_eq!(report.discrepancies.len(), 1);
        assert!(report.discrepancies[0].contains("estimated hours mismatch"));
    }

    #[test]
    fn dates_outside_week_fail_once() {
        let mut tracker = tracker_record();
        tracker.start_date = "2026-07-28".to_string();
        tracker.due_date = "2026-08-10".to_string();
        let report = validator().validate(&line_record(), &tracker);
        // One discrepancy covers both out-of-range dates.
        assert_eq!(report.discrepancies.len(), 1);
        assert!(report.discrepancies[0].contains("outside reference week"));
    }

    #[test]
    fn missing_description_annotation_fails() {
        let mut tracker = tracker_record();
        tracker.description_html = "<p>nothing here</p>".to_string();
        let report = validator().validate(&line_record(), &tracker);
        assert_eq!(report.discrepancies.len(), 1);
        assert!(report.discrepancies[0].contains("no estimate annotation"));
    }

    #[test]
    fn zero_annotation_fails() {
        let mut tracker = tracker_record();
        tracker.description_html = "预估工时/时长: 0".to_string();
        let report = validator().validate(&line_record(), &tracker);
        assert_eq!(report.discrepancies.len(), 1);
        assert!(report.discrepancies[0].contains("must be positive"));
    }

    #[test]
    fn description_check_can_be_disabled() {
        let lax = Validator::new(
            vec!["已完成".to_string()],
            "张三",
            week(),
            false,
        );
        let mut tracker = tracker_record();
        tracker.description_html = String::new();
        let report = lax.validate(&line_record(), &tracker);
        assert!(report.is_valid, "{:?}", report.discrepancies);
    }

    #[test]
    fn annotation_accepts_both_colons() {
        assert_eq!(extract_annotated_hours("预估工时/时长：2.5"), Some(2.5));
        assert_eq!(extract_annotated_hours("预估工时/时长: 4"), Some(4.0));
        assert_eq!(extract_annotated_hours("预估工时/时长 2.5"), None);
    }

    #[test]
    fn annotation_skips_unparseable_occurrence() {
        let html = "预估工时/时长：待定 … 预估工时/时长：1.5";
        assert_eq!(extract_annotated_hours(html), Some(1.5));
    }
}
