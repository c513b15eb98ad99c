//! Run pipeline: parsed block → per-record lookup → reconciliation
//!
//! Strictly sequential: one blocking lookup per matched record, in input
//! order, no state shared between records. A failed lookup is fatal for
//! its record only; the batch always runs to completion.

use serde::Serialize;

use crate::block::{BlockParse, CleanedLine, UnmatchedLine};
use crate::record::TaskLineRecord;
use crate::source::{AuthoritativeTaskRecord, TaskSource};
use crate::validate::{self, ValidationReport, Validator};

/// What happened to one matched record.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordResult {
    /// Lookup succeeded and reconciliation ran.
    Checked {
        report: ValidationReport,
        authoritative: AuthoritativeTaskRecord,
    },
    /// The lookup failed; the record could not be checked.
    LookupFailed { task_id: u64, cause: String },
    /// The link carries no `/wp/<id>` segment; dropped before validation.
    MissingTaskId,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordOutcome {
    pub record: TaskLineRecord,
    #[serde(flatten)]
    pub result: RecordResult,
}

/// Labels and identity the export rows need beyond the record pair.
#[derive(Debug, Clone)]
pub struct ExportLabels {
    pub status_label: String,
    pub priority_label: String,
    pub assignee: String,
}

/// One spreadsheet row for a valid record; the boundary artifact handed
/// to the report-filling collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
    pub project: String,
    pub task_id: u64,
    pub title: String,
    pub link: String,
    pub status: String,
    pub priority: String,
    pub start_date: String,
    pub due_date: String,
    pub assignee: String,
    /// Estimate from the description annotation, 0.0 when absent.
    pub estimated_hours: f64,
    pub completed_hours: f64,
    /// The tracker records completion on the due date.
    pub completion_date: String,
    pub self_estimated_hours: f64,
}

impl ExportRow {
    fn build(
        record: &TaskLineRecord,
        authoritative: &AuthoritativeTaskRecord,
        task_id: u64,
        labels: &ExportLabels,
    ) -> Self {
        ExportRow {
            project: record.project.clone(),
            task_id,
            title: record.title.clone(),
            link: record.link.clone(),
            status: labels.status_label.clone(),
            priority: labels.priority_label.clone(),
            start_date: authoritative.start_date.clone(),
            due_date: authoritative.due_date.clone(),
            assignee: labels.assignee.clone(),
            estimated_hours: validate::extract_annotated_hours(&authoritative.description_html)
                .unwrap_or(0.0),
            completed_hours: authoritative.completed_hours,
            completion_date: authoritative.due_date.clone(),
            self_estimated_hours: record.self_estimated_hours,
        }
    }
}

/// Run-level counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub matched: usize,
    pub recovered: usize,
    pub unmatched: usize,
    pub valid: usize,
    pub invalid: usize,
    pub missing_task_id: usize,
    pub lookup_failures: usize,
}

impl RunSummary {
    /// Whether anything in the run needs attention.
    pub fn is_clean(&self) -> bool {
        self.unmatched == 0
            && self.invalid == 0
            && self.missing_task_id == 0
            && self.lookup_failures == 0
    }
}

/// Everything one run produces.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<RecordOutcome>,
    pub unmatched: Vec<UnmatchedLine>,
    pub cleaned: Vec<CleanedLine>,
    pub export_rows: Vec<ExportRow>,
    pub summary: RunSummary,
}

/// Reconcile every matched record of a parsed block against the task
/// source.
pub fn run_pipeline(
    parsed: BlockParse,
    validator: &Validator,
    source: &dyn TaskSource,
    labels: &ExportLabels,
) -> RunReport {
    let mut summary = RunSummary {
        matched: parsed.matched.len(),
        recovered: parsed.recovered,
        unmatched: parsed.unmatched.len(),
        ..RunSummary::default()
    };

    let mut outcomes = Vec::with_capacity(parsed.matched.len());
    let mut export_rows = Vec::new();

    for record in parsed.matched {
        let result = check_record(&record, validator, source, &mut summary);
        if let RecordResult::Checked {
            report,
            authoritative,
        } = &result
        {
            if report.is_valid {
                // task_id() is Some here: the id check passed.
                if let Some(task_id) = record.task_id() {
                    export_rows.push(ExportRow::build(&record, authoritative, task_id, labels));
                }
            }
        }
        outcomes.push(RecordOutcome { record, result });
    }

    RunReport {
        outcomes,
        unmatched: parsed.unmatched,
        cleaned: parsed.cleaned,
        export_rows,
        summary,
    }
}

fn check_record(
    record: &TaskLineRecord,
    validator: &Validator,
    source: &dyn TaskSource,
    summary: &mut RunSummary,
) -> RecordResult {
    let Some(task_id) = record.task_id() else {
        summary.missing_task_id += 1;
        tracing::warn!(link = %record.link, "record dropped: no task id in link");
        return RecordResult::MissingTaskId;
    };

    match source.fetch(task_id) {
        Ok(authoritative) => {
            let report = validator.validate(record, &authoritative);
            if report.is_valid {
                summary.valid += 1;
            } else {
                summary.invalid += 1;
            }
            RecordResult::Checked {
                report,
                authoritative,
            }
        }
        Err(err) => {
            summary.lookup_failures += 1;
            tracing::warn!(task_id, %err, "lookup failed");
            RecordResult::LookupFailed {
                task_id,
                cause: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{parse_block, BlockOptions, WhitespaceMode};
    use crate::source::StaticTaskSource;
    use crate::validate::Validator;
    use chrono::NaiveDate;

    fn options() -> BlockOptions {
        BlockOptions {
            whitespace: WhitespaceMode::Trim,
            ..Default::default()
        }
    }

    fn labels() -> ExportLabels {
        ExportLabels {
            status_label: "已完成".to_string(),
            priority_label: "中".to_string(),
            assignee: "张三".to_string(),
        }
    }

    fn validator() -> Validator {
        Validator::new(
            vec!["已完成".to_string()],
            "张三",
            (
                NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
                NaiveDate::from_ymd_opt(2026, 8, 9).unwrap(),
            ),
            true,
        )
    }

    fn tracker_record(id: u64, subject: &str, project: &str) -> AuthoritativeTaskRecord {
        AuthoritativeTaskRecord {
            id,
            subject: subject.to_string(),
            status: "已完成".to_string(),
            project: project.to_string(),
            responsible: "张三".to_string(),
            category: "任务".to_string(),
            estimated_time_iso: "PT3H30M".to_string(),
            start_date: "2026-08-03".to_string(),
            due_date: "2026-08-05".to_string(),
            completed_hours: 3.5,
            description_html: "预估工时/时长：3.5".to_string(),
        }
    }

    #[test]
    fn lookup_failure_does_not_stop_the_batch() {
        let block = "\
1.【3.5】ProjectA【Fix login bug】https://track.example/wp/42【3.5】
2.【3.5】ProjectA【Fix login bug】https://track.example/wp/999【3.5】
3.【3.5】ProjectA【Fix login bug】https://track.example/wp/42【3.5】";
        let source = StaticTaskSource::new([tracker_record(42, "Fix login bug", "ProjectA")]);
        let parsed = parse_block(block, &options());

        let report = run_pipeline(parsed, &validator(), &source, &labels());

        assert_eq!(report.summary.matched, 3);
        assert_eq!(report.summary.valid, 2);
        assert_eq!(report.summary.lookup_failures, 1);
        assert!(matches!(
            report.outcomes[1].result,
            RecordResult::LookupFailed { task_id: 999, .. }
        ));
        assert!(!report.summary.is_clean());
    }

    #[test]
    fn record_without_task_id_is_dropped_before_validation() {
        let block = "1.【3.5】ProjectA【Fix login bug】https://track.example/notes/42【3.5】";
        let source = StaticTaskSource::default();
        let parsed = parse_block(block, &options());

        let report = run_pipeline(parsed, &validator(), &source, &labels());

        assert_eq!(report.summary.missing_task_id, 1);
        assert_eq!(report.summary.valid + report.summary.invalid, 0);
        assert!(matches!(
            report.outcomes[0].result,
            RecordResult::MissingTaskId
        ));
    }

    #[test]
    fn export_rows_only_for_valid_records() {
        let block = "\
1.【3.5】ProjectA【Fix login bug】https://track.example/wp/42【3.5】
2.【3.5】ProjectB【Wrong title】https://track.example/wp/43【3.5】";
        let source = StaticTaskSource::new([
            tracker_record(42, "Fix login bug", "ProjectA"),
            tracker_record(43, "Real title", "ProjectB"),
        ]);
        let parsed = parse_block(block, &options());

        let report = run_pipeline(parsed, &validator(), &source, &labels());

        assert_eq!(report.summary.valid, 1);
        assert_eq!(report.summary.invalid, 1);
        assert_eq!(report.export_rows.len(), 1);

        let row = &report.export_rows[0];
        assert_eq!(row.task_id, 42);
        assert_eq!(row.status, "已完成");
        assert_eq!(row.priority, "中");
        assert_eq!(row.estimated_hours, 3.5);
        assert_eq!(row.completion_date, row.due_date);
    }
}
