//! repcheck check command implementation
//!
//! Full pipeline: parse the block, look up every record against the
//! tracker, reconcile, and report. Exits 3 when the report is not clean.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

use crate::block::{parse_block, BlockOptions, WhitespaceMode};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::report::{run_pipeline, ExportLabels, RecordResult, RunReport};
use crate::source::HttpTaskSource;
use crate::validate::Validator;
use crate::week;

/// Options for the check command
pub struct CheckOptions {
    pub file: Option<PathBuf>,
    pub handler: Option<String>,
    pub base_url: Option<String>,
    pub cookie: Option<String>,
    pub week_of: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run(options: CheckOptions) -> Result<()> {
    let config = super::load_config(&options.config)?;
    let block = super::read_block(&options.file)?;

    let handler = options
        .handler
        .unwrap_or_else(|| config.validation.handler.clone());
    if handler.trim().is_empty() {
        return Err(Error::InvalidArgument(
            "no handler configured; set validation.handler or pass --handler".to_string(),
        ));
    }

    let base_url = options
        .base_url
        .unwrap_or_else(|| config.tracker.base_url.clone());

    let cookie = match options.cookie {
        Some(cookie) => cookie,
        None => std::env::var(&config.tracker.cookie_env)
            .map_err(|_| Error::MissingCredential(config.tracker.cookie_env.clone()))?,
    };

    let reference_week = match &options.week_of {
        Some(date_str) => {
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| {
                Error::InvalidArgument(format!("--week-of expects YYYY-MM-DD, got '{date_str}'"))
            })?;
            week::week_of(date)
        }
        None => week::current_week(),
    };

    let whitespace = if config.parsing.strip_spaces {
        WhitespaceMode::StripSpaces
    } else {
        WhitespaceMode::Trim
    };
    let filter_name = if config.parsing.filter_by_handler {
        Some(handler.clone())
    } else {
        None
    };

    let parsed = parse_block(
        &block,
        &BlockOptions {
            whitespace,
            filter_name,
        },
    );

    let validator = Validator::new(
        config.validation.allowed_statuses.clone(),
        handler.clone(),
        reference_week,
        config.validation.require_description_hours,
    );
    let source = HttpTaskSource::new(&base_url, &cookie, Duration::from_secs(config.tracker.timeout_secs))?;
    let labels = ExportLabels {
        status_label: config.export.status_label.clone(),
        priority_label: config.export.priority_label.clone(),
        assignee: handler,
    };

    let report = run_pipeline(parsed, &validator, &source, &labels);

    let human = render_human(&report, reference_week);
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "check",
        &report,
        Some(&human),
    )?;

    if report.summary.is_clean() {
        Ok(())
    } else {
        Err(Error::ReportNotClean {
            invalid: report.summary.invalid + report.summary.missing_task_id,
            unmatched: report.summary.unmatched,
            failed: report.summary.lookup_failures,
        })
    }
}

fn render_human(report: &RunReport, reference_week: (NaiveDate, NaiveDate)) -> HumanOutput {
    let summary = &report.summary;
    let mut human = HumanOutput::new(format!(
        "Checked {} record(s) against week {}..{}",
        summary.matched, reference_week.0, reference_week.1
    ));
    human.push_summary("matched", summary.matched.to_string());
    human.push_summary("recovered", summary.recovered.to_string());
    human.push_summary("unmatched", summary.unmatched.to_string());
    human.push_summary("valid", summary.valid.to_string());
    human.push_summary("invalid", summary.invalid.to_string());
    if summary.missing_task_id > 0 {
        human.push_summary("missing task id", summary.missing_task_id.to_string());
    }
    if summary.lookup_failures > 0 {
        human.push_summary("lookup failures", summary.lookup_failures.to_string());
    }

    for outcome in &report.outcomes {
        let record = &outcome.record;
        match &outcome.result {
            RecordResult::Checked { report, .. } if report.is_valid => {
                human.push_detail(format!(
                    "{}. OK [{}] {}",
                    record.sequence, record.project, record.title
                ));
            }
            RecordResult::Checked { report, .. } => {
                for discrepancy in &report.discrepancies {
                    human.push_warning(format!("{}. {}: {}", record.sequence, record.title, discrepancy));
                }
            }
            RecordResult::LookupFailed { task_id, cause } => {
                human.push_warning(format!(
                    "{}. lookup failed for task {task_id}: {cause}",
                    record.sequence
                ));
            }
            RecordResult::MissingTaskId => {
                human.push_warning(format!(
                    "{}. link '{}' carries no /wp/<id> segment",
                    record.sequence, record.link
                ));
            }
        }
    }

    for unmatched in &report.unmatched {
        human.push_warning(format!(
            "unmatched ({}): {}",
            unmatched.reason.describe(),
            unmatched.line
        ));
    }
    for entry in &report.cleaned {
        human.push_detail(format!("cleaned: {} => {}", entry.original, entry.cleaned));
    }

    human
}
