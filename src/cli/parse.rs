//! repcheck parse command implementation
//!
//! Offline parsing: grammar plus recovery, no tracker lookups.

use std::path::PathBuf;

use crate::block::{parse_block, BlockOptions, WhitespaceMode};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

/// Options for the parse command
pub struct ParseOptions {
    pub file: Option<PathBuf>,
    pub trim: bool,
    pub filter_name: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run(options: ParseOptions) -> Result<()> {
    let config = super::load_config(&options.config)?;
    let block = super::read_block(&options.file)?;

    let whitespace = if options.trim || !config.parsing.strip_spaces {
        WhitespaceMode::Trim
    } else {
        WhitespaceMode::StripSpaces
    };

    let filter_name = options.filter_name.or_else(|| {
        if config.parsing.filter_by_handler && !config.validation.handler.is_empty() {
            Some(config.validation.handler.clone())
        } else {
            None
        }
    });

    let parsed = parse_block(
        &block,
        &BlockOptions {
            whitespace,
            filter_name,
        },
    );

    let mut human = HumanOutput::new(format!(
        "Parsed {} line(s), {} unmatched",
        parsed.matched.len(),
        parsed.unmatched.len()
    ));
    human.push_summary("matched", parsed.matched.len().to_string());
    human.push_summary("recovered", parsed.recovered.to_string());
    human.push_summary("unmatched", parsed.unmatched.len().to_string());

    for record in &parsed.matched {
        human.push_detail(format!(
            "{}. [{}] {} -> {}",
            record.sequence, record.project, record.title, record.link
        ));
    }
    for entry in &parsed.cleaned {
        human.push_detail(format!("cleaned: {} => {}", entry.original, entry.cleaned));
    }
    for unmatched in &parsed.unmatched {
        human.push_warning(format!(
            "unmatched ({}): {}",
            unmatched.reason.describe(),
            unmatched.line
        ));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "parse",
        &parsed,
        Some(&human),
    )
}
