//! repcheck init command implementation
//!
//! Writes a starter configuration file in the current directory.

use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};

/// Options for the init command
pub struct InitOptions {
    pub force: bool,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct InitReport {
    path: PathBuf,
    created: bool,
}

pub fn run(options: InitOptions) -> Result<()> {
    let path = options
        .config
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

    if path.exists() && !options.force {
        return Err(Error::InvalidArgument(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    Config::default().save(&path)?;

    let report = InitReport {
        path: path.clone(),
        created: true,
    };

    let mut human = HumanOutput::new(format!("Wrote {}", path.display()));
    human.push_next_step("set validation.handler to your tracker identity");
    human.push_next_step("set tracker.base_url to your work-package endpoint");

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "init",
        &report,
        Some(&human),
    )
}
