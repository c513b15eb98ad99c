//! Command-line interface for repcheck
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Error, Result};

mod check;
mod init;
mod parse;

/// repcheck - report line validation
///
/// Parses chat-style task report lines, recovers malformed ones, and
/// reconciles each against the authoritative task tracker.
#[derive(Parser, Debug)]
#[command(name = "repcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file (defaults to ./.repcheck.toml)
    #[arg(long, global = true, env = "REPCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a report block without contacting the tracker
    Parse {
        /// Report file ("-" or absent reads stdin)
        file: Option<PathBuf>,

        /// Only trim line ends instead of stripping every space
        #[arg(long)]
        trim: bool,

        /// Keep only lines containing this name
        #[arg(long)]
        filter_name: Option<String>,
    },

    /// Parse, look up, and reconcile every record
    Check {
        /// Report file ("-" or absent reads stdin)
        file: Option<PathBuf>,

        /// Expected responsible name (overrides configuration)
        #[arg(long)]
        handler: Option<String>,

        /// Tracker endpoint (overrides configuration)
        #[arg(long)]
        base_url: Option<String>,

        /// Session cookie (falls back to the configured env var)
        #[arg(long)]
        cookie: Option<String>,

        /// Reference date for the validation week (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        week_of: Option<String>,
    },

    /// Write a starter .repcheck.toml
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Parse {
                file,
                trim,
                filter_name,
            } => parse::run(parse::ParseOptions {
                file,
                trim,
                filter_name,
                config: self.config,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Check {
                file,
                handler,
                base_url,
                cookie,
                week_of,
            } => check::run(check::CheckOptions {
                file,
                handler,
                base_url,
                cookie,
                week_of,
                config: self.config,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Init { force } => init::run(init::InitOptions {
                force,
                config: self.config,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }
}

/// Load configuration from the explicit path or the current directory.
pub(crate) fn load_config(path: &Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::load_from_dir(Path::new(".")),
    }
}

/// Read the report block from a file or stdin ("-" or absent).
pub(crate) fn read_block(file: &Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => {
            if !path.exists() {
                return Err(Error::InputNotFound(path.clone()));
            }
            Ok(std::fs::read_to_string(path)?)
        }
        _ => {
            let mut block = String::new();
            std::io::stdin().read_to_string(&mut block)?;
            Ok(block)
        }
    }
}
