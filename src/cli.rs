// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ConfigOverrides;

/// Command-line arguments for `examsim`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "examsim",
    version,
    about = "Sit a timed, self-graded programming exam with a Python sandbox.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the exam file (TOML).
    #[arg(long, value_name = "PATH", default_value = "exam.toml")]
    pub config: String,

    /// Time limit in minutes; overrides `[exam].minutes`.
    #[arg(long, value_name = "N", conflicts_with = "unlimited")]
    pub minutes: Option<u64>,

    /// No time limit.
    #[arg(long)]
    pub unlimited: bool,

    /// Where `export` writes `exam_answers.json` and `exam_submission.py`.
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `EXAMSIM_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the exam, but don't start it.
    #[arg(long)]
    pub dry_run: bool,

    /// Print answers left behind by an interrupted attempt and exit.
    #[arg(long)]
    pub recover: bool,
}

impl CliArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            minutes: self.minutes,
            unlimited: self.unlimited,
            export_dir: self.export_dir.clone(),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
