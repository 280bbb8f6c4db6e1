//! Command-line interface definitions.
//!
//! This module defines the CLI structure using clap, including all commands
//! and their arguments.

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::UsageError;

#[derive(Parser)]
#[command(name = "fsnap")]
#[command(about = "Snapshot files matching a glob pattern into one base64-encoded file")]
#[command(version)]
pub struct Args {
    /// Path to a TOML config file (default: ~/.config/fsnap/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode every file matching a pattern into a single output file
    Backup {
        /// Glob pattern, relative to the current directory (e.g. "src/**/*.rs")
        pattern: String,

        /// Destination file
        #[arg(default_value = "./backup.json")]
        out_file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Print a line for every encoded file
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Serialization format of the backup file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Format {
    /// JSON object mapping path to content
    #[default]
    Json,
    /// `filepath,content` rows, commas in paths escaped as `\,`
    Csv,
    /// `filepath<TAB>content` rows
    Tsv,
}

impl Format {
    /// File extension expected for this format, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Csv => "csv",
            Format::Tsv => "tsv",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Format::Json),
            "csv" => Ok(Format::Csv),
            "tsv" => Ok(Format::Tsv),
            other => Err(UsageError::UnsupportedFormat(other.to_string())),
        }
    }
}
