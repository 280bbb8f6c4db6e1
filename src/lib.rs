//! # fsnap - Glob-to-file snapshot tool
//!
//! fsnap reads every file matching a glob pattern, encodes each file's bytes as
//! base64 and writes the whole `path -> content` collection into a single JSON,
//! CSV or TSV file. Files are read concurrently; the output keeps the order the
//! pattern enumerated them in.
//!
//! ## Command Line Usage
//!
//! ```bash
//! # Everything under src/ as JSON (written to ./backup.json)
//! fsnap backup "src/**/*"
//!
//! # Text files as CSV
//! fsnap backup "*.txt" notes.csv --format csv
//!
//! # Show each encoded file
//! fsnap backup "**/*.toml" configs.tsv --format tsv --verbose
//! ```
//!
//! A run either writes one complete output file and exits with status 0, or
//! writes nothing and exits with status 1.
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use fsnap::report::ConsoleReporter;
//! use fsnap::snapshot::{BuildOptions, FileSystemSnapshot};
//!
//! #[tokio::main]
//! async fn main() -> color_eyre::Result<()> {
//!     let reporter = ConsoleReporter::new(false);
//!     let options = BuildOptions::new(std::env::current_dir()?);
//!
//!     let snapshot = FileSystemSnapshot::build("*.txt", &[], &options, &reporter).await?;
//!     println!("{}", snapshot.as_json()?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! An optional TOML file at `~/.config/fsnap/config.toml` (or `--config`)
//! sets the read concurrency cap and the console color theme.
//!
//! ## Module Organization
//!
//! - [`backup`]: The backup command workflow
//! - [`cli`]: Command-line argument parsing
//! - [`config`]: Configuration management
//! - [`encode`]: Base64 content encoding
//! - [`enumerate`]: Glob pattern expansion
//! - [`error`]: Error types
//! - [`report`]: Diagnostic output
//! - [`snapshot`]: Snapshot building and serialization

pub mod backup;
pub mod cli;
pub mod config;
pub mod encode;
pub mod enumerate;
pub mod error;
pub mod report;
pub mod snapshot;

// Re-export commonly used types
pub use config::Config;
pub use snapshot::{BuildOptions, FileEntry, FileSystemSnapshot};
