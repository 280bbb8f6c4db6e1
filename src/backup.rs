//! The `backup` command.
//!
//! Validates the request, builds a snapshot of every file matching the
//! pattern, serializes it in the requested format and writes it to the
//! destination. The destination is only touched once the snapshot and its
//! serialization have both succeeded, and then it is replaced in one rename,
//! so a failed run never leaves a truncated or partially written file behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use tempfile::NamedTempFile;

use crate::cli::Format;
use crate::enumerate::PathFilter;
use crate::error::{BuildError, UsageError, WriteError};
use crate::report::{Reporter, format_size};
use crate::snapshot::{BuildOptions, FileSystemSnapshot};

/// A single `backup` invocation.
#[derive(Debug, Clone)]
pub struct BackupRequest {
    pub pattern: String,
    pub out_file: PathBuf,
    pub format: Format,
}

impl BackupRequest {
    fn validate(&self) -> Result<(), UsageError> {
        if self.pattern.is_empty() {
            return Err(UsageError::MissingPattern);
        }
        if self.out_file.as_os_str().is_empty() {
            return Err(UsageError::MissingOutFile);
        }
        Ok(())
    }
}

/// Serializes `snapshot` in `format`.
pub fn render(snapshot: &FileSystemSnapshot, format: Format) -> Result<String, WriteError> {
    match format {
        Format::Json => snapshot.as_json().map_err(WriteError::Serialize),
        Format::Csv => Ok(snapshot.as_csv()),
        Format::Tsv => Ok(snapshot.as_tsv()),
    }
}

fn has_format_extension(path: &Path, format: Format) -> bool {
    let suffix = format!(".{}", format.extension());
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().ends_with(&suffix))
}

/// Writes `contents` to a temporary file next to `path` and renames it over
/// `path`. The temporary file is removed if any step fails.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), WriteError> {
    let io_error = |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = path.parent().unwrap_or(Path::new("."));
    let mut file = NamedTempFile::new_in(parent).map_err(io_error)?;
    file.write_all(contents).map_err(io_error)?;
    file.persist(path).map_err(|err| io_error(err.error))?;
    Ok(())
}

/// Runs a backup and returns the absolute path of the written file.
///
/// Relative output paths are resolved against `options.root`.
///
/// # Errors
///
/// Returns a [`UsageError`] for an invalid request, a [`BuildError`] if the
/// files cannot be enumerated or read, and a [`WriteError`] if the output
/// cannot be produced.
pub async fn handle_backup(
    request: &BackupRequest,
    options: &BuildOptions,
    reporter: &dyn Reporter,
) -> color_eyre::Result<PathBuf> {
    handle_backup_with_filters(request, &[], options, reporter).await
}

/// Like [`handle_backup`], but only files accepted by every filter are
/// backed up.
pub async fn handle_backup_with_filters(
    request: &BackupRequest,
    filters: &[PathFilter<'_>],
    options: &BuildOptions,
    reporter: &dyn Reporter,
) -> color_eyre::Result<PathBuf> {
    request.validate()?;

    if !has_format_extension(&request.out_file, request.format) {
        reporter.warn(&format!(
            "Output file {} does not end with .{}",
            request.out_file.display(),
            request.format
        ));
    }

    let out_path = std::path::absolute(options.root.join(&request.out_file)).map_err(|source| {
        WriteError::Resolve {
            path: request.out_file.clone(),
            source,
        }
    })?;

    reporter.info(&format!(
        "Backing up '{}' from {}",
        request.pattern,
        options.root.display()
    ));

    let snapshot = FileSystemSnapshot::build(&request.pattern, filters, options, reporter)
        .await
        .inspect_err(|err| {
            if let BuildError::Enumerate(_) = err {
                reporter.error(&format!(
                    "Could not expand pattern '{}' in {}",
                    request.pattern,
                    options.root.display()
                ));
            }
        })
        .wrap_err_with(|| format!("backing up '{}'", request.pattern))?;

    reporter.debug(&format!("encoded {} file(s)", snapshot.len()));

    let contents = render(&snapshot, request.format)?;

    let target = out_path.clone();
    tokio::task::spawn_blocking(move || write_atomically(&target, contents.as_bytes()))
        .await?
        .wrap_err_with(|| format!("writing {}", out_path.display()))?;

    reporter.success(&format!("Backup written to {}", out_path.display()));
    reporter.info(&format!(
        "{} file(s), {} encoded",
        snapshot.len(),
        format_size(snapshot.encoded_size())
    ));

    Ok(out_path)
}
