//! Glob pattern expansion.
//!
//! Expands a pattern against a root directory and narrows the matches with
//! caller-supplied predicates. Only regular files are returned, in the order
//! the glob walker yields them.

use std::path::{Component, Path, PathBuf};

use crate::error::EnumerationError;

/// A predicate a path must satisfy to stay in the result.
pub type PathFilter<'a> = &'a dyn Fn(&Path) -> bool;

const GLOB_META: &[char] = &['*', '?', '['];

/// Expands `pattern` against the current working directory.
///
/// Relative patterns yield paths relative to the working directory.
pub fn enumerate(
    pattern: &str,
    filters: &[PathFilter<'_>],
) -> Result<Vec<PathBuf>, EnumerationError> {
    let root = std::env::current_dir().map_err(|source| EnumerationError::Unreadable {
        path: PathBuf::from("."),
        source,
    })?;
    enumerate_in(&root, pattern, filters)
}

/// Expands `pattern` against `root`.
///
/// A path survives only if every filter returns `true`; filters are applied
/// left to right.
///
/// # Errors
///
/// Fails if the pattern is empty or malformed, if its literal directory prefix
/// does not exist, or if a directory cannot be read during expansion.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use fsnap::enumerate::enumerate_in;
///
/// # fn main() -> Result<(), fsnap::error::EnumerationError> {
/// let not_hidden = |p: &Path| !p.to_string_lossy().starts_with('.');
/// let paths = enumerate_in(Path::new("/srv/notes"), "**/*.md", &[&not_hidden])?;
/// println!("{} notes", paths.len());
/// # Ok(())
/// # }
/// ```
pub fn enumerate_in(
    root: &Path,
    pattern: &str,
    filters: &[PathFilter<'_>],
) -> Result<Vec<PathBuf>, EnumerationError> {
    if pattern.is_empty() {
        return Err(EnumerationError::EmptyPattern);
    }

    glob::Pattern::new(pattern).map_err(|source| EnumerationError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let absolute = Path::new(pattern).is_absolute();

    let prefix = literal_dir_prefix(pattern);
    if !prefix.as_os_str().is_empty() {
        let base = if absolute { prefix } else { root.join(prefix) };
        if !base.is_dir() {
            return Err(EnumerationError::MissingRoot { root: base });
        }
    }

    let full_pattern = if absolute {
        pattern.to_string()
    } else {
        format!(
            "{}{}{}",
            glob::Pattern::escape(&root.to_string_lossy()),
            std::path::MAIN_SEPARATOR,
            pattern
        )
    };

    let entries = glob::glob(&full_pattern).map_err(|source| EnumerationError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| EnumerationError::Unreadable {
            path: e.path().to_path_buf(),
            source: e.into_error(),
        })?;

        if !path.is_file() {
            continue;
        }

        let path = if absolute {
            path
        } else {
            match path.strip_prefix(root) {
                Ok(relative) => relative.to_path_buf(),
                Err(_) => path,
            }
        };
        paths.push(path);
    }

    Ok(filters.iter().fold(paths, |paths, keep| {
        paths.into_iter().filter(|path| keep(path.as_path())).collect()
    }))
}

/// Leading directory components of `pattern` that contain no wildcards.
///
/// The final component is never included, since it names the files matched.
fn literal_dir_prefix(pattern: &str) -> PathBuf {
    let components: Vec<Component<'_>> = Path::new(pattern).components().collect();
    let dirs = components.len().saturating_sub(1);

    components
        .into_iter()
        .take(dirs)
        .take_while(|c| !c.as_os_str().to_string_lossy().contains(GLOB_META))
        .collect()
}
