//! In-memory filesystem snapshots.
//!
//! A snapshot is the ordered list of `(path, base64 content)` pairs produced by
//! one enumerate-and-encode pass. It is built once and only read afterwards,
//! through the JSON, CSV and TSV views.

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tokio::task;

use crate::encode::encode_file;
use crate::enumerate::{PathFilter, enumerate_in};
use crate::error::{BuildError, EnumerationError, ReadError};
use crate::report::Reporter;

pub const CSV_HEADER: &str = "filepath,content";
pub const TSV_HEADER: &str = "filepath\tcontent";

/// One file in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub path: String,
    /// Base64 text of the file's bytes at read time
    pub content: String,
}

impl FileEntry {
    pub fn new(path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().into_owned(),
            content: content.into(),
        }
    }
}

/// Options for [`FileSystemSnapshot::build`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Directory relative patterns are expanded against
    pub root: PathBuf,
    /// Maximum number of files read at once (0 = unbounded)
    pub max_concurrent_reads: usize,
}

impl BuildOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_concurrent_reads: 0,
        }
    }

    pub fn with_max_concurrent_reads(mut self, limit: usize) -> Self {
        self.max_concurrent_reads = limit;
        self
    }
}

/// An ordered, immutable collection of encoded files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSystemSnapshot {
    entries: Vec<FileEntry>,
}

impl FromIterator<FileEntry> for FileSystemSnapshot {
    fn from_iter<I: IntoIterator<Item = FileEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl FileSystemSnapshot {
    /// Enumerates `pattern`, then reads and encodes every match concurrently.
    ///
    /// Entries keep the enumeration order, not the order reads complete in.
    /// Any failure aborts the whole build; there is no partial snapshot.
    ///
    /// # Errors
    ///
    /// [`BuildError::Enumerate`] if the pattern cannot be expanded, and
    /// [`BuildError::Read`] if any matched file cannot be read.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fsnap::report::ConsoleReporter;
    /// use fsnap::snapshot::{BuildOptions, FileSystemSnapshot};
    ///
    /// # async fn example() -> Result<(), fsnap::error::BuildError> {
    /// let reporter = ConsoleReporter::new(false);
    /// let options = BuildOptions::new("/srv/notes").with_max_concurrent_reads(32);
    /// let snapshot = FileSystemSnapshot::build("*.md", &[], &options, &reporter).await?;
    /// println!("{}", snapshot.as_csv());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(
        pattern: &str,
        filters: &[PathFilter<'_>],
        options: &BuildOptions,
        reporter: &dyn Reporter,
    ) -> Result<Self, BuildError> {
        let enumerated = if filters.is_empty() {
            // Directory walking blocks, so keep it off the async workers.
            let root = options.root.clone();
            let owned_pattern = pattern.to_string();
            task::spawn_blocking(move || enumerate_in(&root, &owned_pattern, &[]))
                .await
                .map_err(|e| {
                    BuildError::Enumerate(EnumerationError::Unreadable {
                        path: options.root.clone(),
                        source: std::io::Error::other(e),
                    })
                })?
        } else {
            enumerate_in(&options.root, pattern, filters)
        };
        let paths = enumerated.map_err(BuildError::Enumerate)?;

        reporter.debug(&format!("matched {} file(s)", paths.len()));

        let limit = match options.max_concurrent_reads {
            0 => paths.len().max(1),
            n => n,
        };
        let pb = reporter.progress(paths.len() as u64);

        let encoded: Result<Vec<FileEntry>, ReadError> = stream::iter(paths)
            .map(|path| {
                let full_path = options.root.join(&path);
                let pb = pb.clone();

                async move {
                    let content = encode_file(&full_path, reporter).await?;
                    pb.inc(1);
                    Ok::<_, ReadError>(FileEntry {
                        path: path.to_string_lossy().into_owned(),
                        content,
                    })
                }
            })
            .buffered(limit)
            .try_collect()
            .await;

        pb.finish_and_clear();
        let entries = encoded.map_err(BuildError::Read)?;

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maps each path to its content, in enumeration order.
    ///
    /// A repeated path keeps the position of its first entry and the content
    /// of its last.
    pub fn to_map(&self) -> IndexMap<String, String> {
        self.entries
            .iter()
            .map(|entry| (entry.path.clone(), entry.content.clone()))
            .collect()
    }

    /// JSON object text of [`to_map`](Self::to_map).
    pub fn as_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_map())
    }

    /// CSV text: a `filepath,content` header, then one row per entry.
    ///
    /// Commas in paths are written as `\,`. Backslashes are not escaped, so
    /// a path that already contains `\,` cannot be told apart on reading.
    pub fn as_csv(&self) -> String {
        let rows = self
            .entries
            .iter()
            .map(|entry| format!("{},{}", entry.path.replace(',', "\\,"), entry.content));

        std::iter::once(CSV_HEADER.to_string())
            .chain(rows)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// TSV text: a `filepath<TAB>content` header, then one row per entry.
    pub fn as_tsv(&self) -> String {
        let rows = self
            .entries
            .iter()
            .map(|entry| format!("{}\t{}", entry.path, entry.content));

        std::iter::once(TSV_HEADER.to_string())
            .chain(rows)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Sum of the encoded content lengths, in bytes.
    pub fn encoded_size(&self) -> u64 {
        self.entries.iter().map(|e| e.content.len() as u64).sum()
    }
}

/// Splits a CSV body row into `(path, content)`.
///
/// The row is split at the first comma not preceded by a backslash, and `\,`
/// in the path is turned back into `,`. Returns `None` if the row has no
/// unescaped comma.
pub fn parse_csv_row(row: &str) -> Option<(String, String)> {
    let bytes = row.as_bytes();
    let split = (0..bytes.len())
        .find(|&i| bytes[i] == b',' && (i == 0 || bytes[i - 1] != b'\\'))?;

    let path = row[..split].replace("\\,", ",");
    let content = row[split + 1..].to_string();
    Some((path, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{decode, encode_bytes};
    use crate::report::{Level, MemoryReporter};
    use std::fs;
    use tempfile::TempDir;

    fn sample() -> FileSystemSnapshot {
        vec![
            FileEntry::new("a.txt", "aGk="),
            FileEntry::new("b.txt", "eW8="),
        ]
        .into_iter()
        .collect()
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "hi").unwrap();
        fs::write(dir.path().join("b.txt"), "yo").unwrap();
        dir
    }

    #[test]
    fn test_as_json() {
        assert_eq!(
            sample().as_json().unwrap(),
            r#"{"a.txt":"aGk=","b.txt":"eW8="}"#
        );
    }

    #[test]
    fn test_as_json_parses_back_to_map() {
        let snapshot = sample();
        let parsed: IndexMap<String, String> =
            serde_json::from_str(&snapshot.as_json().unwrap()).unwrap();

        assert_eq!(parsed, snapshot.to_map());
    }

    #[test]
    fn test_as_csv() {
        assert_eq!(sample().as_csv(), "filepath,content\na.txt,aGk=\nb.txt,eW8=");
    }

    #[test]
    fn test_as_tsv() {
        assert_eq!(sample().as_tsv(), "filepath\tcontent\na.txt\taGk=\nb.txt\teW8=");
    }

    #[test]
    fn test_empty_snapshot_views() {
        let snapshot = FileSystemSnapshot::default();

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.as_json().unwrap(), "{}");
        assert_eq!(snapshot.as_csv(), CSV_HEADER);
        assert_eq!(snapshot.as_tsv(), TSV_HEADER);
    }

    #[test]
    fn test_csv_escapes_commas_in_paths() {
        let snapshot: FileSystemSnapshot =
            std::iter::once(FileEntry::new("a,b,c.txt", "aGk=")).collect();

        let csv = snapshot.as_csv();
        let row = csv.lines().nth(1).unwrap();

        assert_eq!(row, "a\\,b\\,c.txt,aGk=");
        assert_eq!(
            parse_csv_row(row),
            Some(("a,b,c.txt".to_string(), "aGk=".to_string()))
        );
        // Stored path is untouched.
        assert_eq!(snapshot.entries()[0].path, "a,b,c.txt");
    }

    #[test]
    fn test_parse_csv_row_without_comma() {
        assert_eq!(parse_csv_row("no-separator"), None);
        assert_eq!(parse_csv_row("only\\,escaped"), None);
    }

    #[test]
    fn test_duplicate_paths() {
        let snapshot: FileSystemSnapshot = vec![
            FileEntry::new("a.txt", "Zmlyc3Q="),
            FileEntry::new("a.txt", "c2Vjb25k"),
        ]
        .into_iter()
        .collect();

        let map = snapshot.to_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map["a.txt"], "c2Vjb25k");

        assert_eq!(snapshot.as_tsv().lines().count(), 3);
        assert_eq!(snapshot.as_csv().lines().count(), 3);
    }

    #[test]
    fn test_duplicate_path_keeps_first_position() {
        let snapshot: FileSystemSnapshot = vec![
            FileEntry::new("z.txt", "MQ=="),
            FileEntry::new("a.txt", "Mg=="),
            FileEntry::new("z.txt", "Mw=="),
        ]
        .into_iter()
        .collect();

        assert_eq!(snapshot.as_json().unwrap(), r#"{"z.txt":"Mw==","a.txt":"Mg=="}"#);
    }

    #[tokio::test]
    async fn test_json_follows_enumeration_order() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("a-b")).unwrap();
        fs::write(dir.path().join("a").join("x.txt"), "hi").unwrap();
        fs::write(dir.path().join("a-b").join("x.txt"), "yo").unwrap();
        let reporter = MemoryReporter::default();

        let snapshot = FileSystemSnapshot::build("*/x.txt", &[], &BuildOptions::new(dir.path()), &reporter)
            .await
            .unwrap();

        let order: Vec<_> = snapshot.entries().iter().map(|e| e.path.as_str()).collect();
        let keys: Vec<_> = snapshot.to_map().keys().cloned().collect();
        assert_eq!(keys, order);
        assert_eq!(
            snapshot.as_json().unwrap(),
            format!(r#"{{"{}":"aGk=","{}":"eW8="}}"#, order[0], order[1])
        );
        assert_eq!(
            snapshot.as_csv(),
            format!("filepath,content\n{},aGk=\n{},eW8=", order[0], order[1])
        );
    }

    #[test]
    fn test_encoded_size() {
        assert_eq!(sample().encoded_size(), 8);
    }

    #[tokio::test]
    async fn test_build_encodes_matches_in_order() {
        let dir = fixture();
        let reporter = MemoryReporter::default();
        let options = BuildOptions::new(dir.path());

        let snapshot = FileSystemSnapshot::build("*.txt", &[], &options, &reporter)
            .await
            .unwrap();

        assert_eq!(snapshot, sample());
        assert!(reporter.has(Level::Debug, "encoded: "));
    }

    #[tokio::test]
    async fn test_build_with_filters() {
        let dir = fixture();
        let reporter = MemoryReporter::default();
        let options = BuildOptions::new(dir.path());
        let skip_a = |p: &Path| p != Path::new("a.txt");

        let snapshot = FileSystemSnapshot::build("*.txt", &[&skip_a], &options, &reporter)
            .await
            .unwrap();

        assert_eq!(snapshot.entries(), &[FileEntry::new("b.txt", "eW8=")]);
    }

    #[tokio::test]
    async fn test_build_order_with_single_reader() {
        let dir = TempDir::new().unwrap();
        for i in 0..20 {
            fs::write(dir.path().join(format!("f{:02}.bin", i)), vec![i as u8; i * 100]).unwrap();
        }
        let reporter = MemoryReporter::default();

        for limit in [0, 1, 3] {
            let options = BuildOptions::new(dir.path()).with_max_concurrent_reads(limit);
            let snapshot = FileSystemSnapshot::build("*.bin", &[], &options, &reporter)
                .await
                .unwrap();

            let names: Vec<_> = snapshot.entries().iter().map(|e| e.path.clone()).collect();
            let expected: Vec<_> = (0..20).map(|i| format!("f{:02}.bin", i)).collect();
            assert_eq!(names, expected);

            let last = &snapshot.entries()[19];
            assert_eq!(decode(&last.content).unwrap(), vec![19u8; 1900]);
        }
    }

    #[tokio::test]
    async fn test_build_map_matches_file_contents() {
        let dir = fixture();
        fs::write(dir.path().join("bin.txt"), [0u8, 1, 2, 255]).unwrap();
        let reporter = MemoryReporter::default();

        let snapshot = FileSystemSnapshot::build("*.txt", &[], &BuildOptions::new(dir.path()), &reporter)
            .await
            .unwrap();
        let map = snapshot.to_map();

        assert_eq!(map.len(), 3);
        assert_eq!(map["bin.txt"], encode_bytes(&[0, 1, 2, 255]));
        assert_eq!(map["a.txt"], encode_bytes(b"hi"));
    }

    #[tokio::test]
    async fn test_build_no_matches() {
        let dir = fixture();
        let reporter = MemoryReporter::default();

        let snapshot = FileSystemSnapshot::build("*.csv", &[], &BuildOptions::new(dir.path()), &reporter)
            .await
            .unwrap();

        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_build_invalid_pattern_is_enumerate_error() {
        let dir = fixture();
        let reporter = MemoryReporter::default();

        let err = FileSystemSnapshot::build("[", &[], &BuildOptions::new(dir.path()), &reporter)
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::Enumerate(EnumerationError::InvalidPattern { .. })));
    }

    #[tokio::test]
    async fn test_build_unreadable_file_fails_whole_batch() {
        let dir = fixture();
        let reporter = MemoryReporter::default();
        // Matches the pattern but removed before it can be read.
        let vanish = |p: &Path| {
            if p == Path::new("a.txt") {
                let _ = std::fs::remove_file(dir.path().join(p));
            }
            true
        };

        let err = FileSystemSnapshot::build("*.txt", &[&vanish], &BuildOptions::new(dir.path()), &reporter)
            .await
            .unwrap_err();

        match err {
            BuildError::Read(read) => assert_eq!(read.path, dir.path().join("a.txt")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
