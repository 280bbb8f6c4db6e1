//! File content encoding.
//!
//! Contents are stored as standard base64 text (RFC 4648 alphabet, padded).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;

use crate::error::ReadError;
use crate::report::Reporter;

pub use base64::DecodeError;

/// Encodes raw bytes as base64 text.
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes base64 text back into the original bytes.
pub fn decode(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    STANDARD.decode(encoded)
}

/// Reads the whole file at `path` and returns its base64 text.
///
/// On success an `encoded: <path>` line is sent to `reporter` at debug level,
/// so the console only shows it in verbose mode.
///
/// # Errors
///
/// Returns a [`ReadError`] if the file cannot be opened or read, for example
/// when it is missing, unreadable, or a directory.
pub async fn encode_file(path: &Path, reporter: &dyn Reporter) -> Result<String, ReadError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let encoded = encode_bytes(&bytes);
    reporter.debug(&format!("encoded: {}", path.display()));
    Ok(encoded)
}
