//! Document reading
//!
//! All documents are read before any check runs. Non-UTF-8 bytes are replaced
//! (lossy conversion) so a single odd file never aborts a run; an unreadable
//! file does.

use std::fs;
use std::path::Path;

use crate::core::error::LintError;

/// Result of reading one file
#[derive(Debug, Clone)]
pub struct FileReadResult {
    /// The decoded file content
    pub content: String,

    /// Whether invalid UTF-8 was replaced
    pub lossy_conversion: bool,
}

/// Read a file as text, decoding lossily when it is not valid UTF-8
pub fn read_text(path: &Path) -> Result<FileReadResult, LintError> {
    let bytes = fs::read(path).map_err(|source| LintError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(decode(bytes))
}

fn decode(bytes: Vec<u8>) -> FileReadResult {
    match String::from_utf8(bytes) {
        Ok(content) => FileReadResult {
            content,
            lossy_conversion: false,
        },
        Err(err) => FileReadResult {
            content: String::from_utf8_lossy(err.as_bytes()).into_owned(),
            lossy_conversion: true,
        },
    }
}
