//! Fatal input errors
//!
//! Anything that prevents a lint run from producing a report at all. Problems
//! inside a document are never errors: they become findings.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LintError {
    #[error("root directory '{}' does not exist", .0.display())]
    RootMissing(PathBuf),

    #[error("'{}' is not a directory", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("no Markdown files found under '{}'", .0.display())]
    NoDocuments(PathBuf),

    #[error("failed to read '{}'", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk '{}': {message}", path.display())]
    Walk { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_path() {
        let err = LintError::RootMissing(PathBuf::from("/nope"));
        assert_eq!(err.to_string(), "root directory '/nope' does not exist");

        let err = LintError::NoDocuments(PathBuf::from("docs"));
        assert!(err.to_string().contains("docs"));
    }

    #[test]
    fn test_unreadable_keeps_source() {
        let err = LintError::Unreadable {
            path: PathBuf::from("a.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("a.md"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
