//! Error types for entity extraction.
//!
//! Extraction has exactly two failure modes (§7): the file extension maps to no
//! known language, or the parser rejects the input. Every other operation in
//! this crate is total — matching, merging, and reconstruction never fail.

use std::fmt;
use std::path::PathBuf;

/// Errors produced by [`crate::extract`].
#[derive(Debug)]
pub enum ExtractError {
    /// No language is registered for this file's extension.
    UnsupportedFileType {
        /// The path whose extension could not be mapped to a language.
        path: PathBuf,
    },
    /// The parser rejected the input (or the language grammar itself could not
    /// be loaded).
    ParseFailed {
        /// The path being parsed.
        path: PathBuf,
        /// Human-readable detail from the underlying parser setup, if any.
        detail: String,
    },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFileType { path } => {
                write!(f, "no language registered for '{}'", path.display())
            }
            Self::ParseFailed { path, detail } => {
                write!(f, "failed to parse '{}': {detail}", path.display())
            }
        }
    }
}

impl std::error::Error for ExtractError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unsupported_file_type() {
        let err = ExtractError::UnsupportedFileType {
            path: PathBuf::from("notes.txt"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("notes.txt"));
        assert!(msg.contains("no language registered"));
    }

    #[test]
    fn display_parse_failed() {
        let err = ExtractError::ParseFailed {
            path: PathBuf::from("main.rs"),
            detail: "unexpected EOF".to_owned(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("main.rs"));
        assert!(msg.contains("unexpected EOF"));
    }
}
