//! Error types for statement parsing and write detection.
//!
//! Malformed SQL is never an error: the lexer and parser degrade to a flat
//! token sequence instead. The one hard failure is input nested deeper than
//! the configured bound, which surfaces as [`AnalysisError::Unparsable`].

use thiserror::Error;

/// Failure to build a statement tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Parentheses nest deeper than the configured maximum.
    #[error("parenthesis nesting exceeds the maximum depth of {limit} at byte {offset}")]
    NestingTooDeep { limit: usize, offset: usize },
}

/// Failure to classify a SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The text could not be parsed, so its write status is unknown.
    #[error("unparsable input: {0}")]
    Unparsable(#[from] ParseError),
}

impl AnalysisError {
    /// Always true: callers must treat the text as a potential write and
    /// deny it.
    pub fn is_write_status_unknown(&self) -> bool {
        match self {
            AnalysisError::Unparsable(_) => true,
        }
    }
}
