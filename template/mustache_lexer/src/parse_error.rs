//! Scan diagnostics.
//!
//! Exactly two conditions abort a scan: a set-delimiters tag whose body does
//! not name exactly two delimiters, and input that ends inside a tag. Both
//! are fatal; there is no skip-and-resync. The error reaches the consumer
//! out-of-band through [`TokenConsumer::on_error`](crate::TokenConsumer),
//! after any tokens emitted before the failure point.

use thiserror::Error;

/// A fatal scan diagnostic: the offending 1-based line and what went wrong.
///
/// Renders as `Parse error at line {line}: {description}`.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
#[error("Parse error at line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line the error is reported at.
    pub line: u32,
    /// What went wrong.
    pub kind: ParseErrorKind,
}

/// The closed set of scan failures.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// The body of a `{{= ... =}}` tag did not split into exactly two
    /// non-empty fragments.
    #[error("Invalid set delimiters tag")]
    InvalidSetDelimitersTag,
    /// Input ended while inside a tag.
    #[error("Unclosed Mustache tag")]
    UnclosedTag,
}

impl ParseError {
    /// A malformed set-delimiters tag, reported at the closing marker's line.
    #[cold]
    pub(crate) fn invalid_set_delimiters_tag(line: u32) -> Self {
        Self {
            line,
            kind: ParseErrorKind::InvalidSetDelimitersTag,
        }
    }

    /// An unterminated tag, reported at the line the tag opened on.
    #[cold]
    pub(crate) fn unclosed_tag(line: u32) -> Self {
        Self {
            line,
            kind: ParseErrorKind::UnclosedTag,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::{assert_eq, assert_ne};

    #[test]
    fn display_matches_diagnostic_format() {
        let err = ParseError::invalid_set_delimiters_tag(4);
        assert_eq!(
            err.to_string(),
            "Parse error at line 4: Invalid set delimiters tag"
        );

        let err = ParseError::unclosed_tag(1);
        assert_eq!(err.to_string(), "Parse error at line 1: Unclosed Mustache tag");
    }

    #[test]
    fn carries_line_and_kind() {
        let err = ParseError::unclosed_tag(17);
        assert_eq!(err.line, 17);
        assert_eq!(err.kind, ParseErrorKind::UnclosedTag);
    }

    #[test]
    fn error_equality() {
        let a = ParseError::unclosed_tag(2);
        let b = ParseError::unclosed_tag(2);
        let c = ParseError::invalid_set_delimiters_tag(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn is_a_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&ParseError::unclosed_tag(1));
    }
}
