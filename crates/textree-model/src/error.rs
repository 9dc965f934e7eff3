use thiserror::Error;

/// Raised by `BlockTag::from_str` for labels outside the block vocabulary.
///
/// Edit operations never surface this: assigning an unknown block tag to a
/// context is ignored instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown block tag {0:?}")]
pub struct UnknownBlockTag(pub String);

/// Errors from the fixture micro-language. Every variant names the line and
/// column where parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixtureError {
    #[error("unexpected character {found:?} at line {line}, column {column}")]
    UnexpectedCharacter {
        found: char,
        line: usize,
        column: usize,
    },

    #[error("unexpected {found} at line {line}, column {column}; expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        line: usize,
        column: usize,
    },

    #[error("unexpected end of input at line {line}, column {column}; expected {expected}")]
    UnexpectedEnd {
        expected: &'static str,
        line: usize,
        column: usize,
    },

    #[error("invalid escape sequence \\{found} at line {line}, column {column}")]
    InvalidEscape {
        found: char,
        line: usize,
        column: usize,
    },

    #[error("unknown node {name:?} at line {line}, column {column}")]
    UnknownNode {
        name: String,
        line: usize,
        column: usize,
    },
}

impl FixtureError {
    /// The 1-based column the error points at.
    pub fn column(&self) -> usize {
        match self {
            FixtureError::UnexpectedCharacter { column, .. }
            | FixtureError::UnexpectedToken { column, .. }
            | FixtureError::UnexpectedEnd { column, .. }
            | FixtureError::InvalidEscape { column, .. }
            | FixtureError::UnknownNode { column, .. } => *column,
        }
    }
}

pub type Result<T, E = FixtureError> = std::result::Result<T, E>;
