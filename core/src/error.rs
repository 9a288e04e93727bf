use serde::Serialize;

/// What is structurally wrong with a piece of graph source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceErrorKind {
    #[error("missing graph header, expected `digraph {{` or `graph {{`")]
    MissingHeader,

    #[error("unterminated string")]
    UnterminatedString,

    #[error("unterminated block comment")]
    UnterminatedComment,

    #[error("unexpected `{found}`")]
    UnexpectedClose { found: char },

    #[error("expected `{expected}` but found `{found}`")]
    Mismatched { expected: char, found: char },

    #[error("`{open}` is never closed")]
    Unclosed { open: char },

    #[error("unexpected text after the closing brace")]
    TrailingText,
}

/// A validation failure with a best-effort 1-based position, suitable for
/// an inline editor marker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}, column {column}: {kind}")]
pub struct SourceError {
    pub line: usize,
    pub column: usize,
    pub kind: SourceErrorKind,
}

impl SourceError {
    pub fn new(line: usize, column: usize, kind: SourceErrorKind) -> Self {
        Self { line, column, kind }
    }

    /// The `(line, column, message)` triple handed to the editor.
    pub fn marker(&self) -> Marker {
        Marker {
            line: self.line,
            column: self.column,
            message: self.kind.to_string(),
        }
    }
}

/// Inline error marker for the source editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub line: usize,
    pub column: usize,
    pub message: String,
}
