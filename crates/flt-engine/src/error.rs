use thiserror::Error;

/// Errors raised while parsing, assembling, rendering or editing FLT documents.
#[derive(Debug, Error)]
pub enum FltError {
    /// Malformed physical line, or a malformed Blob / Dublin Core payload.
    #[error("Line {line_no}: {message}")]
    Syntax {
        line_no: usize,
        /// Raw offending source content.
        content: String,
        message: String,
    },

    /// Unknown line type or typed-line discriminant.
    #[error("Line {line_no}: {message}")]
    Type {
        line_no: usize,
        content: String,
        message: String,
    },

    /// Document-level format violation (doctype mismatch, DC without DCMETA).
    #[error("{0}")]
    Format(String),

    #[error("Invalid dublin core term: {0}")]
    Vocabulary(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// A per-line failure without its own line context, annotated with the
    /// line number and raw logical line content.
    #[error("Line {line_no}: {source} (content: {content:?})")]
    Line {
        line_no: usize,
        content: String,
        #[source]
        source: Box<FltError>,
    },

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("Offset {offset} is out of range for length {length}")]
    OutOfRange { offset: usize, length: usize },

    #[error("Replacement must be exactly one character, got {0:?}")]
    InvalidReplacement(String),

    /// The document's line structure changed after the map was built.
    #[error("Map was built for document revision {expected}, document is at revision {actual}")]
    StaleMap { expected: u64, actual: u64 },
}

impl FltError {
    /// Source line number for line-scoped errors.
    pub fn line_no(&self) -> Option<usize> {
        match self {
            Self::Syntax { line_no, .. } | Self::Type { line_no, .. } | Self::Line { line_no, .. } => {
                Some(*line_no)
            }
            _ => None,
        }
    }

    /// Raw source content for line-scoped errors.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Syntax { content, .. } | Self::Type { content, .. } | Self::Line { content, .. } => {
                Some(content.as_str())
            }
            _ => None,
        }
    }

    /// The innermost error, looking through [`FltError::Line`] context.
    pub fn root(&self) -> &FltError {
        match self {
            Self::Line { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, FltError>;
