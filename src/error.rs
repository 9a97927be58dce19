//! Error types for tile compositing.

use thiserror::Error;

/// Coarse classification of a [`CompositeError`].
///
/// The multi-tile reducer aggregates failures by kind, so every error variant maps to
/// exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    TypeMismatch,
    ResolutionMismatch,
    DateMismatch,
    Overlap,
    GridMismatch,
    ShapeMismatch,
    OutsideFrame,
    InvalidParameter,
    NotFound,
    UnsupportedFormat,
    Io,
    Decode,
    Composition,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::TypeMismatch => "type mismatch",
            ErrorKind::ResolutionMismatch => "resolution mismatch",
            ErrorKind::DateMismatch => "date mismatch",
            ErrorKind::Overlap => "no overlap",
            ErrorKind::GridMismatch => "grid mismatch",
            ErrorKind::ShapeMismatch => "shape mismatch",
            ErrorKind::OutsideFrame => "outside frame",
            ErrorKind::InvalidParameter => "invalid parameter",
            ErrorKind::NotFound => "not found",
            ErrorKind::UnsupportedFormat => "unsupported format",
            ErrorKind::Io => "I/O",
            ErrorKind::Decode => "decode",
            ErrorKind::Composition => "composition",
        };
        f.write_str(name)
    }
}

/// Main error type for compositing operations.
#[derive(Error, Debug)]
pub enum CompositeError {
    #[error("Type mismatch for {field}: expected {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Resolution mismatch: {left} vs {right}")]
    ResolutionMismatch { left: u32, right: u32 },

    #[error("Date mismatch: {0}")]
    DateMismatch(String),

    #[error("Tiles do not overlap: x={x:?} vs x={other_x:?}, y={y:?} vs y={other_y:?}")]
    Overlap {
        x: (i64, i64),
        y: (i64, i64),
        other_x: (i64, i64),
        other_y: (i64, i64),
    },

    #[error("Tile origins are not on a shared {resolution}-unit grid: ({dx}, {dy}) apart")]
    GridMismatch { resolution: u32, dx: i64, dy: i64 },

    #[error("Raster shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Rectangle {rect} lies outside frame {frame}")]
    OutsideFrame { rect: String, frame: String },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("No matching file: {0}")]
    NotFound(String),

    #[error("Unsupported tile format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Array decode error: {0}")]
    Array(#[from] ndarray_npy::ReadNpyError),

    #[error("Metadata decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed tile bundle: {0}")]
    Bundle(String),

    #[error("Could not mosaic {merged} of {total} tiles; causes:\n{}", .causes.join("\n"))]
    Composition {
        merged: usize,
        total: usize,
        kinds: Vec<ErrorKind>,
        causes: Vec<String>,
    },
}

impl CompositeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompositeError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            CompositeError::ResolutionMismatch { .. } => ErrorKind::ResolutionMismatch,
            CompositeError::DateMismatch(_) => ErrorKind::DateMismatch,
            CompositeError::Overlap { .. } => ErrorKind::Overlap,
            CompositeError::GridMismatch { .. } => ErrorKind::GridMismatch,
            CompositeError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            CompositeError::OutsideFrame { .. } => ErrorKind::OutsideFrame,
            CompositeError::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            CompositeError::NotFound(_) => ErrorKind::NotFound,
            CompositeError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            CompositeError::Io(_) => ErrorKind::Io,
            CompositeError::Archive(_)
            | CompositeError::Array(_)
            | CompositeError::Json(_)
            | CompositeError::Bundle(_) => ErrorKind::Decode,
            CompositeError::Composition { .. } => ErrorKind::Composition,
        }
    }

    pub(crate) fn invalid(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        CompositeError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for compositing operations
pub type Result<T> = std::result::Result<T, CompositeError>;
