//! Error taxonomy for layout parsing, field conversion and record traversal.

use std::num::{ParseFloatError, ParseIntError};
use std::str::ParseBoolError;

use thiserror::Error;

/// Error type returned by self-describing fields.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures while parsing or validating a field's layout annotations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The field carries no `range` annotation. Not a layout field.
    #[error("tag is empty")]
    TagEmpty,
    #[error("invalid range values: {0}")]
    InvalidRangeValues(String),
    #[error("invalid upper bound: {0}")]
    InvalidUpperBound(usize),
    /// Zero-width or inverted range.
    #[error("inefectual range: {from},{to}")]
    InefectualRange { from: i64, to: i64 },
    #[error("range end {to} exceeds record length {len}")]
    RangeTooLarge { to: usize, len: usize },
    #[error("invalid align type: '{0}'")]
    InvalidAlignType(String),
    #[error("invalid decimals: '{0}'")]
    InvalidDecimals(String),
}

/// Failures converting a single field between text and its typed value.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("unsupported field kind: {0}")]
    UnsupportedFieldKind(String),
    #[error("invalid boolean value: {0}")]
    InvalidBooleanValue(#[source] ParseBoolError),
    #[error("invalid int value: {0}")]
    InvalidIntValue(#[source] ParseIntError),
    #[error("invalid float value: {0}")]
    InvalidFloatValue(#[source] ParseFloatError),
    #[error("value of {len} characters does not fit in {width}")]
    LengthExceeded { width: usize, len: usize },
    #[error("expected {expected} value, found {found}")]
    TypeMismatch { expected: &'static str, found: String },
    #[error(transparent)]
    Custom(BoxError),
}

/// Record-level failures, each naming the field that caused it.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("field {field} ({layout}): {source}")]
    Field {
        field: String,
        layout: String,
        #[source]
        source: FieldError,
    },
    #[error("field {field} at position {from} overlaps the previous field ending at {last}")]
    OverlappingField {
        field: String,
        from: usize,
        last: usize,
    },
    #[error("field {field} is too long, required: {width} but {actual}")]
    FieldTooLong {
        field: String,
        width: usize,
        actual: usize,
    },
    #[error("invalid target: {0}")]
    InvalidTarget(String),
}

impl CodecError {
    /// Returns the field-level cause, if this error wraps one.
    pub fn field_error(&self) -> Option<&FieldError> {
        match self {
            CodecError::Field { source, .. } => Some(source),
            _ => None,
        }
    }
}
