//! Error types for the bpickle codec.

use crate::types::ValueKind;

/// Errors that can occur while encoding or decoding bpickle data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("unsupported type: no encoder registered for {kind}")]
    UnsupportedType { kind: ValueKind },

    #[error("empty input: expected a token at offset {offset}")]
    EmptyInput { offset: usize },

    #[error("unknown type character {:?} at offset {offset}", char::from(*.tag))]
    UnknownTag { tag: u8, offset: usize },

    #[error("corrupted data at offset {offset}: {reason}")]
    CorruptedData { offset: usize, reason: String },

    #[error("invalid UTF-8 in text payload at offset {offset}: {source}")]
    InvalidUtf8 {
        offset: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("nesting depth exceeds limit of {limit}")]
    DepthLimitExceeded { limit: usize },
}

impl CodecError {
    /// Builds a `CorruptedData` error at `offset`.
    pub fn corrupted(offset: usize, reason: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            reason: reason.into(),
        }
    }

    /// Returns the input offset the error refers to, if it is a decode error.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::EmptyInput { offset }
            | Self::UnknownTag { offset, .. }
            | Self::CorruptedData { offset, .. }
            | Self::InvalidUtf8 { offset, .. } => Some(*offset),
            Self::UnsupportedType { .. } | Self::DepthLimitExceeded { .. } => None,
        }
    }
}
