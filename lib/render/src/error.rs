//! Renderer errors.

use crate::metrics::EncodeError;
use std::fmt;

/// Errors that abort rendering a document.
///
/// A single line that cannot be encoded is not an error: it is logged and
/// skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The input text was empty or only whitespace.
    EmptyInput,
    /// The watermark text was blank.
    EmptyWatermark,
    /// The watermark text cannot be drawn with the standard fonts.
    UnencodableWatermark(EncodeError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "cannot render an empty document"),
            Self::EmptyWatermark => write!(f, "watermark text must not be blank"),
            Self::UnencodableWatermark(err) => write!(f, "invalid watermark: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnencodableWatermark(err) => Some(err),
            _ => None,
        }
    }
}
