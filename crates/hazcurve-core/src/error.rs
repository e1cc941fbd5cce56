//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error type used throughout hazcurve. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every variant is a local data error. The kernel never retries; the
//!   caller (usually the reducer or the export step) decides whether to
//!   skip, abort, or log the offending batch.
//! - Operations validate before they mutate, so a returned error means the
//!   receiver was left untouched.
//! - Shape errors carry both the expected and the actual shape, rendered as
//!   strings so that curves `(L, Z)` and maps `(N, L, Z)` share one variant.

use thiserror::Error;

use crate::SiteId;

/// Top-level error type for hazcurve.
#[derive(Error, Debug)]
pub enum HazardError {
    /// Two operands, or an array and its site ids, disagree in shape.
    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// The operation that detected the mismatch.
        context: &'static str,
        /// The shape required by the receiver.
        expected: String,
        /// The shape that was supplied.
        actual: String,
    },

    /// Every map passed to shape inference or `combine` has zero sites.
    #[error("all {count} probability maps are empty")]
    AllEmpty {
        /// Number of maps inspected.
        count: usize,
    },

    /// A scalar probability outside `[0, 1]`.
    #[error("invalid probability {0}: must lie in [0, 1]")]
    InvalidProbability(f64),

    /// Lookup of a site id the map does not contain.
    #[error("site {0} not found")]
    NotFound(SiteId),

    /// A site id sequence contained the same id twice.
    #[error("duplicate site id {0}")]
    DuplicateSite(SiteId),

    /// An inner, level, or site index beyond the valid range.
    #[error("{axis} index {index} out of range (length {len})")]
    IndexOutOfRange {
        /// Name of the indexed axis.
        axis: &'static str,
        /// The offending index.
        index: usize,
        /// The length of the axis.
        len: usize,
    },

    /// An intensity measure type absent from the level index.
    #[error("unknown intensity measure type: {0}")]
    UnknownImt(String),

    /// A binary archive failed structural or checksum validation.
    #[error("corrupt archive: {0}")]
    ArchiveCorrupt(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl HazardError {
    /// Build a [`HazardError::ShapeMismatch`] from any two displayable shapes.
    pub fn shape_mismatch(
        context: &'static str,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::ShapeMismatch {
            context,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_display_names_both_shapes() {
        let err = HazardError::shape_mismatch("union", "(4, 2)", "(4, 3)");
        assert_eq!(
            err.to_string(),
            "shape mismatch in union: expected (4, 2), got (4, 3)"
        );
    }

    #[test]
    fn all_empty_display() {
        let err = HazardError::AllEmpty { count: 3 };
        assert_eq!(err.to_string(), "all 3 probability maps are empty");
    }

    #[test]
    fn index_out_of_range_display() {
        let err = HazardError::IndexOutOfRange {
            axis: "inner",
            index: 5,
            len: 2,
        };
        assert_eq!(err.to_string(), "inner index 5 out of range (length 2)");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: HazardError = io.into();
        assert!(matches!(err, HazardError::Io(_)));
    }
}
