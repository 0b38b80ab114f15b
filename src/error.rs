//! Error types for the bit-vector valuation core.
//!
//! Most contracts in this crate are enforced with `debug_assert!` (see the
//! crate-level docs): they guard programmer error on a hot path, and
//! release builds must stay branch-free there. The handful of contract
//! violations a long-lived caller can plausibly hit at construction time
//! instead go through this `thiserror`-derived error type.

use thiserror::Error;

/// Errors returned by the fallible, non-hot-path entry points of this crate.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum BvError {
    /// A `BitVec`/`Valuation` was constructed with a bit width of zero.
    #[error("bit width must be at least 1")]
    ZeroWidth,

    /// Two `BitVec`s that are required to share a width did not.
    #[error("width mismatch: expected {expected}, got {actual}")]
    WidthMismatch {
        /// Width of the `BitVec` that set the expectation.
        expected: usize,
        /// Width of the `BitVec` that violated it.
        actual: usize,
    },

    /// `add_range` was called after at least one bit had already been pinned.
    ///
    /// Interval constraints must all be added before any bit is pinned:
    /// Fresh -> Ranged -> Pinned is a one-way state machine.
    #[error("add_range called after fixed bits were pinned")]
    RangeAfterPin,
}

/// A specialized `Result` type for this crate's fallible operations.
pub type Result<T> = std::result::Result<T, BvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            BvError::ZeroWidth.to_string(),
            "bit width must be at least 1"
        );
        assert_eq!(
            BvError::WidthMismatch {
                expected: 8,
                actual: 16
            }
            .to_string(),
            "width mismatch: expected 8, got 16"
        );
        assert_eq!(
            BvError::RangeAfterPin.to_string(),
            "add_range called after fixed bits were pinned"
        );
    }

    #[test]
    fn test_result_type() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }

        assert_eq!(returns_result().unwrap(), 42);
    }
}
