//! # Probability Validation
//!
//! Scalars entering the probability algebra (initial fill values, scalar
//! addends) must be probabilities. Array contents are not re-validated after
//! arithmetic: summing mutually exclusive contributions is only meaningful
//! when the caller guarantees disjointness.

use crate::error::HazardError;

/// Return `p` unchanged if it lies in `[0, 1]`.
///
/// NaN is rejected along with every other out-of-range value.
pub fn validate_probability(p: f64) -> Result<f64, HazardError> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(HazardError::InvalidProbability(p))
    }
}
