//! # Exceedance Curve
//!
//! A fixed-shape `(L, Z)` array of exceedance probabilities for one site:
//! `L` hazard levels by `Z` inner realizations, stored row-major so that
//! `values[l * Z + z]` is the probability of exceeding level `l` under
//! realization `z`.
//!
//! ## Probability Algebra
//!
//! ```text
//! complement(p)  = 1 - p
//! union(p, q)    = 1 - (1 - p)(1 - q) = p + q - p·q     (independent events)
//! sum(p, q)      = p + q                                 (mutually exclusive events)
//! scaled(p, q)   = p · q
//! raised(p, n)   = p^n                                   (n identical repetitions)
//! ```
//!
//! Union is commutative and associative with identity `0`; complement is an
//! involution. The slice kernels at the bottom of this module are shared
//! with [`ExceedanceMap`](crate::map::ExceedanceMap), which applies them row
//! by row or to its whole backing array at once.

use serde::{Deserialize, Serialize};

use hazcurve_core::{validate_probability, HazardError};

use crate::persist::{element_count, StoredArray};

/// Exceedance probabilities of one site over `(levels, inner)`.
///
/// Every element is expected to lie in `[0, 1]`. Constructors check the
/// shape; values produced by [`sum_with`](Self::sum_with) are not
/// re-validated, since summing is only meaningful for mutually exclusive
/// contributions and that guarantee belongs to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredArray", into = "StoredArray")]
pub struct ExceedanceCurve {
    levels: usize,
    inner: usize,
    values: Vec<f64>,
}

impl ExceedanceCurve {
    /// An all-zero curve: no contribution yet.
    pub fn zeros(levels: usize, inner: usize) -> Self {
        Self {
            levels,
            inner,
            values: vec![0.0; levels * inner],
        }
    }

    /// A curve with every element set to the probability `value`.
    pub fn filled(levels: usize, inner: usize, value: f64) -> Result<Self, HazardError> {
        let value = validate_probability(value)?;
        Ok(Self {
            levels,
            inner,
            values: vec![value; levels * inner],
        })
    }

    /// Wrap row-major values of shape `(levels, inner)`.
    pub fn from_values(levels: usize, inner: usize, values: Vec<f64>) -> Result<Self, HazardError> {
        let expected = element_count("curve construction", &[levels, inner])?;
        if values.len() != expected {
            return Err(HazardError::shape_mismatch(
                "curve construction",
                format!("{expected} values for ({levels}, {inner})"),
                format!("{} values", values.len()),
            ));
        }
        Ok(Self {
            levels,
            inner,
            values,
        })
    }

    /// Number of hazard levels `L`.
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Number of inner realizations `Z`.
    pub fn inner(&self) -> usize {
        self.inner
    }

    /// The `(L, Z)` shape.
    pub fn shape(&self) -> (usize, usize) {
        (self.levels, self.inner)
    }

    /// Row-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The probability at `(level, inner)`, if in range.
    pub fn get(&self, level: usize, inner: usize) -> Option<f64> {
        if level < self.levels && inner < self.inner {
            Some(self.values[level * self.inner + inner])
        } else {
            None
        }
    }

    /// The `L` values of one inner realization.
    pub fn column(&self, inner: usize) -> Result<Vec<f64>, HazardError> {
        if inner >= self.inner {
            return Err(HazardError::IndexOutOfRange {
                axis: "inner",
                index: inner,
                len: self.inner,
            });
        }
        Ok(self
            .values
            .iter()
            .skip(inner)
            .step_by(self.inner)
            .copied()
            .collect())
    }

    /// True iff every element is exactly zero, i.e. nothing has contributed.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    /// `1 - values`.
    pub fn complement(&self) -> Self {
        let mut out = self.clone();
        complement_slice(&mut out.values);
        out
    }

    /// Independent-event union `1 - (1 - self)(1 - other)`.
    pub fn union_with(&self, other: &Self) -> Result<Self, HazardError> {
        self.ensure_same_shape(other, "curve union")?;
        let mut out = self.clone();
        union_into(&mut out.values, &other.values);
        Ok(out)
    }

    /// Union with a constant probability.
    ///
    /// The scalar `0` is the union identity and returns `self` without
    /// allocating; this is the accumulation starting point.
    pub fn union_with_scalar(mut self, p: f64) -> Result<Self, HazardError> {
        if p == 0.0 {
            return Ok(self);
        }
        let p = validate_probability(p)?;
        for v in &mut self.values {
            *v += p - *v * p;
        }
        Ok(self)
    }

    /// Elementwise sum, valid only for mutually exclusive events.
    pub fn sum_with(&self, other: &Self) -> Result<Self, HazardError> {
        let mut out = self.clone();
        out.sum_in_place(other)?;
        Ok(out)
    }

    /// In-place form of [`sum_with`](Self::sum_with).
    pub fn sum_in_place(&mut self, other: &Self) -> Result<&mut Self, HazardError> {
        self.ensure_same_shape(other, "curve sum")?;
        add_into(&mut self.values, &other.values);
        Ok(self)
    }

    /// Elementwise product with another curve.
    pub fn scaled_by(&self, other: &Self) -> Result<Self, HazardError> {
        self.ensure_same_shape(other, "curve scaling")?;
        let mut out = self.clone();
        mul_into(&mut out.values, &other.values);
        Ok(out)
    }

    /// Multiply every element by `factor`. A factor of `1` returns `self`
    /// unchanged without allocating.
    pub fn scaled_by_scalar(mut self, factor: f64) -> Self {
        if factor != 1.0 {
            self.values.iter_mut().for_each(|v| *v *= factor);
        }
        self
    }

    /// Elementwise power: the probability that `n` independent identical
    /// trials all produce the event. `raised_to(0)` is all ones.
    pub fn raised_to(&self, n: f64) -> Self {
        let mut out = self.clone();
        pow_slice(&mut out.values, n);
        out
    }

    fn ensure_same_shape(&self, other: &Self, context: &'static str) -> Result<(), HazardError> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(HazardError::shape_mismatch(
                context,
                format!("({}, {})", self.levels, self.inner),
                format!("({}, {})", other.levels, other.inner),
            ))
        }
    }
}

impl TryFrom<StoredArray> for ExceedanceCurve {
    type Error = HazardError;

    /// Accepts dims `[L, Z]`, or `[L]` promoted to `[L, 1]`.
    fn try_from(array: StoredArray) -> Result<Self, Self::Error> {
        match array.dims[..] {
            [levels] => Self::from_values(levels, 1, array.data),
            [levels, inner] => Self::from_values(levels, inner, array.data),
            _ => Err(HazardError::shape_mismatch(
                "curve import",
                "rank 1 or 2",
                format!("rank {}", array.dims.len()),
            )),
        }
    }
}

impl From<ExceedanceCurve> for StoredArray {
    fn from(curve: ExceedanceCurve) -> Self {
        StoredArray {
            dims: vec![curve.levels, curve.inner],
            data: curve.values,
        }
    }
}

// ---------------------------------------------------------------------------
// Slice kernels
// ---------------------------------------------------------------------------

pub(crate) fn union_into(dst: &mut [f64], src: &[f64]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d += s - *d * s;
    }
}

pub(crate) fn add_into(dst: &mut [f64], src: &[f64]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d += s;
    }
}

pub(crate) fn mul_into(dst: &mut [f64], src: &[f64]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d *= s;
    }
}

pub(crate) fn complement_slice(values: &mut [f64]) {
    values.iter_mut().for_each(|v| *v = 1.0 - *v);
}

pub(crate) fn pow_slice(values: &mut [f64], n: f64) {
    values.iter_mut().for_each(|v| *v = v.powf(n));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(values: &[f64]) -> ExceedanceCurve {
        ExceedanceCurve::from_values(values.len(), 1, values.to_vec()).unwrap()
    }

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-12, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn complement_then_union_then_scale() {
        // ~(p | p) * 0.5 for p = [0.1, 0.2, 0.3, 0, 0]
        let p = curve(&[0.1, 0.2, 0.3, 0.0, 0.0]);
        let out = p.union_with(&p).unwrap().complement().scaled_by_scalar(0.5);
        assert_close(out.values(), &[0.405, 0.32, 0.245, 0.5, 0.5]);
    }

    #[test]
    fn union_formula() {
        let a = curve(&[0.5, 0.2]);
        let b = curve(&[0.5, 0.0]);
        assert_close(a.union_with(&b).unwrap().values(), &[0.75, 0.2]);
    }

    #[test]
    fn union_with_zero_scalar_is_identity() {
        let a = curve(&[0.3, 0.7]);
        let before = a.values().as_ptr();
        let out = a.union_with_scalar(0.0).unwrap();
        assert_eq!(out.values().as_ptr(), before);
        assert_close(out.values(), &[0.3, 0.7]);
    }

    #[test]
    fn union_with_scalar_validates() {
        let a = curve(&[0.3]);
        assert!(matches!(
            a.clone().union_with_scalar(2.0),
            Err(HazardError::InvalidProbability(_))
        ));
        assert_close(a.union_with_scalar(0.5).unwrap().values(), &[0.65]);
    }

    #[test]
    fn scale_by_one_does_not_allocate() {
        let a = curve(&[0.3, 0.7]);
        let before = a.values().as_ptr();
        let out = a.scaled_by_scalar(1.0);
        assert_eq!(out.values().as_ptr(), before);
    }

    #[test]
    fn scale_by_curve() {
        let a = curve(&[0.5, 0.4]);
        let b = curve(&[0.5, 0.5]);
        assert_close(a.scaled_by(&b).unwrap().values(), &[0.25, 0.2]);
    }

    #[test]
    fn sum_in_place_and_copying() {
        let mut a = curve(&[0.1, 0.2]);
        let b = curve(&[0.3, 0.4]);
        let c = a.sum_with(&b).unwrap();
        assert_close(a.values(), &[0.1, 0.2]);
        assert_close(c.values(), &[0.4, 0.6]);
        a.sum_in_place(&b).unwrap();
        assert_close(a.values(), &[0.4, 0.6]);
    }

    #[test]
    fn raised_to_zero_is_all_ones() {
        let a = curve(&[0.0, 0.3, 1.0]);
        assert_close(a.raised_to(0.0).values(), &[1.0, 1.0, 1.0]);
        assert_close(a.raised_to(1.0).values(), a.values());
        assert_close(a.raised_to(2.0).values(), &[0.0, 0.09, 1.0]);
    }

    #[test]
    fn emptiness_means_all_zero() {
        assert!(ExceedanceCurve::zeros(3, 2).is_empty());
        assert!(!curve(&[0.0, 1e-300]).is_empty());
    }

    #[test]
    fn shape_mismatch_on_union() {
        let a = ExceedanceCurve::zeros(4, 2);
        let b = ExceedanceCurve::zeros(4, 3);
        assert!(matches!(
            a.union_with(&b),
            Err(HazardError::ShapeMismatch { .. })
        ));
        assert!(a.clone().sum_in_place(&b).is_err());
        assert!(a.scaled_by(&b).is_err());
    }

    #[test]
    fn column_extracts_inner_realization() {
        // (L=3, Z=2)
        let c = ExceedanceCurve::from_values(3, 2, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]).unwrap();
        assert_eq!(c.column(1).unwrap(), vec![0.2, 0.4, 0.6]);
        assert_eq!(c.get(2, 0), Some(0.5));
        assert_eq!(c.get(3, 0), None);
        assert!(matches!(
            c.column(2),
            Err(HazardError::IndexOutOfRange { axis: "inner", .. })
        ));
    }

    #[test]
    fn filled_rejects_non_probability() {
        assert!(ExceedanceCurve::filled(2, 2, 1.01).is_err());
        assert_eq!(ExceedanceCurve::filled(2, 2, 0.5).unwrap().values(), &[0.5; 4]);
    }

    #[test]
    fn from_values_checks_length() {
        assert!(ExceedanceCurve::from_values(2, 2, vec![0.0; 3]).is_err());
    }

    #[test]
    fn serde_uses_stored_array_layout() {
        let c = ExceedanceCurve::from_values(2, 1, vec![0.25, 0.5]).unwrap();
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json, serde_json::json!({"dims": [2, 1], "data": [0.25, 0.5]}));
        let back: ExceedanceCurve = serde_json::from_value(json).unwrap();
        assert_eq!(back, c);

        let rank1: ExceedanceCurve =
            serde_json::from_value(serde_json::json!({"dims": [2], "data": [0.1, 0.2]})).unwrap();
        assert_eq!(rank1.shape(), (2, 1));
    }
}
