//! # Map Algebra
//!
//! The curve algebra broadcast over every site of an [`ExceedanceMap`].
//!
//! Binary operations act on the sites of the right operand that are also
//! present in the left operand; sites of the right operand the left one
//! does not contain are ignored, and sites of the left operand missing from
//! the right one are left unchanged. That is what lets a reducer fold
//! partial results from workers that each covered a different subset of
//! sites.
//!
//! Every operation validates shapes before touching any value, so an error
//! leaves the receiver exactly as it was.

use std::collections::HashSet;
use std::sync::Arc;

use hazcurve_core::{validate_probability, HazardError, SiteId};

use crate::curve::{add_into, complement_slice, mul_into, pow_slice, union_into};
use crate::map::{ExceedanceMap, SiteIndex};

impl ExceedanceMap {
    fn ensure_compatible(&self, other: &Self, context: &'static str) -> Result<(), HazardError> {
        if (self.levels(), self.inner()) == (other.levels(), other.inner()) {
            Ok(())
        } else {
            Err(HazardError::shape_mismatch(
                context,
                format!("(_, {}, {})", self.levels(), self.inner()),
                format!("(_, {}, {})", other.levels(), other.inner()),
            ))
        }
    }

    /// Apply `kernel(self_row, other_row)` to every site of `other` present
    /// in `self`. Maps with identical site order are processed as one slice.
    fn zip_rows(&mut self, other: &Self, kernel: fn(&mut [f64], &[f64])) {
        if self.shares_index_with(other) || self.sids() == other.sids() {
            kernel(self.data_mut(), other.values());
            return;
        }
        for (sid, values) in other.iter() {
            if let Some(row) = self.index().row(sid) {
                kernel(self.row_at_mut(row), values);
            }
        }
    }

    // -- Union ----------------------------------------------------------------

    /// Independent union with `other`, in place:
    /// `self[sid] += other[sid] - self[sid]·other[sid]` for every shared site.
    ///
    /// An empty `other` is a no-op, checked before the shape. Sites of
    /// `other` absent from `self` are not added.
    pub fn union_in_place(&mut self, other: &Self) -> Result<&mut Self, HazardError> {
        if other.is_empty() {
            return Ok(self);
        }
        self.ensure_compatible(other, "map union")?;
        self.zip_rows(other, union_into);
        Ok(self)
    }

    /// Copying form of [`union_in_place`](Self::union_in_place).
    pub fn union(&self, other: &Self) -> Result<Self, HazardError> {
        let mut out = self.clone();
        out.union_in_place(other)?;
        Ok(out)
    }

    // -- Mutually exclusive sum -----------------------------------------------

    /// Elementwise sum over shared sites, in place.
    ///
    /// Only meaningful when the contributions are mutually exclusive; the
    /// caller guarantees it and nothing here checks.
    pub fn sum_in_place(&mut self, other: &Self) -> Result<&mut Self, HazardError> {
        if other.is_empty() {
            return Ok(self);
        }
        self.ensure_compatible(other, "map sum")?;
        self.zip_rows(other, add_into);
        Ok(self)
    }

    /// Copying form of [`sum_in_place`](Self::sum_in_place).
    pub fn sum(&self, other: &Self) -> Result<Self, HazardError> {
        let mut out = self.clone();
        out.sum_in_place(other)?;
        Ok(out)
    }

    /// Add the probability `p` to every entry.
    pub fn sum_scalar(&self, p: f64) -> Result<Self, HazardError> {
        let p = validate_probability(p)?;
        let mut out = self.clone();
        out.data_mut().iter_mut().for_each(|v| *v += p);
        Ok(out)
    }

    // -- Scaling and power ----------------------------------------------------

    /// Elementwise product with `other` over shared sites.
    pub fn scaled_by(&self, other: &Self) -> Result<Self, HazardError> {
        let mut out = self.clone();
        if !other.is_empty() {
            out.ensure_compatible(other, "map scaling")?;
            out.zip_rows(other, mul_into);
        }
        Ok(out)
    }

    /// Multiply the whole array by `factor`. A factor of `1` returns `self`
    /// unchanged.
    pub fn scaled_by_scalar(mut self, factor: f64) -> Self {
        if factor != 1.0 {
            self.data_mut().iter_mut().for_each(|v| *v *= factor);
        }
        self
    }

    /// Elementwise power over the whole array. The result shares the site
    /// index and owns a new array.
    pub fn raised_to(&self, n: f64) -> Self {
        let mut data = self.values().to_vec();
        pow_slice(&mut data, n);
        self.light_copy(data)
    }

    /// In-place form of [`raised_to`](Self::raised_to).
    pub fn raise_in_place(&mut self, n: f64) -> &mut Self {
        pow_slice(self.data_mut(), n);
        self
    }

    /// `1 - values` over the whole array. The result shares the site index
    /// and owns a new array.
    pub fn complement(&self) -> Self {
        let mut data = self.values().to_vec();
        complement_slice(&mut data);
        self.light_copy(data)
    }

    /// In-place form of [`complement`](Self::complement).
    pub fn complement_in_place(&mut self) -> &mut Self {
        complement_slice(self.data_mut());
        self
    }

    // -- Structural -----------------------------------------------------------

    /// Extract inner realization `inner` as an `(N, L, 1)` map.
    pub fn slice(&self, inner: usize) -> Result<Self, HazardError> {
        if inner >= self.inner() {
            return Err(HazardError::IndexOutOfRange {
                axis: "inner",
                index: inner,
                len: self.inner(),
            });
        }
        let data: Vec<f64> = self
            .values()
            .iter()
            .skip(inner)
            .step_by(self.inner())
            .copied()
            .collect();
        Ok(self.reshaped(1, data))
    }

    /// Submap holding only the requested sites, in this map's row order.
    ///
    /// Every requested id must be present; an unknown id fails
    /// with [`HazardError::NotFound`].
    pub fn restrict_to(
        &self,
        sids: impl IntoIterator<Item = SiteId>,
    ) -> Result<Self, HazardError> {
        let wanted: HashSet<SiteId> = sids.into_iter().collect();
        if let Some(&missing) = wanted.iter().find(|sid| !self.contains(**sid)) {
            return Err(HazardError::NotFound(missing));
        }
        let mut kept = Vec::with_capacity(wanted.len());
        let mut data = Vec::with_capacity(wanted.len() * self.row_len());
        for (sid, values) in self.iter() {
            if wanted.contains(&sid) {
                kept.push(sid);
                data.extend_from_slice(values);
            }
        }
        Ok(Self::with_index(
            Arc::new(SiteIndex::new(kept)?),
            self.levels(),
            self.inner(),
            data,
        ))
    }

    /// A copy extended with zero curves for every id of `sids` not already
    /// present. Existing rows keep their order; new sites follow in
    /// ascending order.
    pub fn with_sites(&self, sids: impl IntoIterator<Item = SiteId>) -> Result<Self, HazardError> {
        let mut new_sids: Vec<SiteId> = sids
            .into_iter()
            .filter(|sid| !self.contains(*sid))
            .collect();
        new_sids.sort_unstable();
        new_sids.dedup();
        if new_sids.is_empty() {
            return Ok(self.clone());
        }
        let mut all = self.sids().to_vec();
        all.extend_from_slice(&new_sids);
        let mut data = self.values().to_vec();
        data.resize(all.len() * self.row_len(), 0.0);
        Ok(Self::with_index(
            Arc::new(SiteIndex::new(all)?),
            self.levels(),
            self.inner(),
            data,
        ))
    }
}
