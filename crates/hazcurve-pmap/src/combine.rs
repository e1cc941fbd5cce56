//! # Shape Inference and Combination
//!
//! Reduces a homogeneous collection of partial maps, one per worker, into a
//! single aggregate by repeated independent union. Union is commutative and
//! associative, so the order in which partial maps arrive does not change
//! the result beyond floating-point rounding.
//!
//! [`combine`] is the batch form. [`MapAccumulator`] is the streaming form
//! a reducer uses when partial maps arrive one at a time and it cannot hold
//! them all.

use std::collections::BTreeSet;

use hazcurve_core::{HazardError, SiteId};

use crate::map::{ExceedanceMap, MapShape};

/// The `(N, L, Z)` shape of the first map that has at least one site.
///
/// Fails with [`HazardError::AllEmpty`] when every map is empty, including
/// when the collection itself is empty.
pub fn shape_of<'a>(
    maps: impl IntoIterator<Item = &'a ExceedanceMap>,
) -> Result<MapShape, HazardError> {
    let mut count = 0;
    for map in maps {
        if !map.is_empty() {
            return Ok(map.shape());
        }
        count += 1;
    }
    Err(HazardError::AllEmpty { count })
}

/// Union every map into one aggregate.
///
/// The aggregate starts zero-filled over the ascending union of all site ids,
/// so every contribution lands somewhere. Maps with a `(L, Z)` differing
/// from the inferred shape fail with [`HazardError::ShapeMismatch`].
pub fn combine(maps: &[ExceedanceMap]) -> Result<ExceedanceMap, HazardError> {
    let shape = shape_of(maps)?;
    let sids: BTreeSet<SiteId> = maps
        .iter()
        .flat_map(|m| m.sids().iter().copied())
        .collect();
    let mut out = ExceedanceMap::build(shape.levels, shape.inner, sids, 0.0)?;
    for map in maps {
        out.union_in_place(map)?;
    }
    tracing::debug!(
        inputs = maps.len(),
        sites = out.len(),
        levels = shape.levels,
        inner = shape.inner,
        "combined probability maps"
    );
    Ok(out)
}

/// Incremental reducer over partial maps.
///
/// The first non-empty map absorbed is taken over without copying; later
/// ones are unioned in, growing the site set whenever a partial map covers
/// sites not seen before. Empty partial maps are counted and skipped.
#[derive(Debug, Default)]
pub struct MapAccumulator {
    acc: Option<ExceedanceMap>,
    absorbed: usize,
}

impl MapAccumulator {
    /// An accumulator with nothing absorbed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one partial map into the aggregate.
    pub fn absorb(&mut self, map: ExceedanceMap) -> Result<(), HazardError> {
        self.absorbed += 1;
        if map.is_empty() {
            return Ok(());
        }
        match self.acc.as_mut() {
            None => self.acc = Some(map),
            Some(acc) => {
                if (acc.levels(), acc.inner()) != (map.levels(), map.inner()) {
                    return Err(HazardError::shape_mismatch(
                        "accumulator",
                        format!("(_, {}, {})", acc.levels(), acc.inner()),
                        format!("(_, {}, {})", map.levels(), map.inner()),
                    ));
                }
                if map.sids().iter().any(|sid| !acc.contains(*sid)) {
                    let grown = acc.with_sites(map.sids().iter().copied())?;
                    tracing::trace!(
                        from = acc.len(),
                        to = grown.len(),
                        "accumulator site set grew"
                    );
                    *acc = grown;
                }
                acc.union_in_place(&map)?;
            }
        }
        Ok(())
    }

    /// Number of partial maps absorbed, empty ones included.
    pub fn absorbed(&self) -> usize {
        self.absorbed
    }

    /// Shape of the aggregate so far, if anything non-empty was absorbed.
    pub fn shape(&self) -> Option<MapShape> {
        self.acc.as_ref().map(ExceedanceMap::shape)
    }

    /// The aggregate, or [`HazardError::AllEmpty`] if every absorbed map
    /// was empty.
    pub fn finish(self) -> Result<ExceedanceMap, HazardError> {
        self.acc.ok_or(HazardError::AllEmpty {
            count: self.absorbed,
        })
    }
}
