//! # Exceedance Map — Storage and Site Indexing
//!
//! An [`ExceedanceMap`] associates site ids with exceedance curves. All
//! curves live in one dense row-major array of shape `(N, L, Z)`: row `r`
//! holds the `L·Z` values of the site `sids[r]`. A hash index from site id
//! to row gives O(1) per-site access.
//!
//! ## Invariants
//!
//! - `sids.len() == N` and `data.len() == N·L·Z`.
//! - Site ids are unique; the index is a bijection onto `0..N`.
//! - The [`SiteIndex`] is immutable once built. Operations that keep the
//!   site structure but compute a new array (complement, power, slice)
//!   share it through an `Arc` instead of rebuilding it. The array itself is
//!   never shared: every map owns its `data`.
//!
//! The probability algebra over maps lives in `algebra.rs`; this module
//! covers construction and per-site access.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use hazcurve_core::{validate_probability, HazardError, SiteId};

use crate::curve::ExceedanceCurve;
use crate::persist::{element_count, StoredArray};

// ---------------------------------------------------------------------------
// SiteIndex
// ---------------------------------------------------------------------------

/// Ordered site ids plus the reverse lookup from id to row.
#[derive(Debug, PartialEq, Eq)]
pub struct SiteIndex {
    sids: Vec<SiteId>,
    rows: HashMap<SiteId, usize>,
}

impl SiteIndex {
    /// Index `sids` in the given order. Fails on the first repeated id.
    pub fn new(sids: Vec<SiteId>) -> Result<Self, HazardError> {
        let mut rows = HashMap::with_capacity(sids.len());
        for (row, &sid) in sids.iter().enumerate() {
            if rows.insert(sid, row).is_some() {
                return Err(HazardError::DuplicateSite(sid));
            }
        }
        Ok(Self { sids, rows })
    }

    /// Site ids in row order.
    pub fn sids(&self) -> &[SiteId] {
        &self.sids
    }

    /// Row of `sid`, if indexed.
    pub fn row(&self, sid: SiteId) -> Option<usize> {
        self.rows.get(&sid).copied()
    }

    /// Whether `sid` is indexed.
    pub fn contains(&self, sid: SiteId) -> bool {
        self.rows.contains_key(&sid)
    }

    /// Number of sites.
    pub fn len(&self) -> usize {
        self.sids.len()
    }

    /// True when no site is indexed.
    pub fn is_empty(&self) -> bool {
        self.sids.is_empty()
    }
}

// ---------------------------------------------------------------------------
// MapShape
// ---------------------------------------------------------------------------

/// The `(N, L, Z)` shape of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapShape {
    /// Number of sites `N`.
    pub sites: usize,
    /// Number of hazard levels `L`.
    pub levels: usize,
    /// Number of inner realizations `Z`.
    pub inner: usize,
}

impl fmt::Display for MapShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.sites, self.levels, self.inner)
    }
}

// ---------------------------------------------------------------------------
// ExceedanceMap
// ---------------------------------------------------------------------------

/// Site id → exceedance curve, backed by one dense `(N, L, Z)` array.
///
/// `Clone` is a deep copy of the array; the immutable site index is shared.
#[derive(Clone)]
pub struct ExceedanceMap {
    index: Arc<SiteIndex>,
    levels: usize,
    inner: usize,
    data: Vec<f64>,
}

impl ExceedanceMap {
    /// Build a map over the deduplicated, ascending `sids` with every
    /// probability set to `initial_value`.
    pub fn build(
        levels: usize,
        inner: usize,
        sids: impl IntoIterator<Item = SiteId>,
        initial_value: f64,
    ) -> Result<Self, HazardError> {
        let initial_value = validate_probability(initial_value)?;
        let sids: Vec<SiteId> = sids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        let data = vec![initial_value; sids.len() * levels * inner];
        let index = SiteIndex::new(sids)?;
        Ok(Self::with_index(Arc::new(index), levels, inner, data))
    }

    /// A map with no sites.
    pub fn empty(levels: usize, inner: usize) -> Self {
        Self::with_index(
            Arc::new(SiteIndex {
                sids: Vec::new(),
                rows: HashMap::new(),
            }),
            levels,
            inner,
            Vec::new(),
        )
    }

    /// Wrap an existing array of shape `(N, L)` or `(N, L, Z)`.
    ///
    /// A rank-2 array is promoted to `(N, L, 1)`. `sids` must have exactly
    /// `N` unique entries; they are used in the order given, so the caller
    /// keeps rows and ids consistent.
    pub fn from_array(array: StoredArray, sids: Vec<SiteId>) -> Result<Self, HazardError> {
        let (sites, levels, inner) = match array.dims[..] {
            [n, l] => (n, l, 1),
            [n, l, z] => (n, l, z),
            _ => {
                return Err(HazardError::shape_mismatch(
                    "map from array",
                    "rank 2 or 3",
                    format!("rank {}", array.rank()),
                ))
            }
        };
        let expected = element_count("map from array", &[sites, levels, inner])?;
        if array.data.len() != expected {
            return Err(HazardError::shape_mismatch(
                "map from array",
                format!("{expected} elements for dims {:?}", array.dims),
                format!("{} elements", array.data.len()),
            ));
        }
        if sids.len() != sites {
            return Err(HazardError::shape_mismatch(
                "map from array",
                format!("{sites} site ids"),
                format!("{} site ids", sids.len()),
            ));
        }
        let index = SiteIndex::new(sids)?;
        Ok(Self::with_index(Arc::new(index), levels, inner, array.data))
    }

    /// Assemble a map around an existing index. `data` must already have
    /// `index.len() · levels · inner` elements.
    pub(crate) fn with_index(
        index: Arc<SiteIndex>,
        levels: usize,
        inner: usize,
        data: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(data.len(), index.len() * levels * inner);
        Self {
            index,
            levels,
            inner,
            data,
        }
    }

    /// Same site structure, new array.
    pub(crate) fn light_copy(&self, data: Vec<f64>) -> Self {
        self.reshaped(self.inner, data)
    }

    /// Same sites and levels, new inner count and array.
    pub(crate) fn reshaped(&self, inner: usize, data: Vec<f64>) -> Self {
        Self::with_index(Arc::clone(&self.index), self.levels, inner, data)
    }

    // -- Shape ----------------------------------------------------------------

    /// Site ids in row order.
    pub fn sids(&self) -> &[SiteId] {
        self.index.sids()
    }

    /// Number of sites `N`.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the map has no sites. This is the emptiness used by
    /// union and shape inference; see [`ExceedanceCurve::is_empty`] for the
    /// per-curve notion.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of hazard levels `L`.
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Number of inner realizations `Z`.
    pub fn inner(&self) -> usize {
        self.inner
    }

    /// The `(N, L, Z)` shape.
    pub fn shape(&self) -> MapShape {
        MapShape {
            sites: self.len(),
            levels: self.levels,
            inner: self.inner,
        }
    }

    /// The whole backing array, row-major.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Whether `sid` is in the map.
    pub fn contains(&self, sid: SiteId) -> bool {
        self.index.contains(sid)
    }

    /// Whether both maps use the very same site index allocation.
    pub fn shares_index_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.index, &other.index)
    }

    pub(crate) fn index(&self) -> &SiteIndex {
        &self.index
    }

    pub(crate) fn row_len(&self) -> usize {
        self.levels * self.inner
    }

    pub(crate) fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub(crate) fn row_at(&self, row: usize) -> &[f64] {
        let n = self.row_len();
        &self.data[row * n..(row + 1) * n]
    }

    pub(crate) fn row_at_mut(&mut self, row: usize) -> &mut [f64] {
        let n = self.row_len();
        &mut self.data[row * n..(row + 1) * n]
    }

    // -- Per-site access ------------------------------------------------------

    /// The `L·Z` values of `sid`.
    pub fn get(&self, sid: SiteId) -> Result<&[f64], HazardError> {
        let row = self.index.row(sid).ok_or(HazardError::NotFound(sid))?;
        Ok(self.row_at(row))
    }

    /// Mutable access to the values of `sid`.
    pub fn get_mut(&mut self, sid: SiteId) -> Result<&mut [f64], HazardError> {
        let row = self.index.row(sid).ok_or(HazardError::NotFound(sid))?;
        Ok(self.row_at_mut(row))
    }

    /// An owned copy of the curve of `sid`.
    pub fn curve(&self, sid: SiteId) -> Result<ExceedanceCurve, HazardError> {
        let values = self.get(sid)?.to_vec();
        ExceedanceCurve::from_values(self.levels, self.inner, values)
    }

    /// Overwrite the curve of an existing site. Never inserts.
    pub fn set(&mut self, sid: SiteId, curve: &ExceedanceCurve) -> Result<(), HazardError> {
        if curve.shape() != (self.levels, self.inner) {
            return Err(HazardError::shape_mismatch(
                "map assignment",
                format!("({}, {})", self.levels, self.inner),
                format!("({}, {})", curve.levels(), curve.inner()),
            ));
        }
        self.set_row(sid, curve.values())
    }

    /// Overwrite the raw `L·Z` values of an existing site.
    pub fn set_row(&mut self, sid: SiteId, values: &[f64]) -> Result<(), HazardError> {
        let expected = self.row_len();
        if values.len() != expected {
            return Err(HazardError::shape_mismatch(
                "map assignment",
                format!("{expected} values"),
                format!("{} values", values.len()),
            ));
        }
        self.get_mut(sid)?.copy_from_slice(values);
        Ok(())
    }

    /// `(site id, values)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (SiteId, &[f64])> + '_ {
        self.sids()
            .iter()
            .enumerate()
            .map(move |(row, &sid)| (sid, self.row_at(row)))
    }
}

impl PartialEq for ExceedanceMap {
    fn eq(&self, other: &Self) -> bool {
        self.levels == other.levels
            && self.inner == other.inner
            && self.sids() == other.sids()
            && self.data == other.data
    }
}

impl fmt::Debug for ExceedanceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ExceedanceMap {}>", self.shape())
    }
}

impl fmt::Display for ExceedanceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ---------------------------------------------------------------------------
// CurveMapping
// ---------------------------------------------------------------------------

/// Read/write associative access to curves keyed by site id.
///
/// Export code is written against this trait rather than the concrete map.
pub trait CurveMapping {
    /// The `(L, Z)` shape shared by every curve.
    fn curve_shape(&self) -> (usize, usize);

    /// Site ids in iteration order.
    fn site_ids(&self) -> &[SiteId];

    /// Raw values of one site.
    fn row(&self, sid: SiteId) -> Result<&[f64], HazardError>;

    /// Overwrite the raw values of one existing site.
    fn set_row(&mut self, sid: SiteId, values: &[f64]) -> Result<(), HazardError>;

    /// Number of sites.
    fn site_count(&self) -> usize {
        self.site_ids().len()
    }

    /// Owned curve of one site.
    fn curve(&self, sid: SiteId) -> Result<ExceedanceCurve, HazardError> {
        let (levels, inner) = self.curve_shape();
        ExceedanceCurve::from_values(levels, inner, self.row(sid)?.to_vec())
    }
}

impl CurveMapping for ExceedanceMap {
    fn curve_shape(&self) -> (usize, usize) {
        (self.levels, self.inner)
    }

    fn site_ids(&self) -> &[SiteId] {
        self.sids()
    }

    fn row(&self, sid: SiteId) -> Result<&[f64], HazardError> {
        self.get(sid)
    }

    fn set_row(&mut self, sid: SiteId, values: &[f64]) -> Result<(), HazardError> {
        ExceedanceMap::set_row(self, sid, values)
    }
}
