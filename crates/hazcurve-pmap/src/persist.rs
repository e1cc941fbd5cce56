//! # Structured Persistence Layout
//!
//! A map is persisted as exactly two fields, `array` and `sids`, plus an
//! auxiliary attribute table that is always empty. Importing rebuilds the
//! site index and reads the level and inner counts from the trailing
//! dimensions of `array`; nothing else is stored.
//!
//! The same layout backs the binary codec in [`crate::archive`] and the
//! serde representation used for JSON interchange.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use hazcurve_core::{HazardError, SiteId};

use crate::map::ExceedanceMap;

/// A dense row-major `f64` array with explicit dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArray {
    /// Dimensions, outermost first.
    pub dims: Vec<usize>,
    /// Row-major contents; `data.len()` equals the product of `dims`.
    pub data: Vec<f64>,
}

impl StoredArray {
    /// Wrap `data` as an array of the given dimensions.
    pub fn new(dims: Vec<usize>, data: Vec<f64>) -> Result<Self, HazardError> {
        let expected = element_count("array construction", &dims)?;
        if expected != data.len() {
            return Err(HazardError::shape_mismatch(
                "array construction",
                format!("{expected} elements for dims {dims:?}"),
                format!("{} elements", data.len()),
            ));
        }
        Ok(Self { dims, data })
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }
}

/// Product of `dims`, or a shape mismatch when it does not fit in `usize`.
pub(crate) fn element_count(context: &'static str, dims: &[usize]) -> Result<usize, HazardError> {
    dims.iter()
        .try_fold(1usize, |acc, d| acc.checked_mul(*d))
        .ok_or_else(|| {
            HazardError::shape_mismatch(
                context,
                "dims whose product fits in memory",
                format!("dims {dims:?}"),
            )
        })
}

/// The two-field persisted form of an [`ExceedanceMap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMap {
    /// The `(N, L, Z)` backing array.
    pub array: StoredArray,
    /// Site ids in row order.
    pub sids: Vec<SiteId>,
}

/// Auxiliary attributes written next to a stored map. Always empty.
pub type StoredAttrs = BTreeMap<String, String>;

impl ExceedanceMap {
    /// Export to the `{array, sids}` layout with empty attributes.
    pub fn to_stored(&self) -> (StoredMap, StoredAttrs) {
        let shape = self.shape();
        let stored = StoredMap {
            array: StoredArray {
                dims: vec![shape.sites, shape.levels, shape.inner],
                data: self.values().to_vec(),
            },
            sids: self.sids().to_vec(),
        };
        (stored, StoredAttrs::new())
    }

    /// Rebuild a map from its stored layout. The attribute table is
    /// ignored; levels and inner counts come from the array dimensions.
    pub fn from_stored(stored: StoredMap, _attrs: &StoredAttrs) -> Result<Self, HazardError> {
        Self::from_array(stored.array, stored.sids)
    }
}

impl From<&ExceedanceMap> for StoredMap {
    fn from(map: &ExceedanceMap) -> Self {
        map.to_stored().0
    }
}

impl TryFrom<StoredMap> for ExceedanceMap {
    type Error = HazardError;

    fn try_from(stored: StoredMap) -> Result<Self, Self::Error> {
        Self::from_stored(stored, &StoredAttrs::new())
    }
}
