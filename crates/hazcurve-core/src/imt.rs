//! # Intensity Measure Types and Levels
//!
//! A hazard curve is discretized over the intensity levels of one or more
//! intensity measure types (IMTs). The level axis of every curve is the
//! concatenation of the per-IMT level lists, in declaration order:
//!
//! ```text
//! PGA:     [0.01, 0.1, 0.5]   -> level axis 0..3
//! SA(0.1): [0.01, 0.1]        -> level axis 3..5
//! ```
//!
//! [`IntensityLevels`] is the collaborator the kernel consults when it
//! flattens curves into per-IMT records. It never drives the algebra.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::error::HazardError;

/// The level list of a single intensity measure type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImtLevels {
    /// IMT label, e.g. `PGA` or `SA(0.1)`.
    pub imt: String,
    /// Strictly increasing, positive intensity levels.
    pub levels: Vec<f64>,
}

/// One named field of the flat export record: an IMT and its level count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordField {
    /// Field name (the IMT label).
    pub name: String,
    /// Number of values stored in the field.
    pub width: usize,
}

/// Ordered mapping from IMT label to its slice of the level axis.
///
/// Serializes as a list of [`ImtLevels`]; deserialization re-runs the
/// validation of [`IntensityLevels::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ImtLevels>", into = "Vec<ImtLevels>")]
pub struct IntensityLevels {
    entries: Vec<ImtLevels>,
    /// `offsets[i]..offsets[i + 1]` is the level range of `entries[i]`.
    offsets: Vec<usize>,
}

impl IntensityLevels {
    /// Build a level index, validating every IMT.
    ///
    /// Requires at least one IMT, unique non-empty labels, and for each IMT
    /// a non-empty, strictly increasing list of positive finite levels.
    pub fn new(entries: Vec<ImtLevels>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one intensity measure type is required".to_string(),
            ));
        }
        let mut offsets = Vec::with_capacity(entries.len() + 1);
        offsets.push(0);
        for (i, entry) in entries.iter().enumerate() {
            if entry.imt.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "intensity measure type #{i} has an empty label"
                )));
            }
            if entries[..i].iter().any(|e| e.imt == entry.imt) {
                return Err(ConfigError::Invalid(format!(
                    "intensity measure type {} is declared twice",
                    entry.imt
                )));
            }
            if entry.levels.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "intensity measure type {} has no levels",
                    entry.imt
                )));
            }
            if entry.levels.iter().any(|l| !l.is_finite() || *l <= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "intensity measure type {} has a non-positive level",
                    entry.imt
                )));
            }
            if entry.levels.windows(2).any(|w| w[0] >= w[1]) {
                return Err(ConfigError::Invalid(format!(
                    "levels of {} are not strictly increasing",
                    entry.imt
                )));
            }
            let last = offsets[offsets.len() - 1];
            offsets.push(last + entry.levels.len());
        }
        Ok(Self { entries, offsets })
    }

    /// Number of intensity measure types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a validated index.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total length of the level axis (sum over all IMTs).
    pub fn total_levels(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }

    /// The range of the level axis occupied by `imt`.
    pub fn slice(&self, imt: &str) -> Result<Range<usize>, HazardError> {
        self.position(imt)
            .map(|i| self.offsets[i]..self.offsets[i + 1])
            .ok_or_else(|| HazardError::UnknownImt(imt.to_string()))
    }

    /// Field names and widths of the flat export record, in IMT order.
    pub fn record_layout(&self) -> Vec<RecordField> {
        self.entries
            .iter()
            .map(|e| RecordField {
                name: e.imt.clone(),
                width: e.levels.len(),
            })
            .collect()
    }

    /// Iterate over `(imt, level range)` pairs in declaration order.
    pub fn ranges(&self) -> impl Iterator<Item = (&str, Range<usize>)> {
        self.entries
            .iter()
            .zip(self.offsets.windows(2))
            .map(|(e, w)| (e.imt.as_str(), w[0]..w[1]))
    }

    fn position(&self, imt: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.imt == imt)
    }
}

impl TryFrom<Vec<ImtLevels>> for IntensityLevels {
    type Error = ConfigError;

    fn try_from(entries: Vec<ImtLevels>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<IntensityLevels> for Vec<ImtLevels> {
    fn from(levels: IntensityLevels) -> Self {
        levels.entries
    }
}
