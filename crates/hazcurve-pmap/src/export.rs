//! # Record Export
//!
//! Flattens curves into per-site records with one field per intensity
//! measure type, the layout consumers of hazard curves expect:
//!
//! ```text
//! site 0: { "PGA": [p(0.01), p(0.1), p(0.5)], "SA(0.1)": [p(0.01), p(0.1)] }
//! ```
//!
//! The level axis is split according to [`IntensityLevels`]; a single inner
//! realization is selected per export.

use std::io::Write;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use hazcurve_core::{HazardError, IntensityLevels, RecordField};

use crate::curve::ExceedanceCurve;
use crate::map::CurveMapping;

/// Exceedance probabilities of one site, split by IMT.
///
/// Serializes as a JSON object whose keys follow IMT declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardRecord {
    fields: Vec<(String, Vec<f64>)>,
}

impl HazardRecord {
    /// A record with every field zero-filled to its layout width.
    pub fn zeroed(layout: &[RecordField]) -> Self {
        Self {
            fields: layout
                .iter()
                .map(|f| (f.name.clone(), vec![0.0; f.width]))
                .collect(),
        }
    }

    /// Values of one field.
    pub fn get(&self, imt: &str) -> Option<&[f64]> {
        self.fields
            .iter()
            .find(|(name, _)| name == imt)
            .map(|(_, v)| v.as_slice())
    }

    /// `(imt, values)` pairs in layout order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Fill every field from row-major `(L, Z)` values at inner index `inner`.
    fn fill(&mut self, levels: &IntensityLevels, values: &[f64], inner_count: usize, inner: usize) {
        for ((_, out), (_, range)) in self.fields.iter_mut().zip(levels.ranges()) {
            for (slot, level) in out.iter_mut().zip(range) {
                *slot = values[level * inner_count + inner];
            }
        }
    }
}

impl Serialize for HazardRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, values) in &self.fields {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

fn check_export_shape(
    levels: &IntensityLevels,
    curve_shape: (usize, usize),
    inner: usize,
) -> Result<(), HazardError> {
    let (level_count, inner_count) = curve_shape;
    if level_count != levels.total_levels() {
        return Err(HazardError::shape_mismatch(
            "record export",
            format!("{} levels", levels.total_levels()),
            format!("{level_count} levels"),
        ));
    }
    if inner >= inner_count {
        return Err(HazardError::IndexOutOfRange {
            axis: "inner",
            index: inner,
            len: inner_count,
        });
    }
    Ok(())
}

impl ExceedanceCurve {
    /// Project the values at inner index `inner` into a per-IMT record.
    pub fn to_record(
        &self,
        levels: &IntensityLevels,
        inner: usize,
    ) -> Result<HazardRecord, HazardError> {
        check_export_shape(levels, self.shape(), inner)?;
        let mut record = HazardRecord::zeroed(&levels.record_layout());
        record.fill(levels, self.values(), self.inner(), inner);
        Ok(record)
    }
}

/// One record per site id in `0..site_count`.
///
/// Sites absent from the map keep an all-zero record. A site id at or above
/// `site_count` fails with [`HazardError::IndexOutOfRange`].
pub fn convert_to_records<M: CurveMapping + ?Sized>(
    map: &M,
    levels: &IntensityLevels,
    site_count: usize,
    inner: usize,
) -> Result<Vec<HazardRecord>, HazardError> {
    let (_, inner_count) = map.curve_shape();
    check_export_shape(levels, map.curve_shape(), inner)?;
    if let Some(&sid) = map.site_ids().iter().find(|sid| **sid as usize >= site_count) {
        return Err(HazardError::IndexOutOfRange {
            axis: "site",
            index: sid as usize,
            len: site_count,
        });
    }
    let template = HazardRecord::zeroed(&levels.record_layout());
    let mut records = vec![template; site_count];
    for &sid in map.site_ids() {
        let values = map.row(sid)?;
        records[sid as usize].fill(levels, values, inner_count, inner);
    }
    tracing::debug!(
        sites = site_count,
        populated = map.site_count(),
        inner,
        "converted map to records"
    );
    Ok(records)
}

#[derive(Serialize)]
struct SiteLine<'a> {
    sid: usize,
    poes: &'a HazardRecord,
}

/// Write records as JSON lines, one site per line, prefixed by the site id.
pub fn write_json_lines<W: Write>(
    records: &[HazardRecord],
    mut out: W,
) -> Result<(), HazardError> {
    for (sid, poes) in records.iter().enumerate() {
        serde_json::to_writer(&mut out, &SiteLine { sid, poes }).map_err(std::io::Error::from)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
