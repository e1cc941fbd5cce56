//! Content digest of a probability map.
//!
//! Two maps with equal digests have the same shape, the same site ids in the
//! same row order, and bit-identical values. Workers use it to confirm that a
//! reducer received exactly what they sent.

use hazcurve_core::{ContentDigest, DigestBuilder};

use crate::map::ExceedanceMap;

/// Domain prefix folded in ahead of the map contents.
const DOMAIN: &[u8] = b"hazcurve.pmap.v1\0";

/// SHA-256 over the map's shape, site ids, and values (all little-endian).
pub fn map_digest(map: &ExceedanceMap) -> ContentDigest {
    let shape = map.shape();
    let mut builder = DigestBuilder::new();
    builder.update(DOMAIN);
    for dim in [shape.sites, shape.levels, shape.inner] {
        builder.update(&(dim as u64).to_le_bytes());
    }
    for sid in map.sids() {
        builder.update(&sid.to_le_bytes());
    }
    for v in map.values() {
        builder.update(&v.to_le_bytes());
    }
    builder.finish()
}
