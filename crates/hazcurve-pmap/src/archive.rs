//! # Binary Map Archive
//!
//! Persists the `{array, sids}` layout of [`crate::persist`] as one
//! little-endian blob:
//!
//! ```text
//! [magic "HZPM":4][version:2][reserved:2][N:8][L:8][Z:8]
//! [sids: u32 × N][array: f64 × N·L·Z]
//! [sha256 of every preceding byte:32]
//! ```
//!
//! Decoding validates the header, the exact length implied by `(N, L, Z)`,
//! and the checksum before a single value is interpreted. Any failure is
//! [`HazardError::ArchiveCorrupt`].

use std::io::{Read, Write};
use std::path::Path;

use hazcurve_core::{sha256_digest, HazardError, SiteId};

use crate::map::ExceedanceMap;
use crate::persist::StoredArray;

/// Archive magic bytes: "HZPM" (HaZard Probability Map).
const ARCHIVE_MAGIC: [u8; 4] = *b"HZPM";
/// Current archive format version.
pub const ARCHIVE_VERSION: u16 = 1;
/// magic(4) + version(2) + reserved(2) + N(8) + L(8) + Z(8)
const HEADER_SIZE: usize = 32;
/// sha256
const TRAILER_SIZE: usize = 32;

/// Serialize a map into archive bytes.
pub fn encode(map: &ExceedanceMap) -> Vec<u8> {
    let shape = map.shape();
    let body = shape.sites * 4 + map.values().len() * 8;
    let mut buf = Vec::with_capacity(HEADER_SIZE + body + TRAILER_SIZE);
    buf.extend_from_slice(&ARCHIVE_MAGIC);
    buf.extend_from_slice(&ARCHIVE_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    for dim in [shape.sites, shape.levels, shape.inner] {
        buf.extend_from_slice(&(dim as u64).to_le_bytes());
    }
    for sid in map.sids() {
        buf.extend_from_slice(&sid.to_le_bytes());
    }
    for v in map.values() {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    let digest = sha256_digest(&buf);
    buf.extend_from_slice(&digest.bytes);
    buf
}

/// Parse archive bytes back into a map.
pub fn decode(bytes: &[u8]) -> Result<ExceedanceMap, HazardError> {
    if bytes.len() < HEADER_SIZE + TRAILER_SIZE {
        return Err(corrupt(format!("{} bytes is shorter than header", bytes.len())));
    }
    if bytes[..4] != ARCHIVE_MAGIC {
        return Err(corrupt("bad magic".to_string()));
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != ARCHIVE_VERSION {
        return Err(corrupt(format!("unsupported version {version}")));
    }

    let sites = read_dim(bytes, 8)?;
    let levels = read_dim(bytes, 16)?;
    let inner = read_dim(bytes, 24)?;
    let values = sites
        .checked_mul(levels)
        .and_then(|n| n.checked_mul(inner))
        .ok_or_else(|| corrupt("dimensions overflow".to_string()))?;
    let expected = values
        .checked_mul(8)
        .and_then(|n| n.checked_add(sites.checked_mul(4)?))
        .and_then(|n| n.checked_add(HEADER_SIZE + TRAILER_SIZE))
        .ok_or_else(|| corrupt("dimensions overflow".to_string()))?;
    if bytes.len() != expected {
        return Err(corrupt(format!(
            "expected {expected} bytes for ({sites}, {levels}, {inner}), found {}",
            bytes.len()
        )));
    }

    let (payload, trailer) = bytes.split_at(bytes.len() - TRAILER_SIZE);
    if sha256_digest(payload).bytes[..] != trailer[..] {
        return Err(corrupt("checksum mismatch".to_string()));
    }

    let body = &payload[HEADER_SIZE..];
    let (sid_bytes, value_bytes) = body.split_at(sites * 4);
    let sids: Vec<SiteId> = sid_bytes
        .chunks_exact(4)
        .map(|c| SiteId::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    let data: Vec<f64> = value_bytes
        .chunks_exact(8)
        .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect();

    let array = StoredArray {
        dims: vec![sites, levels, inner],
        data,
    };
    ExceedanceMap::from_array(array, sids)
}

/// Write a map archive to any writer.
pub fn write_archive<W: Write>(map: &ExceedanceMap, mut out: W) -> Result<(), HazardError> {
    out.write_all(&encode(map))?;
    out.flush()?;
    Ok(())
}

/// Read a map archive from any reader.
pub fn read_archive<R: Read>(mut input: R) -> Result<ExceedanceMap, HazardError> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    decode(&bytes)
}

/// Write a map archive to `path`.
pub fn save(map: &ExceedanceMap, path: &Path) -> Result<(), HazardError> {
    let bytes = encode(map);
    std::fs::write(path, &bytes)?;
    tracing::debug!(
        path = %path.display(),
        shape = %map.shape(),
        bytes = bytes.len(),
        "wrote map archive"
    );
    Ok(())
}

/// Read a map archive from `path`.
pub fn load(path: &Path) -> Result<ExceedanceMap, HazardError> {
    let bytes = std::fs::read(path)?;
    let map = decode(&bytes).map_err(|e| match e {
        HazardError::ArchiveCorrupt(reason) => {
            HazardError::ArchiveCorrupt(format!("{}: {reason}", path.display()))
        }
        other => other,
    })?;
    tracing::debug!(path = %path.display(), shape = %map.shape(), "read map archive");
    Ok(map)
}

fn read_dim(bytes: &[u8], offset: usize) -> Result<usize, HazardError> {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    usize::try_from(u64::from_le_bytes(raw))
        .map_err(|_| corrupt(format!("dimension at offset {offset} does not fit in memory")))
}

fn corrupt(reason: String) -> HazardError {
    HazardError::ArchiveCorrupt(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExceedanceMap {
        let array = StoredArray::new(
            vec![3, 2, 2],
            vec![0.1, 0.2, 0.3, 0.4, 0.0, 0.0, 0.0, 0.0, 1.0, 0.5, 0.25, 0.125],
        )
        .unwrap();
        ExceedanceMap::from_array(array, vec![42, 7, 1_000_000]).unwrap()
    }

    #[test]
    fn round_trip_preserves_everything() {
        let map = sample();
        let back = decode(&encode(&map)).unwrap();
        assert_eq!(back, map);
        assert_eq!(back.sids(), &[42, 7, 1_000_000]);
        assert_eq!(back.shape(), map.shape());
    }

    #[test]
    fn layout_size_and_magic() {
        let bytes = encode(&sample());
        assert_eq!(&bytes[..4], b"HZPM");
        assert_eq!(bytes.len(), HEADER_SIZE + 3 * 4 + 12 * 8 + TRAILER_SIZE);
    }

    #[test]
    fn empty_map_round_trips() {
        let map = ExceedanceMap::empty(5, 2);
        let back = decode(&encode(&map)).unwrap();
        assert!(back.is_empty());
        assert_eq!((back.levels(), back.inner()), (5, 2));
    }

    #[test]
    fn flipped_bit_fails_checksum() {
        let mut bytes = encode(&sample());
        let last_value = bytes.len() - TRAILER_SIZE - 1;
        bytes[last_value] ^= 0x01;
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, HazardError::ArchiveCorrupt(ref r) if r.contains("checksum")));
    }

    #[test]
    fn truncated_archive_is_rejected() {
        let bytes = encode(&sample());
        assert!(matches!(
            decode(&bytes[..bytes.len() - 1]),
            Err(HazardError::ArchiveCorrupt(_))
        ));
        assert!(matches!(
            decode(&bytes[..10]),
            Err(HazardError::ArchiveCorrupt(_))
        ));
    }

    #[test]
    fn wrong_magic_and_version() {
        let mut bytes = encode(&sample());
        bytes[0] = b'X';
        assert!(matches!(decode(&bytes), Err(HazardError::ArchiveCorrupt(_))));

        let mut bytes = encode(&sample());
        bytes[4] = 9;
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, HazardError::ArchiveCorrupt(ref r) if r.contains("version")));
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pmap.hzpm");
        let map = sample();
        save(&map, &path).unwrap();
        assert_eq!(load(&path).unwrap(), map);
    }

    #[test]
    fn reader_writer_round_trip() {
        let map = sample();
        let mut buf = Vec::new();
        write_archive(&map, &mut buf).unwrap();
        assert_eq!(read_archive(buf.as_slice()).unwrap(), map);
    }
}
