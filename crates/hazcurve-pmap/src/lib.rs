//! # hazcurve-pmap — Probability Maps for Hazard Curves
//!
//! The numerical kernel of the hazcurve workspace. Every hazard-curve
//! computation ends up here: independent workers each produce an
//! [`ExceedanceMap`] over a subset of sites, and a reducer merges them by
//! independent union into the final per-site curves.
//!
//! ## Probability Algebra
//!
//! | Operation | Formula | Method |
//! |-----------|---------|--------|
//! | independent union | `1 − (1−a)(1−b)` | `union`, `union_in_place` |
//! | complement | `1 − p` | `complement` |
//! | mutually exclusive sum | `a + b` | `sum`, `sum_in_place` |
//! | scaling | `a · b` | `scaled_by`, `scaled_by_scalar` |
//! | power | `pⁿ` | `raised_to` |
//!
//! Union is commutative and associative with identity 0, which is what makes
//! the order in which partial maps arrive irrelevant. The sum is only
//! meaningful for mutually exclusive events; that is a caller obligation and
//! is not checked.
//!
//! ## Modules
//!
//! - `curve`: [`ExceedanceCurve`], one site's `(L, Z)` array.
//! - `map`: [`ExceedanceMap`] storage, [`SiteIndex`], [`CurveMapping`].
//! - `algebra`: the operations above broadcast over maps, plus slicing,
//!   restriction and site-set growth.
//! - `combine`: [`shape_of`], [`combine`], [`MapAccumulator`].
//! - `export`: per-IMT [`HazardRecord`]s and JSON-lines output.
//! - `persist`: the `{array, sids}` structured layout.
//! - `archive`: the checksummed binary archive.
//! - `digest`: [`map_digest`].
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - Validation happens before mutation; a failed operation leaves its
//!   operands untouched.

mod algebra;
pub mod archive;
pub mod combine;
pub mod curve;
pub mod digest;
pub mod export;
pub mod map;
pub mod persist;

pub use archive::{decode, encode, load, read_archive, save, write_archive, ARCHIVE_VERSION};
pub use combine::{combine, shape_of, MapAccumulator};
pub use curve::ExceedanceCurve;
pub use digest::map_digest;
pub use export::{convert_to_records, write_json_lines, HazardRecord};
pub use map::{CurveMapping, ExceedanceMap, MapShape, SiteIndex};
pub use persist::{StoredArray, StoredAttrs, StoredMap};
