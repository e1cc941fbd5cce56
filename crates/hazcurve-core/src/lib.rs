//! # hazcurve-core — Foundational Types for Hazard Curves
//!
//! This crate is the leaf of the hazcurve workspace. It defines the types
//! shared by the probability-map kernel and the CLI; it depends on nothing
//! internal.
//!
//! ## Contents
//!
//! - **Errors** (`error.rs`): the [`HazardError`] hierarchy. Every kernel
//!   failure is a local, non-retryable data error.
//!
//! - **Probabilities** (`probability.rs`): validation of scalar
//!   probabilities against the closed interval `[0, 1]`.
//!
//! - **Intensity levels** (`imt.rs`): [`IntensityLevels`] maps an
//!   intensity-measure type (PGA, SA(0.1), ...) to a contiguous range of the
//!   level axis and describes the flat record layout used for export.
//!
//! - **Configuration** (`config.rs`): the YAML calculation config read by
//!   the CLI.
//!
//! - **Digests** (`digest.rs`): SHA-256 content digests used by archive
//!   integrity trailers and map fingerprints.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod digest;
pub mod error;
pub mod imt;
pub mod probability;

/// Identifier of a site. Site ids are unsigned and unique within a map.
pub type SiteId = u32;

// Re-export primary types for ergonomic imports.
pub use config::{ConfigError, HazardConfig};
pub use digest::{sha256_digest, ContentDigest, DigestBuilder, DIGEST_PREFIX};
pub use error::HazardError;
pub use imt::{ImtLevels, IntensityLevels, RecordField};
pub use probability::validate_probability;
