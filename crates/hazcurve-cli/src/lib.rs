//! # hazcurve-cli — Operator CLI for Probability Maps
//!
//! Provides the `hazcurve` command-line interface over the probability-map
//! kernel. Every subcommand reads and writes map archives on disk; nothing
//! here schedules or distributes work.
//!
//! ## Subcommands
//!
//! - `hazcurve build`: write a constant-valued map for a set of sites.
//! - `hazcurve inspect`: print the shape, site count and digest of an archive.
//! - `hazcurve combine`: union partial-map archives into one.
//! - `hazcurve export`: write per-site records as JSON lines.
//!
//! ```bash
//! hazcurve --config job.yaml build --sites 1,2,3 --value 0.1 -o part1.hzpm
//! hazcurve combine part1.hzpm part2.hzpm -o total.hzpm
//! hazcurve --config job.yaml export total.hzpm -o curves.jsonl
//! ```

pub mod build;
pub mod combine;
pub mod export;
pub mod inspect;

use std::path::Path;

use anyhow::{Context, Result};
use hazcurve_core::HazardConfig;

/// Load the calculation config if `--config` was given.
pub fn load_config(path: Option<&Path>) -> Result<Option<HazardConfig>> {
    path.map(|p| {
        HazardConfig::from_path(p)
            .with_context(|| format!("failed to load config: {}", p.display()))
    })
    .transpose()
}

/// Like [`load_config`], for subcommands that cannot run without one.
pub fn require_config(path: Option<&Path>, command: &str) -> Result<HazardConfig> {
    load_config(path)?
        .with_context(|| format!("`{command}` needs intensity levels; pass --config <FILE>"))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_flag_yields_none() {
        assert!(load_config(None).unwrap().is_none());
    }

    #[test]
    fn config_is_loaded_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_support::write_config(dir.path());
        let config = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.level_count(), 3);
        assert_eq!(config.inner_count, 2);
    }

    #[test]
    fn require_config_names_the_command() {
        let err = require_config(None, "export").unwrap_err();
        assert!(format!("{err:#}").contains("export"));
    }

    #[test]
    fn unreadable_config_carries_path() {
        let err = load_config(Some(Path::new("/nonexistent/job.yaml"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/job.yaml"));
    }
}
