//! # Build CLI — Constant-valued map archives.
//!
//! Writes a map over the given sites with every entry set to one
//! probability. Useful for seeding a reducer or producing fixtures.
//!
//! ```bash
//! hazcurve --config job.yaml build --sites 1,2,3 --value 0.1 -o seed.hzpm
//! hazcurve build --sites 7 --levels 20 --inner 1 -o seed.hzpm
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use hazcurve_core::SiteId;
use hazcurve_pmap::{map_digest, save, ExceedanceMap};

use crate::load_config;

/// Arguments for `hazcurve build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Site ids, comma separated. Duplicates are dropped and ids sorted.
    #[arg(long, value_delimiter = ',', required = true)]
    pub sites: Vec<SiteId>,

    /// Initial probability for every entry.
    #[arg(long, default_value_t = 0.0)]
    pub value: f64,

    /// Level count. Defaults to the total level count of the config.
    #[arg(long)]
    pub levels: Option<usize>,

    /// Inner realization count. Defaults to `inner_count` of the config.
    #[arg(long)]
    pub inner: Option<usize>,

    /// Output archive path.
    #[arg(short, long)]
    pub out: PathBuf,
}

/// Execute `hazcurve build`.
pub fn run_build(args: &BuildArgs, config: Option<&Path>) -> Result<u8> {
    let config = load_config(config)?;
    let levels = match (args.levels, &config) {
        (Some(levels), _) => levels,
        (None, Some(config)) => config.level_count(),
        (None, None) => bail!("--levels is required without --config"),
    };
    let inner = args
        .inner
        .or_else(|| config.as_ref().map(|c| c.inner_count))
        .unwrap_or(1);
    if levels == 0 || inner == 0 {
        bail!("levels and inner must be positive, got ({levels}, {inner})");
    }

    let map = ExceedanceMap::build(levels, inner, args.sites.iter().copied(), args.value)
        .context("failed to build map")?;
    save(&map, &args.out)
        .with_context(|| format!("failed to write archive: {}", args.out.display()))?;

    tracing::info!(out = %args.out.display(), shape = %map.shape(), "built map");
    println!("  shape:  {}", map.shape());
    println!("  digest: {}", map_digest(&map));
    println!("  wrote:  {}", args.out.display());
    Ok(0)
}
