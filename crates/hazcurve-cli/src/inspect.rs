//! # Inspect CLI — Archive summaries.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use hazcurve_core::SiteId;
use hazcurve_pmap::{load, map_digest, CurveMapping, ExceedanceMap};

/// Arguments for `hazcurve inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Archive to inspect.
    pub archive: PathBuf,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

/// What `inspect` reports about an archive.
#[derive(Debug, Serialize, PartialEq)]
pub struct MapSummary {
    pub sites: usize,
    pub levels: usize,
    pub inner: usize,
    /// Sites whose curve has at least one non-zero entry.
    pub nonzero_sites: usize,
    pub min_sid: Option<SiteId>,
    pub max_sid: Option<SiteId>,
    pub max_poe: f64,
    pub digest: String,
}

impl MapSummary {
    pub fn of(map: &ExceedanceMap) -> Self {
        let shape = map.shape();
        Self {
            sites: shape.sites,
            levels: shape.levels,
            inner: shape.inner,
            nonzero_sites: map
                .iter()
                .filter(|(_, row)| row.iter().any(|v| *v != 0.0))
                .count(),
            min_sid: map.site_ids().iter().min().copied(),
            max_sid: map.site_ids().iter().max().copied(),
            max_poe: map.values().iter().copied().fold(0.0, f64::max),
            digest: map_digest(map).to_string(),
        }
    }
}

/// Execute `hazcurve inspect`.
pub fn run_inspect(args: &InspectArgs) -> Result<u8> {
    let map = load(&args.archive)
        .with_context(|| format!("failed to read archive: {}", args.archive.display()))?;
    let summary = MapSummary::of(&map);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(0);
    }
    println!("  archive:  {}", args.archive.display());
    println!("  shape:    {}", map.shape());
    println!("  nonzero:  {}/{}", summary.nonzero_sites, summary.sites);
    if let (Some(lo), Some(hi)) = (summary.min_sid, summary.max_sid) {
        println!("  sids:     {lo}..={hi}");
    }
    println!("  max poe:  {}", summary.max_poe);
    println!("  digest:   {}", summary.digest);
    Ok(0)
}
