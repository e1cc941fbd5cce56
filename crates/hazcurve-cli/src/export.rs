//! # Export CLI — Per-site records as JSON lines.
//!
//! ```bash
//! hazcurve --config job.yaml export total.hzpm --inner 0 -o curves.jsonl
//! ```
//!
//! One line per site id in `0..site_count`; sites the map does not cover
//! are written with zero probabilities.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use hazcurve_pmap::{convert_to_records, load, write_json_lines};

use crate::require_config;

/// Arguments for `hazcurve export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Archive to export.
    pub archive: PathBuf,

    /// Inner realization to export.
    #[arg(long, default_value_t = 0)]
    pub inner: usize,

    /// Number of sites. Defaults to `site_count` of the config, then to
    /// one past the largest site id in the map.
    #[arg(long)]
    pub site_count: Option<usize>,

    /// Output file. Writes to stdout when absent.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Execute `hazcurve export`.
pub fn run_export(args: &ExportArgs, config: Option<&Path>) -> Result<u8> {
    let config = require_config(config, "export")?;
    let map = load(&args.archive)
        .with_context(|| format!("failed to read archive: {}", args.archive.display()))?;
    let site_count = args
        .site_count
        .or(config.site_count)
        .unwrap_or_else(|| map.sids().iter().max().map_or(0, |sid| *sid as usize + 1));

    let records = convert_to_records(&map, &config.imtls, site_count, args.inner)
        .context("failed to convert map to records")?;

    match &args.out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_json_lines(&records, BufWriter::new(file))?;
            tracing::info!(out = %path.display(), sites = records.len(), "exported records");
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write_json_lines(&records, &mut lock)?;
            lock.flush()?;
        }
    }
    Ok(0)
}
