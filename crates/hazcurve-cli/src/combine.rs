//! # Combine CLI — Reduce partial maps.
//!
//! Streams partial-map archives through a [`MapAccumulator`] so only the
//! aggregate and one input are held in memory at a time.
//!
//! ```bash
//! hazcurve combine out/part-*.hzpm -o total.hzpm
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hazcurve_pmap::{load, map_digest, save, MapAccumulator};

/// Arguments for `hazcurve combine`.
#[derive(Args, Debug)]
pub struct CombineArgs {
    /// Partial-map archives to union.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output archive path.
    #[arg(short, long)]
    pub out: PathBuf,
}

/// Execute `hazcurve combine`.
pub fn run_combine(args: &CombineArgs) -> Result<u8> {
    let mut acc = MapAccumulator::new();
    for input in &args.inputs {
        let part = load(input)
            .with_context(|| format!("failed to read archive: {}", input.display()))?;
        tracing::debug!(input = %input.display(), shape = %part.shape(), "absorbing");
        acc.absorb(part)
            .with_context(|| format!("cannot combine {}", input.display()))?;
    }
    let total = acc
        .finish()
        .context("nothing to combine: every input map is empty")?;
    save(&total, &args.out)
        .with_context(|| format!("failed to write archive: {}", args.out.display()))?;

    tracing::info!(inputs = args.inputs.len(), shape = %total.shape(), "combined maps");
    println!("  inputs: {}", args.inputs.len());
    println!("  shape:  {}", total.shape());
    println!("  digest: {}", map_digest(&total));
    println!("  wrote:  {}", args.out.display());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hazcurve_pmap::ExceedanceMap;

    fn write(dir: &std::path::Path, name: &str, map: &ExceedanceMap) -> PathBuf {
        let path = dir.join(name);
        save(map, &path).unwrap();
        path
    }

    #[test]
    fn combine_unions_and_grows_site_set() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.hzpm", &ExceedanceMap::build(2, 1, [1, 2], 0.5).unwrap());
        let b = write(dir.path(), "b.hzpm", &ExceedanceMap::build(2, 1, [2, 3], 0.5).unwrap());
        let out = dir.path().join("total.hzpm");
        let args = CombineArgs {
            inputs: vec![a, b],
            out: out.clone(),
        };
        assert_eq!(run_combine(&args).unwrap(), 0);

        let total = load(&out).unwrap();
        assert_eq!(total.len(), 3);
        assert_eq!(total.get(2).unwrap(), &[0.75, 0.75]);
        assert_eq!(total.get(3).unwrap(), &[0.5, 0.5]);
    }

    #[test]
    fn combine_of_empty_maps_fails() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.hzpm", &ExceedanceMap::empty(2, 1));
        let args = CombineArgs {
            inputs: vec![a],
            out: dir.path().join("total.hzpm"),
        };
        let err = run_combine(&args).unwrap_err();
        assert!(format!("{err:#}").contains("empty"));
        assert!(!dir.path().join("total.hzpm").exists());
    }

    #[test]
    fn combine_reports_the_mismatched_input() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.hzpm", &ExceedanceMap::build(4, 2, [1], 0.1).unwrap());
        let b = write(dir.path(), "b.hzpm", &ExceedanceMap::build(4, 3, [1], 0.1).unwrap());
        let args = CombineArgs {
            inputs: vec![a, b],
            out: dir.path().join("total.hzpm"),
        };
        let err = run_combine(&args).unwrap_err();
        assert!(format!("{err:#}").contains("b.hzpm"));
    }
}
