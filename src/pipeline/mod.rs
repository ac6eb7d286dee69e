//! File-level drivers
//!
//! 1. `compare`: load two WFN files and run the global and per-slice checks
//! 2. `dump`: write the reference text slices and `header.dat` of one WFN file
//! 3. `assemble`: rebuild a WFN file from `header.dat` and the text slices

mod assemble;
mod dump;

pub use assemble::assemble;
pub use dump::{dump, DumpSummary};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use tracing::info;

use crate::compare::{CompareReport, Comparison, SliceCounts};
use crate::config::CompareConfig;
use crate::wfn::WfnFile;

/// Compare the two WFN files named in `config`, writing the report to `out`
pub fn compare<W: Write>(config: &CompareConfig, out: &mut W) -> Result<CompareReport> {
    let orig = WfnFile::open(&config.orig)?;
    let new = WfnFile::open(&config.new)?;

    // Both datasets are sliced with the first file's ngk
    let layout = orig.read_layout()?;
    info!(
        "{} k-points, {} G-vectors in total",
        layout.num_kpoints(),
        layout.total()
    );

    let orig_arrays = orig.read_arrays()?;
    let new_arrays = new.read_arrays()?;

    // nrk and mnband are only needed once the global errors are out
    let counts = || -> Result<SliceCounts> {
        let counts = SliceCounts {
            nk: orig.read_nrk()?,
            nb: orig.read_mnband()?,
        };
        info!(
            "Per-slice check: {} k-points x {} bands against {:?}",
            counts.nk, counts.nb, config.reference.dir
        );
        Ok(counts)
    };

    Comparison::new(&layout, &orig_arrays, &new_arrays)
        .run(&config.options(), counts, out)
        .with_context(|| format!("Comparing {:?} with {:?}", config.orig, config.new))
}

fn kpoint_progress(nk: usize, msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(nk as u64);
    pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} {msg} [{bar:30}] {pos}/{len}")?);
    pb.set_message(msg.to_string());
    Ok(pb)
}
