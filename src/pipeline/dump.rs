//! Dump a WFN file into per-slice reference text files

use anyhow::{Context, Result};
use ndarray::s;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

use super::kpoint_progress;
use crate::config::DEFAULT_HEADER;
use crate::reference::{write_coeffs, write_gvecs, ReferenceLayout};
use crate::wfn::{WfnFile, WfnHeader, COEFFS_PATH, GVECS_PATH};

/// What a dump wrote
#[derive(Debug, Clone)]
pub struct DumpSummary {
    /// Header of the dumped file
    pub header: WfnHeader,
    /// Shape of `wfns/gvecs`
    pub gvecs_shape: Vec<usize>,
    /// Shape of `wfns/coeffs`
    pub coeffs_shape: Vec<usize>,
    /// Number of text files written, `header.dat` included
    pub files_written: usize,
}

/// Write `header.dat`, one G-vector file per k-point and one coefficient
/// file per (k-point, band) into `reference.dir`
///
/// Only the first spin component of the coefficients is written. A header
/// summary and the dataset shapes go to `out`.
pub fn dump<P: AsRef<Path>, W: Write>(input: P, reference: &ReferenceLayout, out: &mut W) -> Result<DumpSummary> {
    let wfn = WfnFile::open(input.as_ref())?;
    let header = wfn.read_header()?;

    writeln!(out, "Number of spin components: {}", header.nspin)?;
    writeln!(out, "Number of spinor components: {}", header.nspinor)?;
    writeln!(out, "Number of bands: {}", header.mnband)?;
    writeln!(out, "Number of k-points: {}", header.nrk)?;
    writeln!(out, "Number of g-vectors per k-point:")?;
    for n in &header.ngk {
        writeln!(out, "- {}", n)?;
    }
    writeln!(out)?;

    let gvecs_shape = wfn.shape(GVECS_PATH)?;
    let coeffs_shape = wfn.shape(COEFFS_PATH)?;
    for (name, shape) in [(GVECS_PATH, &gvecs_shape), (COEFFS_PATH, &coeffs_shape)] {
        writeln!(out, "Rank of array {}: {}", name, shape.len())?;
        let dims = shape.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(" ");
        writeln!(out, "Dimensions: {}", dims)?;
        writeln!(out)?;
    }

    if header.ngk.len() < header.nrk {
        anyhow::bail!("ngk has {} entries but nrk = {}", header.ngk.len(), header.nrk);
    }
    if header.ns() > 1 {
        warn!("{} spin components; only the first is dumped", header.ns());
    }

    std::fs::create_dir_all(&reference.dir)
        .with_context(|| format!("Failed to create output directory: {:?}", reference.dir))?;
    let header_path = reference.dir.join(DEFAULT_HEADER);
    std::fs::write(&header_path, header.to_header_dat())
        .with_context(|| format!("Failed to write {:?}", header_path))?;
    let mut files_written = 1;

    let layout = header.layout();
    let pb = kpoint_progress(header.nrk, "Dumping wavefunctions")?;
    for ik in 0..header.nrk {
        let gvecs = wfn.read_gvecs_rows(&layout, ik)?;
        write_gvecs(reference.gvecs_path(ik), gvecs.view())?;
        files_written += 1;

        let coeffs = wfn.read_coeffs_rows(&layout, ik)?;
        if coeffs.shape()[0] < header.mnband || coeffs.shape()[1] == 0 {
            anyhow::bail!(
                "coeffs block of k-point {} has shape {:?}, expected {} bands",
                ik,
                coeffs.shape(),
                header.mnband
            );
        }
        for ib in 0..header.mnband {
            write_coeffs(reference.coeffs_path(ik, ib), coeffs.slice(s![ib, 0, .., ..]))?;
            files_written += 1;
        }
        pb.inc(1);
    }
    pb.finish_with_message("Wavefunctions dumped");

    info!("Wrote {} files to {:?}", files_written, reference.dir);
    Ok(DumpSummary {
        header,
        gvecs_shape,
        coeffs_shape,
        files_written,
    })
}
