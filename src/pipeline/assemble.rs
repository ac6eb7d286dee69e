//! Assemble a WFN file from `header.dat` and per-slice text files

use anyhow::{Context, Result};
use ndarray::{s, Array2, Array4};
use std::path::Path;
use tracing::{debug, info, warn};

use super::kpoint_progress;
use crate::config::DEFAULT_HEADER;
use crate::reference::ReferenceLayout;
use crate::wfn::{WfnFile, WfnHeader};

/// Read `header.dat` and the text slices in `reference.dir` and write them
/// to a new WFN file at `output`
///
/// The text files carry one spin component; further components of `coeffs`
/// are left at zero.
pub fn assemble<P: AsRef<Path>>(reference: &ReferenceLayout, output: P) -> Result<WfnHeader> {
    let header = WfnHeader::load(reference.dir.join(DEFAULT_HEADER))?;
    let layout = header.layout();
    info!(
        "Assembling {} k-points, {} bands, {} G-vectors in total",
        header.nrk,
        header.mnband,
        header.ngktot()
    );
    if header.ns() == 0 {
        anyhow::bail!("header.dat declares no spin components");
    }
    if header.ns() > 1 {
        warn!("{} spin components; only the first is filled", header.ns());
    }

    let wfn = WfnFile::create(output.as_ref())?;
    wfn.write_header(&header)?;

    let pb = kpoint_progress(header.nrk, "Writing wavefunctions")?;
    for ik in 0..header.nrk {
        let ng = layout.count(ik)?;
        debug!("k-point {}: {} G-vectors", ik, ng);

        let path = reference.gvecs_path(ik);
        let gs = reference.load_gvecs(ik)?;
        if gs.nrows() != ng {
            anyhow::bail!("{:?} has {} rows, expected ngk = {}", path, gs.nrows(), ng);
        }
        let gvecs = gs
            .iter()
            .map(|&g| {
                gvec_component(g)
                    .ok_or_else(|| anyhow::anyhow!("{:?}: G-vector component {} is not an integer", path, g))
            })
            .collect::<Result<Vec<_>>>()?;
        let gvecs = Array2::from_shape_vec((ng, 3), gvecs)?;
        wfn.write_gvecs_rows(&layout, ik, gvecs.view())?;

        let mut block = Array4::<f64>::zeros((header.mnband, header.ns(), ng, 2));
        for ib in 0..header.mnband {
            let cg = reference.load_coeffs(ik, ib)?;
            if cg.nrows() != ng {
                anyhow::bail!(
                    "{:?} has {} rows, expected ngk = {}",
                    reference.coeffs_path(ik, ib),
                    cg.nrows(),
                    ng
                );
            }
            block.slice_mut(s![ib, 0, .., ..]).assign(&cg);
        }
        wfn.write_coeffs_rows(&layout, ik, block.view())
            .with_context(|| format!("Failed to store k-point {}", ik))?;
        pb.inc(1);
    }
    pb.finish_with_message("Wavefunctions written");

    info!("Wrote {:?}", wfn.path());
    Ok(header)
}

/// Exact i32 value of a G-vector component read as text
fn gvec_component(g: f64) -> Option<i32> {
    if g.fract() == 0.0 && (i32::MIN as f64..=i32::MAX as f64).contains(&g) {
        Some(g as i32)
    } else {
        None
    }
}
