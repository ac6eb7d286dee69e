//! Comparison of two WFN datasets and their reference text slices
//!
//! The global check compares the whole G-vector tables and coefficient
//! tensors. The per-slice check walks every k-point and band, comparing the
//! matching slice of each dataset against an independently written text file.

mod metrics;

pub use metrics::{max_abs_diff, max_row_norm_diff, row_norm};

use anyhow::{Context, Result};
use std::io::Write;
use tracing::debug;

use crate::reference::ReferenceLayout;
use crate::wfn::{KPointLayout, WfnArrays};

/// Options for a comparison run
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Compare every k-point/band slice against the reference text files
    pub per_slice: bool,
    /// Naming of the reference text files
    pub reference: ReferenceLayout,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            per_slice: true,
            reference: ReferenceLayout::default(),
        }
    }
}

/// Iteration bounds of the per-slice check (`nrk`, `mnband`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceCounts {
    /// Number of k-points
    pub nk: usize,
    /// Number of bands
    pub nb: usize,
}

/// Whole-array discrepancies between the two datasets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalErrors {
    /// `max |gvecs1 - gvecs2|`
    pub gvecs: f64,
    /// max modulus of `coeffs1 - coeffs2`
    pub coeffs: f64,
}

/// Errors of one slice against its reference text file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceErrors {
    /// Reference vs. the first ("orig") dataset
    pub orig: f64,
    /// Reference vs. the second ("output") dataset
    pub output: f64,
}

/// Per-slice errors of one k-point
#[derive(Debug, Clone, PartialEq)]
pub struct KPointReport {
    /// k-point index
    pub ik: usize,
    /// G-vector slice errors
    pub gvecs: SliceErrors,
    /// Coefficient slice errors, one per band
    pub bands: Vec<SliceErrors>,
}

/// Everything a comparison run computed
#[derive(Debug, Clone, PartialEq)]
pub struct CompareReport {
    /// Whole-array errors
    pub global: GlobalErrors,
    /// Per-k-point errors (empty unless the per-slice check ran)
    pub kpoints: Vec<KPointReport>,
}

impl CompareReport {
    /// Largest error seen anywhere in the report
    pub fn worst(&self) -> f64 {
        self.kpoints
            .iter()
            .flat_map(|k| std::iter::once(&k.gvecs).chain(k.bands.iter()))
            .flat_map(|e| [e.orig, e.output])
            .fold(self.global.gvecs.max(self.global.coeffs), f64::max)
    }
}

/// Two loaded datasets sharing the row layout of the first
pub struct Comparison<'a> {
    layout: &'a KPointLayout,
    orig: &'a WfnArrays,
    output: &'a WfnArrays,
}

impl<'a> Comparison<'a> {
    /// Pair the datasets; `layout` is only used by the per-slice check
    pub fn new(layout: &'a KPointLayout, orig: &'a WfnArrays, output: &'a WfnArrays) -> Self {
        Self { layout, orig, output }
    }

    /// Both datasets must store exactly the rows `layout` describes before
    /// they can be sliced per k-point
    pub fn check_layout(&self) -> Result<()> {
        for (name, wfn) in [("orig", self.orig), ("output", self.output)] {
            if wfn.ngktot() != self.layout.total() {
                anyhow::bail!(
                    "{} dataset has {} G-vectors but ngk sums to {}",
                    name,
                    wfn.ngktot(),
                    self.layout.total()
                );
            }
        }
        Ok(())
    }

    /// Whole-array errors
    pub fn global(&self) -> Result<GlobalErrors> {
        let gvecs = max_abs_diff(&self.orig.gvecs, &self.output.gvecs).context("Comparing G-vectors")?;
        let coeffs =
            max_row_norm_diff(&self.orig.coeffs, &self.output.coeffs).context("Comparing coefficients")?;
        Ok(GlobalErrors { gvecs, coeffs })
    }

    /// G-vector slice errors of k-point `ik`
    pub fn gvecs_slice(&self, ik: usize, reference: &ReferenceLayout) -> Result<SliceErrors> {
        let range = self.layout.range(ik)?;
        let gs = reference.load_gvecs(ik)?;
        let gs1 = self.orig.gvecs_slice(range.clone())?;
        let gs2 = self.output.gvecs_slice(range)?;
        let ctx = || format!("G-vectors of k-point {}", ik);
        Ok(SliceErrors {
            orig: max_row_norm_diff(&gs, &gs1).with_context(ctx)?,
            output: max_row_norm_diff(&gs, &gs2).with_context(ctx)?,
        })
    }

    /// Coefficient slice errors of k-point `ik`, band `ib`
    pub fn coeffs_slice(&self, ik: usize, ib: usize, reference: &ReferenceLayout) -> Result<SliceErrors> {
        let range = self.layout.range(ik)?;
        let cg = reference.load_coeffs(ik, ib)?;
        let cg1 = self.orig.coeffs_slice(ib, range.clone())?;
        let cg2 = self.output.coeffs_slice(ib, range)?;
        let ctx = || format!("coefficients of k-point {}, band {}", ik, ib);
        Ok(SliceErrors {
            orig: max_row_norm_diff(&cg, &cg1).with_context(ctx)?,
            output: max_row_norm_diff(&cg, &cg2).with_context(ctx)?,
        })
    }

    /// Run the comparison, writing the report to `out` as each number is
    /// computed
    ///
    /// The global errors are always written first. `counts` yields the
    /// bounds of the per-slice check and is only called when
    /// `options.per_slice` is set, after the global lines are out. The first
    /// missing or malformed reference file aborts the run.
    pub fn run<W, F>(&self, options: &CompareOptions, counts: F, out: &mut W) -> Result<CompareReport>
    where
        W: Write,
        F: FnOnce() -> Result<SliceCounts>,
    {
        let global = self.global()?;
        writeln!(out, "G-vector error: {}", fmt_error(global.gvecs))?;
        writeln!(out, "WFN error: {}", fmt_error(global.coeffs))?;
        out.flush()?;

        let mut report = CompareReport { global, kpoints: Vec::new() };
        if !options.per_slice {
            return Ok(report);
        }

        self.check_layout()?;
        let counts = counts()?;
        let reference = &options.reference;
        for ik in 0..counts.nk {
            debug!("Comparing k-point {} ({} G-vectors)", ik, self.layout.count(ik)?);

            let gvecs = self.gvecs_slice(ik, reference)?;
            writeln!(out, "G-vectors")?;
            write_pair(out, &gvecs)?;
            writeln!(out)?;

            writeln!(out, "Coefficients")?;
            let mut bands = Vec::with_capacity(counts.nb);
            for ib in 0..counts.nb {
                let errors = self.coeffs_slice(ik, ib, reference)?;
                write_pair(out, &errors)?;
                bands.push(errors);
            }
            writeln!(out)?;
            out.flush()?;

            report.kpoints.push(KPointReport { ik, gvecs, bands });
        }

        Ok(report)
    }
}

fn write_pair<W: Write>(out: &mut W, errors: &SliceErrors) -> Result<()> {
    writeln!(out, "  Text file - orig WFN error: {}", fmt_error(errors.orig))?;
    writeln!(out, "  Text file - output WFN error: {}", fmt_error(errors.output))?;
    Ok(())
}

fn fmt_error(x: f64) -> String {
    format!("{:.6e}", x)
}
