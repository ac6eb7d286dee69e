//! Wavefunction (WFN) data model
//!
//! - Header metadata (`ngk`, `nrk`, `mnband`, spin counts)
//! - Row layout of the flattened G-vector axis
//! - G-vector and coefficient arrays with per-k-point slicing
//! - HDF5 container access (feature `hdf5`)

mod header;
mod layout;
#[cfg(feature = "hdf5")]
mod h5;

pub use header::WfnHeader;
pub use layout::KPointLayout;
#[cfg(feature = "hdf5")]
pub use h5::WfnFile;

use anyhow::Result;
use ndarray::{s, Array2, Array4, ArrayView2};
use std::ops::Range;

/// Dataset path of the per-k-point G-vector counts
pub const NGK_PATH: &str = "mf_header/kpoints/ngk";
/// Dataset path of the k-point count
pub const NRK_PATH: &str = "mf_header/kpoints/nrk";
/// Dataset path of the band count
pub const MNBAND_PATH: &str = "mf_header/kpoints/mnband";
/// Dataset path of the spin component count
pub const NSPIN_PATH: &str = "mf_header/kpoints/nspin";
/// Dataset path of the spinor component count
pub const NSPINOR_PATH: &str = "mf_header/kpoints/nspinor";
/// Dataset path of the G-vector table
pub const GVECS_PATH: &str = "wfns/gvecs";
/// Dataset path of the coefficient tensor
pub const COEFFS_PATH: &str = "wfns/coeffs";

/// The two large arrays of a WFN file
#[derive(Debug, Clone, PartialEq)]
pub struct WfnArrays {
    /// G-vectors, shape `[ngktot, 3]`
    pub gvecs: Array2<f64>,
    /// Coefficients as (re, im), shape `[nb, ns, ngktot, 2]`
    pub coeffs: Array4<f64>,
}

impl WfnArrays {
    /// Wrap loaded arrays, checking that both use the same G-vector axis
    pub fn new(gvecs: Array2<f64>, coeffs: Array4<f64>) -> Result<Self> {
        if gvecs.ncols() != 3 {
            anyhow::bail!("gvecs must have 3 columns, got shape {:?}", gvecs.shape());
        }
        if coeffs.shape()[3] != 2 {
            anyhow::bail!("coeffs last axis must be (re, im), got shape {:?}", coeffs.shape());
        }
        if coeffs.shape()[2] != gvecs.nrows() {
            anyhow::bail!(
                "coeffs has {} G-vector rows but gvecs has {}",
                coeffs.shape()[2],
                gvecs.nrows()
            );
        }
        Ok(Self { gvecs, coeffs })
    }

    /// Number of G-vector rows
    pub fn ngktot(&self) -> usize {
        self.gvecs.nrows()
    }

    /// Number of bands
    pub fn num_bands(&self) -> usize {
        self.coeffs.shape()[0]
    }

    /// G-vector rows `range`, shape `[range.len(), 3]`
    pub fn gvecs_slice(&self, range: Range<usize>) -> Result<ArrayView2<'_, f64>> {
        self.check_rows(&range)?;
        Ok(self.gvecs.slice(s![range, ..]))
    }

    /// Coefficients of band `ib`, first spin component, rows `range`;
    /// shape `[range.len(), 2]`
    pub fn coeffs_slice(&self, ib: usize, range: Range<usize>) -> Result<ArrayView2<'_, f64>> {
        if ib >= self.num_bands() {
            anyhow::bail!("band {} out of range: coeffs has {} bands", ib, self.num_bands());
        }
        if self.coeffs.shape()[1] == 0 {
            anyhow::bail!("coeffs has no spin components");
        }
        self.check_rows(&range)?;
        Ok(self.coeffs.slice(s![ib, 0, range, ..]))
    }

    fn check_rows(&self, range: &Range<usize>) -> Result<()> {
        if range.end > self.ngktot() {
            anyhow::bail!(
                "rows {:?} exceed the {} G-vectors stored in the file",
                range,
                self.ngktot()
            );
        }
        Ok(())
    }
}
