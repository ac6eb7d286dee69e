//! Per-slice reference text files
//!
//! - File naming per k-point (G-vectors) and per (k-point, band) (coefficients)
//! - Loading and writing whitespace-delimited matrices

mod text;

pub use text::{format_sci, load_matrix, parse_matrix, write_coeffs, write_gvecs};

use anyhow::Result;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the reference slices live and how they are named
///
/// G-vectors of k-point `ik` are in `{gvecs_prefix}{ik:02}.dat`, the
/// coefficients of band `ib` in `{coeffs_prefix}{ik:02}_ib_{ib:04}.dat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceLayout {
    /// Directory holding the text files
    pub dir: PathBuf,
    /// File name prefix of G-vector slices
    pub gvecs_prefix: String,
    /// File name prefix of coefficient slices
    pub coeffs_prefix: String,
}

impl Default for ReferenceLayout {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            gvecs_prefix: "gvecs_ik_".to_string(),
            coeffs_prefix: "coeffs_ik_".to_string(),
        }
    }
}

impl ReferenceLayout {
    /// Default naming inside `dir`
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Path of the G-vector slice of k-point `ik`
    pub fn gvecs_path(&self, ik: usize) -> PathBuf {
        self.dir.join(format!("{}{:02}.dat", self.gvecs_prefix, ik))
    }

    /// Path of the coefficient slice of k-point `ik`, band `ib`
    pub fn coeffs_path(&self, ik: usize, ib: usize) -> PathBuf {
        self.dir
            .join(format!("{}{:02}_ib_{:04}.dat", self.coeffs_prefix, ik, ib))
    }

    /// Load the G-vector slice of k-point `ik`, shape `[ngk[ik], 3]`
    pub fn load_gvecs(&self, ik: usize) -> Result<Array2<f64>> {
        load_matrix(self.gvecs_path(ik), Some(3))
    }

    /// Load the coefficient slice of k-point `ik`, band `ib`, shape `[ngk[ik], 2]`
    pub fn load_coeffs(&self, ik: usize, ib: usize) -> Result<Array2<f64>> {
        load_matrix(self.coeffs_path(ik, ib), Some(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_names() {
        let refs = ReferenceLayout::default();
        assert_eq!(refs.gvecs_path(3), Path::new("./gvecs_ik_03.dat"));
        assert_eq!(refs.coeffs_path(12, 7), Path::new("./coeffs_ik_12_ib_0007.dat"));
    }

    #[test]
    fn test_wide_indices_are_not_truncated() {
        let refs = ReferenceLayout::in_dir("/data");
        assert_eq!(refs.gvecs_path(123), Path::new("/data/gvecs_ik_123.dat"));
        assert_eq!(refs.coeffs_path(0, 12345), Path::new("/data/coeffs_ik_00_ib_12345.dat"));
    }
}
