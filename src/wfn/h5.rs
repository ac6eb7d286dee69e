//! HDF5 access to WFN files
//!
//! Reads header scalars, `ngk` and the full or per-k-point G-vector and
//! coefficient arrays, and creates new WFN files for the assembler.

use anyhow::{Context, Result};
use ndarray::{s, Array2, Array4, ArrayView1, ArrayView2, ArrayView4, Ix2, Ix4};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{
    KPointLayout, WfnArrays, WfnHeader, COEFFS_PATH, GVECS_PATH, MNBAND_PATH, NGK_PATH,
    NRK_PATH, NSPINOR_PATH, NSPIN_PATH,
};

/// An open WFN container
pub struct WfnFile {
    file: hdf5::File,
    path: PathBuf,
}

impl WfnFile {
    /// Open an existing WFN file read-only
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = hdf5::File::open(path)
            .with_context(|| format!("Failed to open WFN file: {:?}", path))?;
        debug!("Opened {:?}", path);
        Ok(Self { file, path: path.to_path_buf() })
    }

    /// Create (truncate) a WFN file for writing
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = hdf5::File::create(path)
            .with_context(|| format!("Failed to create WFN file: {:?}", path))?;
        debug!("Created {:?}", path);
        Ok(Self { file, path: path.to_path_buf() })
    }

    /// Path the file was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dataset(&self, name: &str) -> Result<hdf5::Dataset> {
        if !self.file.link_exists(name) {
            anyhow::bail!("Missing dataset '{}' in {:?}", name, self.path);
        }
        self.file
            .dataset(name)
            .with_context(|| format!("Failed to open dataset '{}' in {:?}", name, self.path))
    }

    /// Shape of a dataset
    pub fn shape(&self, name: &str) -> Result<Vec<usize>> {
        Ok(self.dataset(name)?.shape())
    }

    /// Read a single non-negative integer (scalar or one-element dataset)
    fn read_count(&self, name: &str) -> Result<usize> {
        let values = self
            .dataset(name)?
            .read_raw::<i32>()
            .with_context(|| format!("Failed to read '{}' from {:?}", name, self.path))?;
        match values.as_slice() {
            [v] => usize::try_from(*v)
                .map_err(|_| anyhow::anyhow!("'{}' in {:?} is negative: {}", name, self.path, v)),
            _ => anyhow::bail!(
                "'{}' in {:?} should hold one value, found {}",
                name,
                self.path,
                values.len()
            ),
        }
    }

    /// Number of k-points (`nrk`)
    pub fn read_nrk(&self) -> Result<usize> {
        self.read_count(NRK_PATH)
    }

    /// Number of bands (`mnband`)
    pub fn read_mnband(&self) -> Result<usize> {
        self.read_count(MNBAND_PATH)
    }

    /// G-vector counts per k-point (`ngk`)
    pub fn read_ngk(&self) -> Result<Vec<usize>> {
        let raw = self
            .dataset(NGK_PATH)?
            .read_raw::<i32>()
            .with_context(|| format!("Failed to read '{}' from {:?}", NGK_PATH, self.path))?;
        raw.iter()
            .map(|&n| {
                usize::try_from(n)
                    .map_err(|_| anyhow::anyhow!("Negative G-vector count {} in {:?}", n, self.path))
            })
            .collect()
    }

    /// Row layout built from `ngk`
    pub fn read_layout(&self) -> Result<KPointLayout> {
        Ok(KPointLayout::new(&self.read_ngk()?))
    }

    /// All header metadata
    pub fn read_header(&self) -> Result<WfnHeader> {
        Ok(WfnHeader {
            nrk: self.read_nrk()?,
            nspin: self.read_count(NSPIN_PATH)?,
            nspinor: self.read_count(NSPINOR_PATH)?,
            mnband: self.read_mnband()?,
            ngk: self.read_ngk()?,
        })
    }

    /// Full G-vector table as f64, shape `[ngktot, 3]`
    pub fn read_gvecs(&self) -> Result<Array2<f64>> {
        self.dataset(GVECS_PATH)?
            .read::<f64, Ix2>()
            .with_context(|| format!("Failed to read '{}' from {:?}", GVECS_PATH, self.path))
    }

    /// Full coefficient tensor, shape `[nb, ns, ngktot, 2]`
    pub fn read_coeffs(&self) -> Result<Array4<f64>> {
        self.dataset(COEFFS_PATH)?
            .read::<f64, Ix4>()
            .with_context(|| format!("Failed to read '{}' from {:?}", COEFFS_PATH, self.path))
    }

    /// Both large arrays
    pub fn read_arrays(&self) -> Result<WfnArrays> {
        let gvecs = self.read_gvecs()?;
        let coeffs = self.read_coeffs()?;
        debug!(
            "Loaded {:?}: gvecs {:?}, coeffs {:?}",
            self.path,
            gvecs.shape(),
            coeffs.shape()
        );
        WfnArrays::new(gvecs, coeffs).with_context(|| format!("Inconsistent arrays in {:?}", self.path))
    }

    /// G-vectors of one k-point as stored (integers), shape `[ngk[ik], 3]`
    pub fn read_gvecs_rows(&self, layout: &KPointLayout, ik: usize) -> Result<Array2<i32>> {
        let range = layout.range(ik)?;
        self.dataset(GVECS_PATH)?
            .read_slice::<i32, _, Ix2>(s![range, ..])
            .with_context(|| format!("Failed to read G-vectors of k-point {} from {:?}", ik, self.path))
    }

    /// Coefficients of one k-point for all bands and spin components,
    /// shape `[nb, ns, ngk[ik], 2]`
    pub fn read_coeffs_rows(&self, layout: &KPointLayout, ik: usize) -> Result<Array4<f64>> {
        let range = layout.range(ik)?;
        self.dataset(COEFFS_PATH)?
            .read_slice::<f64, _, Ix4>(s![.., .., range, ..])
            .with_context(|| format!("Failed to read coefficients of k-point {} from {:?}", ik, self.path))
    }

    /// Write `mf_header/kpoints` and allocate `wfns/gvecs` and `wfns/coeffs`
    pub fn write_header(&self, header: &WfnHeader) -> Result<()> {
        let kpoints = self
            .file
            .create_group("mf_header")?
            .create_group("kpoints")
            .context("Failed to create group mf_header/kpoints")?;

        for (name, value) in [
            ("nrk", header.nrk),
            ("nspin", header.nspin),
            ("nspinor", header.nspinor),
            ("mnband", header.mnband),
        ] {
            let value = i32::try_from(value)
                .with_context(|| format!("'{}' = {} does not fit in i32", name, value))?;
            kpoints
                .new_dataset::<i32>()
                .shape(())
                .create(name)?
                .write_scalar(&value)
                .with_context(|| format!("Failed to write mf_header/kpoints/{}", name))?;
        }

        let ngk = header
            .ngk
            .iter()
            .map(|&n| i32::try_from(n).context("G-vector count does not fit in i32"))
            .collect::<Result<Vec<_>>>()?;
        kpoints
            .new_dataset_builder()
            .with_data(ArrayView1::from(ngk.as_slice()))
            .create("ngk")
            .context("Failed to write mf_header/kpoints/ngk")?;

        let wfns = self.file.create_group("wfns").context("Failed to create group wfns")?;
        let ngktot = header.ngktot();
        wfns.new_dataset::<i32>()
            .shape((ngktot, 3))
            .create("gvecs")
            .context("Failed to create wfns/gvecs")?;
        wfns.new_dataset::<f64>()
            .shape((header.mnband, header.ns(), ngktot, 2))
            .create("coeffs")
            .context("Failed to create wfns/coeffs")?;
        Ok(())
    }

    /// Write the G-vectors of k-point `ik` into `wfns/gvecs`
    pub fn write_gvecs_rows(&self, layout: &KPointLayout, ik: usize, gvecs: ArrayView2<'_, i32>) -> Result<()> {
        let range = layout.range(ik)?;
        if gvecs.shape() != [range.len(), 3] {
            anyhow::bail!(
                "G-vectors of k-point {} have shape {:?}, expected [{}, 3]",
                ik,
                gvecs.shape(),
                range.len()
            );
        }
        self.dataset(GVECS_PATH)?
            .write_slice(gvecs, s![range, ..])
            .with_context(|| format!("Failed to write G-vectors of k-point {} to {:?}", ik, self.path))
    }

    /// Write the coefficients of k-point `ik` into `wfns/coeffs`
    pub fn write_coeffs_rows(&self, layout: &KPointLayout, ik: usize, coeffs: ArrayView4<'_, f64>) -> Result<()> {
        let range = layout.range(ik)?;
        if coeffs.shape()[2] != range.len() {
            anyhow::bail!(
                "coefficients of k-point {} have {} rows, expected {}",
                ik,
                coeffs.shape()[2],
                range.len()
            );
        }
        self.dataset(COEFFS_PATH)?
            .write_slice(coeffs, s![.., .., range, ..])
            .with_context(|| format!("Failed to write coefficients of k-point {} to {:?}", ik, self.path))
    }
}
