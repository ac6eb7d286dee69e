//! WFN header metadata and its plain-text `header.dat` form

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

use super::KPointLayout;

/// Header metadata from `mf_header/kpoints`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WfnHeader {
    /// Number of k-points
    pub nrk: usize,
    /// Number of spin components
    pub nspin: usize,
    /// Number of spinor components
    pub nspinor: usize,
    /// Number of bands
    pub mnband: usize,
    /// Number of G-vectors per k-point
    pub ngk: Vec<usize>,
}

impl WfnHeader {
    /// Spin/spinor components stored along axis 1 of `coeffs`
    pub fn ns(&self) -> usize {
        self.nspin * self.nspinor
    }

    /// Total G-vector rows across all k-points
    pub fn ngktot(&self) -> usize {
        self.ngk.iter().sum()
    }

    /// Row layout of the flattened G-vector axis
    pub fn layout(&self) -> KPointLayout {
        KPointLayout::new(&self.ngk)
    }

    /// Parse the `header.dat` format
    ///
    /// ```text
    /// nrk: 2
    /// nspin: 1
    /// nspinor: 1
    /// nb: 8
    /// ngk:
    /// 113
    /// 120
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let mut field = |key: &str| -> Result<usize> {
            let (lineno, line) = lines
                .next()
                .ok_or_else(|| anyhow::anyhow!("header.dat ended before '{}'", key))?;
            let value = line
                .strip_prefix(key)
                .and_then(|rest| rest.strip_prefix(':'))
                .ok_or_else(|| anyhow::anyhow!("line {}: expected '{}:', found '{}'", lineno, key, line))?;
            value
                .trim()
                .parse::<usize>()
                .with_context(|| format!("line {}: invalid value for '{}'", lineno, key))
        };

        let nrk = field("nrk")?;
        let nspin = field("nspin")?;
        let nspinor = field("nspinor")?;
        let mnband = field("nb")?;

        match lines.next() {
            Some((_, "ngk:")) => {}
            Some((lineno, line)) => anyhow::bail!("line {}: expected 'ngk:', found '{}'", lineno, line),
            None => anyhow::bail!("header.dat ended before 'ngk:'"),
        }

        let ngk = lines
            .by_ref()
            .take(nrk)
            .map(|(lineno, line)| {
                line.parse::<usize>()
                    .with_context(|| format!("line {}: invalid G-vector count '{}'", lineno, line))
            })
            .collect::<Result<Vec<_>>>()?;

        if ngk.len() != nrk {
            anyhow::bail!("header.dat lists {} G-vector counts, expected nrk = {}", ngk.len(), nrk);
        }

        Ok(Self { nrk, nspin, nspinor, mnband, ngk })
    }

    /// Load and parse a `header.dat` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read header file: {:?}", path))?;
        Self::parse(&text).with_context(|| format!("Failed to parse header file: {:?}", path))
    }

    /// Render in the `header.dat` format
    pub fn to_header_dat(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = writeln!(out, "nrk: {}", self.nrk);
        let _ = writeln!(out, "nspin: {}", self.nspin);
        let _ = writeln!(out, "nspinor: {}", self.nspinor);
        let _ = writeln!(out, "nb: {}", self.mnband);
        let _ = writeln!(out, "ngk:");
        for n in &self.ngk {
            let _ = writeln!(out, "{}", n);
        }
        out
    }
}
