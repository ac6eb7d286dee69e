//! Per-k-point row ranges in the flattened G-vector axis
//!
//! A WFN file stores the G-vectors and coefficients of every k-point back to
//! back along one axis. `ngk[ik]` rows belong to k-point `ik`, starting right
//! after the rows of k-point `ik - 1`.

use anyhow::Result;
use std::ops::Range;

/// Prefix-sum offsets of each k-point's block of G-vector rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KPointLayout {
    /// `offsets[ik]..offsets[ik + 1]` are the rows of k-point `ik`
    offsets: Vec<usize>,
}

impl KPointLayout {
    /// Build the layout from the number of G-vectors per k-point
    pub fn new(ngk: &[usize]) -> Self {
        let mut offsets = Vec::with_capacity(ngk.len() + 1);
        let mut start = 0usize;
        offsets.push(start);
        for &n in ngk {
            start += n;
            offsets.push(start);
        }
        Self { offsets }
    }

    /// Number of k-points
    pub fn num_kpoints(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total number of G-vector rows across all k-points
    pub fn total(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }

    /// Number of G-vectors of k-point `ik`
    pub fn count(&self, ik: usize) -> Result<usize> {
        Ok(self.range(ik)?.len())
    }

    /// Row range `[ig_start, ig_end)` of k-point `ik`
    pub fn range(&self, ik: usize) -> Result<Range<usize>> {
        if ik >= self.num_kpoints() {
            anyhow::bail!(
                "k-point {} out of range: ngk has {} entries",
                ik,
                self.num_kpoints()
            );
        }
        Ok(self.offsets[ik]..self.offsets[ik + 1])
    }

    /// Iterate over `(ik, range)` for every k-point in order
    pub fn ranges(&self) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
        self.offsets
            .windows(2)
            .enumerate()
            .map(|(ik, w)| (ik, w[0]..w[1]))
    }
}
