//! Run configuration
//!
//! Every field has a default reproducing the standard regression check
//! (`WFNq.h5` against `WFN_new.h5`, reference slices in the working
//! directory). A YAML file may override any subset:
//!
//! ```yaml
//! orig: WFNq.h5
//! new: WFN_new.h5
//! per_slice: true
//! reference:
//!   dir: dumps
//!   gvecs_prefix: gvecs_ik_
//!   coeffs_prefix: coeffs_ik_
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::compare::CompareOptions;
use crate::reference::ReferenceLayout;

/// Default first ("orig") WFN file
pub const DEFAULT_ORIG: &str = "WFNq.h5";
/// Default second ("output") WFN file
pub const DEFAULT_NEW: &str = "WFN_new.h5";
/// Default header file of the dump/assemble tools
pub const DEFAULT_HEADER: &str = "header.dat";

/// Comparison run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// First WFN file; `ngk`, `nrk` and `mnband` are read from it
    pub orig: PathBuf,
    /// Second WFN file
    pub new: PathBuf,
    /// Compare every k-point/band slice against the reference text files
    pub per_slice: bool,
    /// Reference text file naming
    pub reference: ReferenceLayout,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            orig: PathBuf::from(DEFAULT_ORIG),
            new: PathBuf::from(DEFAULT_NEW),
            per_slice: true,
            reference: ReferenceLayout::default(),
        }
    }
}

impl CompareConfig {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_yaml::from_str(&text).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Options passed to the comparison entry point
    pub fn options(&self) -> CompareOptions {
        CompareOptions {
            per_slice: self.per_slice,
            reference: self.reference.clone(),
        }
    }
}
