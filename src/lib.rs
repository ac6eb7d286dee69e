//! # wfn-compare
//!
//! Consistency checks for plane-wave wavefunction (WFN) files.
//!
//! A WFN file stores, for every k-point, a block of G-vectors and the complex
//! coefficients of every band on those G-vectors. All blocks are concatenated
//! along one axis; `ngk` gives the block sizes. This crate compares two such
//! files against each other and against per-slice text dumps.
//!
//! ## Features
//!
//! - Whole-array G-vector and coefficient errors between two WFN files
//! - Per-k-point, per-band comparison against reference text slices
//! - Dumping a WFN file to text slices and assembling one back
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wfn_compare::{pipeline, CompareConfig};
//!
//! let config = CompareConfig::default(); // WFNq.h5 vs WFN_new.h5
//! let report = pipeline::compare(&config, &mut std::io::stdout())?;
//! println!("worst error: {:e}", report.worst());
//! ```

#![warn(missing_docs)]

pub mod compare;
pub mod config;
#[cfg(feature = "hdf5")]
pub mod pipeline;
pub mod reference;
pub mod wfn;

pub use compare::{CompareOptions, CompareReport, Comparison, SliceCounts};
pub use config::CompareConfig;
pub use reference::ReferenceLayout;
pub use wfn::{KPointLayout, WfnArrays, WfnHeader};
#[cfg(feature = "hdf5")]
pub use wfn::WfnFile;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
