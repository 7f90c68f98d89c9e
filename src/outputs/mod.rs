//! Output generation for the aggregated camera list.
//!
//! # Submodules
//!
//! - [`json`]: Writes the camera list to `<data-dir>/cctvs.json` for the map viewer
//!
//! # Output Structure
//!
//! ```text
//! data_dir/
//! └── cctvs.json   # full snapshot, replaced on every run
//! ```

pub mod json;
