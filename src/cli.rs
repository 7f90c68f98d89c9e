//! Command-line interface definitions for the CCTV collector.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option has a default, so a bare invocation scrapes all sources and
//! writes `src/data/cctvs.json`.

use crate::models::Source;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the CCTV collector.
///
/// # Examples
///
/// ```sh
/// # Scrape everything into ./src/data/cctvs.json
/// bandung_cctv
///
/// # Only the two Kota Bandung sources, into a custom directory
/// bandung_cctv --only kota --only pelindung -d /var/lib/cctv
///
/// # Override endpoints or the Cimahi landmark table
/// bandung_cctv --config cctv.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory that receives cctvs.json
    #[arg(short, long, env = "CCTV_DATA_DIR", default_value = "src/data")]
    pub data_dir: PathBuf,

    /// Optional path to a YAML file overriding endpoints, timeouts and landmarks
    #[arg(short, long, env = "CCTV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Scrape only these sources (repeatable). Defaults to all of them
    #[arg(long, value_enum)]
    pub only: Vec<Source>,

    /// Run the scrapers concurrently. Output order is unaffected
    #[arg(long)]
    pub concurrent: bool,
}

impl Cli {
    /// Sources selected with `--only`, or every source when none were given.
    pub fn sources(&self) -> Vec<Source> {
        if self.only.is_empty() {
            Source::ALL.to_vec()
        } else {
            self.only.clone()
        }
    }
}
