use std::path::PathBuf;

use clap::Parser;

use crate::data::model::DEFAULT_START_YEAR;

/// Explore the CORD-19 paper metadata by publication year.
#[derive(Debug, Clone, Parser)]
#[command(name = "cord-explorer", version, about)]
pub struct Config {
    /// Metadata table to load (.csv, .json or .parquet)
    #[arg(long, default_value = "metadata.csv")]
    pub source: PathBuf,

    /// First year of the initially selected range
    #[arg(long, default_value_t = DEFAULT_START_YEAR)]
    pub start_year: i32,
}
