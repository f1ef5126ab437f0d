use crate::export::OutputFormat;
use crate::intake::DEFAULT_MAX_FILE_SIZE;
use clap::Parser;
use std::path::PathBuf;
use track_table_lib::{Column, SpeedMode};

/// Environment variable overriding the default maximum input size (bytes)
pub const MAX_FILE_SIZE_ENV: &str = "GPX_PLOTTER_MAX_FILE_SIZE";

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// GPX 3D Plotter - Turn a GPS track into a point table and a 3D scatter colored by any field
pub struct Settings {
    /// GPX file to load (`-` for stdin)
    #[clap(value_name = "FILE")]
    pub input: PathBuf,

    /// Where to write the point table (`-` for stdout)
    #[clap(short, long, value_name = "FILE", default_value = "-")]
    pub output: PathBuf,

    /// Point table format
    #[clap(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Also write a 3D scatter figure (plotly JSON) to this path
    #[clap(long, value_name = "FILE")]
    pub figure: Option<PathBuf>,

    /// Column driving the figure's color scale
    #[clap(short, long, value_name = "COLUMN", default_value = "Speed")]
    pub color_by: Column,

    /// Lower bound of the color scale (optional)
    #[clap(long, allow_negative_numbers = true)]
    pub cmin: Option<f64>,

    /// Upper bound of the color scale (optional)
    #[clap(long, allow_negative_numbers = true)]
    pub cmax: Option<f64>,

    /// Speed derivation: `trailing` (from the previous point) or `centered`
    #[clap(long, default_value = "trailing")]
    pub speed_mode: SpeedMode,

    /// Reject input files larger than this many bytes [default: 10 MiB]
    #[clap(long, value_name = "BYTES")]
    pub max_file_size: Option<u64>,

    /// Print the table's column names and exit
    #[clap(long, default_value = "false")]
    pub list_columns: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[clap(short, long, default_value = "false")]
    pub verbose: bool,
}

impl Settings {
    /// Parse settings from the command line, exiting with usage on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// Effective input size limit: flag, then environment, then the 10 MiB default
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
            .or_else(|| get_env(MAX_FILE_SIZE_ENV))
            .unwrap_or(DEFAULT_MAX_FILE_SIZE)
    }
}

/// Generic function to get environment variable, parsing it to the desired type.
pub fn get_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}
