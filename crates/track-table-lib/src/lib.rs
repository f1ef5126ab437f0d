//! Track Table Library - GPX Track Points as an Ordered Table
//!
//! This library turns the raw bytes of a GPX file into a flat, immutable table of
//! track points, one row per `<trkpt>`, with a derived per-point speed column.
//!
//! # Architecture
//!
//! - **[`parse_bytes`]**: Decodes and parses GPX bytes into a [`ParsedFile`]
//! - **[`derive_speeds`]**: Per-segment speed derivation (haversine distance / elapsed time)
//! - **[`ResultTable`]**: Flattened rows with typed column access
//!
//! The pipeline is a pure function of its input: no I/O, no global state.
//!
//! # Example
//!
//! ```rust
//! use track_table_lib::{Column, parse_track_file};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gpx = br#"<?xml version="1.0" encoding="UTF-8"?>
//! <gpx version="1.1" creator="doc">
//!   <trk><trkseg>
//!     <trkpt lat="0.0" lon="0.0"><time>2024-01-01T00:00:00Z</time></trkpt>
//!     <trkpt lat="0.001" lon="0.0"><time>2024-01-01T00:00:01Z</time></trkpt>
//!   </trkseg></trk>
//! </gpx>"#;
//!
//! let table = parse_track_file(gpx)?;
//! assert_eq!(table.len(), 2);
//! let speeds = table.column(Column::Speed).to_numbers();
//! assert!(speeds[0].is_none());
//! assert!(speeds[1].is_some());
//! # Ok(())
//! # }
//! ```

mod parser;
mod speed;
mod table;
pub mod utils;

// Public API exports
pub use parser::{ParsedFile, Segment, Track, TrackPoint, parse_bytes};
pub use speed::{SpeedMode, derive_speeds};
pub use table::{Column, ColumnValues, ParseColumnError, ResultTable, Row, TableInfo};

/// Error types for the track pipeline
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("Input is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),

    #[error("GPX parsing error: {0}")]
    Parse(String),

    #[error("Projection invariant violated: {reason}")]
    Projection { reason: String },
}

impl From<gpx::errors::GpxError> for TrackError {
    fn from(err: gpx::errors::GpxError) -> Self {
        TrackError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackError>;

/// Pipeline configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    /// How per-point speed is derived from neighbouring points
    pub speed_mode: SpeedMode,
}

/// Parse a GPX file into a [`ResultTable`] using the default [`Config`].
pub fn parse_track_file(raw: &[u8]) -> Result<ResultTable> {
    parse_track_file_with(raw, &Config::default())
}

/// Parse a GPX file into a [`ResultTable`]: decode, derive speeds per segment, flatten.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn parse_track_file_with(raw: &[u8], config: &Config) -> Result<ResultTable> {
    let parsed = parse_bytes(raw)?;

    let speeds: Vec<Vec<Option<f64>>> = parsed
        .segments()
        .map(|segment| derive_speeds(segment, config.speed_mode))
        .collect();

    let table = ResultTable::project(&parsed, &speeds)?;
    tracing::info!(
        "Parsed {} points in {} segments ({} tracks, {:.1} m)",
        table.info().point_count,
        table.info().segment_count,
        table.info().track_count,
        table.info().total_distance_meters
    );
    Ok(table)
}
