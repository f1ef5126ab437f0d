//! GPX decoding and track point extraction
//!
//! This module turns raw bytes into an owned [`ParsedFile`]: tracks, then segments,
//! then points, all in file order. Only track content is kept; waypoints and routes
//! are ignored.

use crate::{Result, TrackError};
use chrono::{DateTime, Utc};
use geo::Point;

/// A single recorded position
#[derive(Clone, Debug, PartialEq)]
pub struct TrackPoint {
    /// Recording time, if the file provides one
    pub timestamp: Option<DateTime<Utc>>,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Elevation as written in the file (unit-agnostic)
    pub elevation: Option<f64>,
}

impl TrackPoint {
    /// Position as a `geo` point (x = longitude, y = latitude)
    #[inline]
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// A continuous recording session
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Segment {
    pub points: Vec<TrackPoint>,
}

/// An ordered list of segments, as found in one `<trk>` element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Track {
    pub name: Option<String>,
    pub segments: Vec<Segment>,
}

/// Every track of a GPX file, in file order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedFile {
    pub tracks: Vec<Track>,
}

impl ParsedFile {
    /// All segments of all tracks, in file order
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.tracks.iter().flat_map(|track| track.segments.iter())
    }

    /// Total number of points across all tracks and segments
    pub fn total_points(&self) -> usize {
        self.segments().map(|segment| segment.points.len()).sum()
    }
}

/// Parse raw GPX bytes.
///
/// # Errors
/// * [`TrackError::Decode`] if the bytes are not valid UTF-8
/// * [`TrackError::Parse`] if the text is not a well-formed GPX document
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn parse_bytes(raw: &[u8]) -> Result<ParsedFile> {
    let text = std::str::from_utf8(raw)?;
    let gpx_data = gpx::read(text.as_bytes())?;

    let tracks = gpx_data
        .tracks
        .iter()
        .map(convert_track)
        .collect::<Result<Vec<_>>>()?;

    let parsed = ParsedFile { tracks };
    tracing::debug!(
        "Decoded {} bytes into {} tracks with {} points",
        raw.len(),
        parsed.tracks.len(),
        parsed.total_points()
    );
    Ok(parsed)
}

fn convert_track(track: &gpx::Track) -> Result<Track> {
    let segments = track
        .segments
        .iter()
        .map(|segment| {
            let points = segment
                .points
                .iter()
                .map(convert_waypoint)
                .collect::<Result<Vec<_>>>()?;
            Ok(Segment { points })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Track {
        name: track.name.clone(),
        segments,
    })
}

fn convert_waypoint(waypoint: &gpx::Waypoint) -> Result<TrackPoint> {
    let position = waypoint.point();
    let timestamp = waypoint.time.as_ref().map(convert_time).transpose()?;

    Ok(TrackPoint {
        timestamp,
        latitude: position.y(),
        longitude: position.x(),
        elevation: waypoint.elevation,
    })
}

fn convert_time(time: &gpx::Time) -> Result<DateTime<Utc>> {
    let iso = time.format()?;
    let parsed = DateTime::parse_from_rfc3339(&iso)
        .map_err(|e| TrackError::Parse(format!("invalid timestamp '{iso}': {e}")))?;
    Ok(parsed.with_timezone(&Utc))
}
