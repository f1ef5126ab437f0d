//! Utility functions for great-circle distances and time deltas

use chrono::{DateTime, Utc};
use geo::Point;

/// Earth's mean radius in meters, as used by the haversine formula
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate the haversine (great-circle) distance between two WGS84 positions in meters
///
/// # Arguments
/// * `lat1`, `lon1` - First position in degrees
/// * `lat2`, `lon2` - Second position in degrees
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Haversine distance between two `geo` points (x = longitude, y = latitude)
#[inline]
pub fn haversine_between(p1: Point<f64>, p2: Point<f64>) -> f64 {
    haversine_distance(p1.y(), p1.x(), p2.y(), p2.x())
}

/// Seconds elapsed from `from` to `to`, with sub-second precision.
///
/// Negative when `to` is earlier than `from`.
#[inline]
pub fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to.signed_duration_since(from);
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        // Only overflows for spans of ~290k years
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}

/// Unix timestamp in (fractional) seconds, used where timestamps feed a numeric scale
#[inline]
pub fn unix_seconds(timestamp: DateTime<Utc>) -> f64 {
    timestamp.timestamp() as f64 + f64::from(timestamp.timestamp_subsec_nanos()) / 1e9
}
