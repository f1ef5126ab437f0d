//! Per-point speed derivation within a segment

use crate::{Segment, TrackPoint, utils};
use std::fmt;
use std::str::FromStr;

/// How a point's speed is derived from its neighbours
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpeedMode {
    /// Speed from the previous point to this one; the first point of a segment has none.
    #[default]
    Trailing,
    /// Mean of the speeds from the previous point and to the next point, whichever exist.
    Centered,
}

impl fmt::Display for SpeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedMode::Trailing => f.write_str("trailing"),
            SpeedMode::Centered => f.write_str("centered"),
        }
    }
}

impl FromStr for SpeedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trailing" => Ok(SpeedMode::Trailing),
            "centered" | "centred" => Ok(SpeedMode::Centered),
            other => Err(format!(
                "unknown speed mode '{other}', expected 'trailing' or 'centered'"
            )),
        }
    }
}

/// Derive one speed value (meters per second) per point of `segment`.
///
/// The output is index-aligned with `segment.points`. A speed is `None` when there is
/// no usable neighbour: a missing timestamp on either side, or an elapsed time that is
/// zero or negative. Derivation never crosses into another segment.
pub fn derive_speeds(segment: &Segment, mode: SpeedMode) -> Vec<Option<f64>> {
    let points = &segment.points;
    let pairs: Vec<Step> = points
        .windows(2)
        .map(|pair| Step::between(&pair[0], &pair[1]))
        .collect();

    let untimed = pairs.iter().filter(|s| **s == Step::MissingTime).count();
    if untimed > 0 {
        tracing::debug!(
            "{} of {} point pairs lack a timestamp",
            untimed,
            pairs.len()
        );
    }
    let non_increasing = pairs.iter().filter(|s| **s == Step::NonIncreasing).count();
    if non_increasing > 0 {
        tracing::warn!(
            "{} of {} point pairs have non-increasing timestamps, their speed is left empty",
            non_increasing,
            pairs.len()
        );
    }

    // steps[i] is the speed from points[i] to points[i + 1]
    let steps: Vec<Option<f64>> = pairs.iter().map(Step::speed).collect();

    (0..points.len())
        .map(|i| {
            let trailing = if i > 0 { steps[i - 1] } else { None };
            match mode {
                SpeedMode::Trailing => trailing,
                SpeedMode::Centered => {
                    let leading = steps.get(i).copied().flatten();
                    match (trailing, leading) {
                        (Some(a), Some(b)) => Some((a + b) / 2.0),
                        (a, b) => a.or(b),
                    }
                }
            }
        })
        .collect()
}

/// Outcome of deriving speed between two consecutive points
#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Speed(f64),
    /// One of the two points has no timestamp
    MissingTime,
    /// Elapsed time is zero or negative
    NonIncreasing,
}

impl Step {
    fn between(from: &TrackPoint, to: &TrackPoint) -> Self {
        let (Some(t0), Some(t1)) = (from.timestamp, to.timestamp) else {
            return Step::MissingTime;
        };
        let elapsed = utils::elapsed_seconds(t0, t1);
        if elapsed <= 0.0 {
            return Step::NonIncreasing;
        }
        Step::Speed(utils::haversine_between(from.point(), to.point()) / elapsed)
    }

    fn speed(&self) -> Option<f64> {
        match self {
            Step::Speed(speed) => Some(*speed),
            Step::MissingTime | Step::NonIncreasing => None,
        }
    }
}
