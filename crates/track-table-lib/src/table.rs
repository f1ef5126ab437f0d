//! Flattened point table
//!
//! [`ResultTable`] is the only structure handed to consumers. It is built once from a
//! [`ParsedFile`] plus the per-segment speeds and never changes afterwards.

use crate::{ParsedFile, Result, TrackError, utils};
use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of table columns, in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Column {
    Timestamp,
    Latitude,
    Longitude,
    Elevation,
    Speed,
}

impl Column {
    /// All columns in table order
    pub const ALL: [Column; 5] = [
        Column::Timestamp,
        Column::Latitude,
        Column::Longitude,
        Column::Elevation,
        Column::Speed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Timestamp => "Timestamp",
            Column::Latitude => "Latitude",
            Column::Longitude => "Longitude",
            Column::Elevation => "Elevation",
            Column::Speed => "Speed",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown column '{0}', expected one of Timestamp, Latitude, Longitude, Elevation, Speed")]
pub struct ParseColumnError(pub String);

impl FromStr for Column {
    type Err = ParseColumnError;

    /// Case-insensitive lookup by column name
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|column| column.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseColumnError(s.to_string()))
    }
}

/// One track point with its derived speed
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct Row {
    pub timestamp: Option<DateTime<Utc>>,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub speed: Option<f64>,
}

/// All values of a single column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Timestamp(Vec<Option<DateTime<Utc>>>),
    Number(Vec<Option<f64>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Timestamp(values) => values.len(),
            ColumnValues::Number(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric view of the column; timestamps become Unix seconds
    pub fn to_numbers(&self) -> Vec<Option<f64>> {
        match self {
            ColumnValues::Timestamp(values) => values
                .iter()
                .map(|value| value.map(utils::unix_seconds))
                .collect(),
            ColumnValues::Number(values) => values.clone(),
        }
    }
}

/// Counts and distance gathered while flattening
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableInfo {
    /// Number of `<trk>` elements
    pub track_count: usize,
    /// Number of `<trkseg>` elements across all tracks
    pub segment_count: usize,
    /// Number of rows
    pub point_count: usize,
    /// Haversine path length in meters, summed within segments only
    pub total_distance_meters: f64,
}

/// Flattened, ordered table of every track point in a file
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    rows: Vec<Row>,
    info: TableInfo,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl ResultTable {
    /// Flatten `parsed` into rows, attaching `speeds` (one vector per segment, file order).
    ///
    /// # Errors
    /// [`TrackError::Projection`] if `speeds` does not line up with the segments of `parsed`.
    pub fn project(parsed: &ParsedFile, speeds: &[Vec<Option<f64>>]) -> Result<Self> {
        let segment_count = parsed.segments().count();
        if speeds.len() != segment_count {
            return Err(TrackError::Projection {
                reason: format!(
                    "{} speed sequences for {} segments",
                    speeds.len(),
                    segment_count
                ),
            });
        }

        let mut rows = Vec::with_capacity(parsed.total_points());
        let mut total_distance = 0.0;

        for (index, (segment, segment_speeds)) in parsed.segments().zip(speeds).enumerate() {
            if segment.points.len() != segment_speeds.len() {
                return Err(TrackError::Projection {
                    reason: format!(
                        "segment {} has {} points but {} speed values",
                        index,
                        segment.points.len(),
                        segment_speeds.len()
                    ),
                });
            }

            total_distance += segment
                .points
                .windows(2)
                .map(|pair| utils::haversine_between(pair[0].point(), pair[1].point()))
                .sum::<f64>();

            rows.extend(
                segment
                    .points
                    .iter()
                    .zip(segment_speeds)
                    .map(|(point, speed)| Row {
                        timestamp: point.timestamp,
                        latitude: point.latitude,
                        longitude: point.longitude,
                        elevation: point.elevation,
                        speed: *speed,
                    }),
            );
        }

        let info = TableInfo {
            track_count: parsed.tracks.len(),
            segment_count,
            point_count: rows.len(),
            total_distance_meters: total_distance,
        };

        Ok(Self { rows, info })
    }

    /// Column names, in table order
    pub fn column_names(&self) -> [&'static str; 5] {
        Column::ALL.map(Column::name)
    }

    /// All values of `column`, in row order
    pub fn column(&self, column: Column) -> ColumnValues {
        let numbers = |get: fn(&Row) -> Option<f64>| {
            ColumnValues::Number(self.rows.iter().map(get).collect())
        };
        match column {
            Column::Timestamp => {
                ColumnValues::Timestamp(self.rows.iter().map(|row| row.timestamp).collect())
            }
            Column::Latitude => numbers(|row| Some(row.latitude)),
            Column::Longitude => numbers(|row| Some(row.longitude)),
            Column::Elevation => numbers(|row| row.elevation),
            Column::Speed => numbers(|row| row.speed),
        }
    }

    /// All values of the column called `name` (case-insensitive)
    pub fn column_by_name(&self, name: &str) -> Option<ColumnValues> {
        name.parse::<Column>().ok().map(|column| self.column(column))
    }

    /// Minimum and maximum of the present values of `column`, if any
    pub fn column_range(&self, column: Column) -> Option<(f64, f64)> {
        self.column(column)
            .to_numbers()
            .into_iter()
            .flatten()
            .filter(|value| value.is_finite())
            .fold(None, |range, value| match range {
                None => Some((value, value)),
                Some((min, max)) => Some((min.min(value), max.max(value))),
            })
    }

    /// Iterate rows in file order
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &Row> {
        self.rows.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn info(&self) -> &TableInfo {
        &self.info
    }
}
