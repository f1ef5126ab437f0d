//! 3D scatter figure binding
//!
//! Builds a plotly-compatible figure document from a [`ResultTable`]: x/y/z are
//! Longitude/Latitude/Elevation and the marker color follows one chosen column.
//! Drawing is left to whatever plotly front end loads the JSON.

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use track_table_lib::{Column, ResultTable};

const MARKER_SIZE: u32 = 6;
const COLORSCALE: &str = "Jet";

#[derive(Debug, thiserror::Error)]
pub enum FigureError {
    #[error("Color scale minimum {min} is greater than maximum {max}")]
    InvalidBounds { min: f64, max: f64 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which column colors the markers, and optional fixed bounds for the scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    column: Column,
    min: Option<f64>,
    max: Option<f64>,
}

impl ColorScale {
    pub fn new(column: Column, min: Option<f64>, max: Option<f64>) -> Result<Self, FigureError> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(FigureError::InvalidBounds { min, max });
            }
        }
        Ok(Self { column, min, max })
    }

    pub fn column(&self) -> Column {
        self.column
    }

    /// Bounds to hand to the renderer.
    ///
    /// Plotly ignores `cmin` without `cmax` (and vice versa), so a single given bound
    /// is completed from the data range. No bounds means autoscale.
    pub fn resolve(&self, table: &ResultTable) -> (Option<f64>, Option<f64>) {
        match (self.min, self.max) {
            (None, None) => (None, None),
            (Some(min), Some(max)) => (Some(min), Some(max)),
            (Some(min), None) => {
                let max = table.column_range(self.column).map_or(min, |(_, hi)| hi.max(min));
                (Some(min), Some(max))
            }
            (None, Some(max)) => {
                let min = table.column_range(self.column).map_or(max, |(lo, _)| lo.min(max));
                (Some(min), Some(max))
            }
        }
    }
}

/// A plotly figure: `{"data": [...], "layout": {...}}`
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Scatter3d>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
pub struct Scatter3d {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<Option<f64>>,
    pub marker: Marker,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub size: u32,
    pub color: Vec<Option<f64>>,
    pub colorscale: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmax: Option<f64>,
    pub showscale: bool,
    pub colorbar: ColorBar,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorBar {
    pub title: Title,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub scene: Scene,
    pub margin: Margin,
}

#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub zaxis: Axis,
}

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub title: Title,
}

#[derive(Debug, Clone, Serialize)]
pub struct Margin {
    pub t: u32,
    pub b: u32,
}

fn title(text: impl Into<String>) -> Title {
    Title { text: text.into() }
}

impl Figure {
    /// Bind the table's columns to a single 3D scatter trace
    pub fn scatter3d(table: &ResultTable, scale: &ColorScale) -> Self {
        let (cmin, cmax) = scale.resolve(table);
        let color = table.column(scale.column()).to_numbers();
        if !color.is_empty() && color.iter().all(Option::is_none) {
            tracing::warn!("Column {} has no values, markers will be uncolored", scale.column());
        }

        let trace = Scatter3d {
            kind: "scatter3d",
            mode: "markers",
            x: table.rows().map(|row| row.longitude).collect(),
            y: table.rows().map(|row| row.latitude).collect(),
            z: table.rows().map(|row| row.elevation).collect(),
            marker: Marker {
                size: MARKER_SIZE,
                color,
                colorscale: COLORSCALE,
                cmin,
                cmax,
                showscale: true,
                colorbar: ColorBar {
                    title: title(scale.column().name()),
                },
            },
        };

        Figure {
            data: vec![trace],
            layout: Layout {
                scene: Scene {
                    xaxis: Axis {
                        title: title(Column::Longitude.name()),
                    },
                    yaxis: Axis {
                        title: title(Column::Latitude.name()),
                    },
                    zaxis: Axis {
                        title: title(Column::Elevation.name()),
                    },
                },
                margin: Margin { t: 5, b: 5 },
            },
        }
    }

    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<(), FigureError> {
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_to_path(&self, path: &Path) -> Result<(), FigureError> {
        let file = std::fs::File::create(path)?;
        self.write_json(std::io::BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use track_table_lib::{parse_track_file, utils};

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <trk>
    <trkseg>
      <trkpt lat="0.0" lon="0.0"><ele>10</ele><time>2024-01-01T00:00:00Z</time></trkpt>
      <trkpt lat="0.001" lon="0.0"><ele>20</ele><time>2024-01-01T00:00:01Z</time></trkpt>
      <trkpt lat="0.003" lon="0.0"><time>2024-01-01T00:00:02Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    fn table() -> ResultTable {
        parse_track_file(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_invalid_bounds() {
        let result = ColorScale::new(Column::Speed, Some(5.0), Some(1.0));
        assert!(matches!(result, Err(FigureError::InvalidBounds { .. })));
        assert!(ColorScale::new(Column::Speed, Some(1.0), Some(1.0)).is_ok());
    }

    #[test]
    fn test_resolve_bounds() {
        let table = table();
        let (lo, hi) = table.column_range(Column::Elevation).unwrap();
        assert_eq!((lo, hi), (10.0, 20.0));

        let auto = ColorScale::new(Column::Elevation, None, None).unwrap();
        assert_eq!(auto.resolve(&table), (None, None));

        let only_min = ColorScale::new(Column::Elevation, Some(12.0), None).unwrap();
        assert_eq!(only_min.resolve(&table), (Some(12.0), Some(20.0)));

        let only_max = ColorScale::new(Column::Elevation, None, Some(15.0)).unwrap();
        assert_eq!(only_max.resolve(&table), (Some(10.0), Some(15.0)));

        // A bound beyond the data never produces an inverted range
        let high_min = ColorScale::new(Column::Elevation, Some(50.0), None).unwrap();
        assert_eq!(high_min.resolve(&table), (Some(50.0), Some(50.0)));
    }

    #[test]
    fn test_scatter_binding() {
        let table = table();
        let scale = ColorScale::new(Column::Speed, None, Some(500.0)).unwrap();
        let figure = Figure::scatter3d(&table, &scale);
        let trace = &figure.data[0];

        assert_eq!(trace.x, vec![0.0, 0.0, 0.0]);
        assert_eq!(trace.y, vec![0.0, 0.001, 0.003]);
        assert_eq!(trace.z, vec![Some(10.0), Some(20.0), None]);
        assert_eq!(trace.marker.color, table.column(Column::Speed).to_numbers());
        assert!(trace.marker.color[0].is_none());
        let step = utils::haversine_distance(0.0, 0.0, 0.001, 0.0);
        assert_relative_eq!(trace.marker.color[1].unwrap(), step, max_relative = 1e-6);
        assert_eq!(trace.marker.cmax, Some(500.0));
        // Lone upper bound is completed from the smallest speed
        assert_relative_eq!(trace.marker.cmin.unwrap(), step, max_relative = 1e-6);
    }

    #[test]
    fn test_figure_json_shape() {
        let scale = ColorScale::new(Column::Timestamp, None, None).unwrap();
        let figure = Figure::scatter3d(&table(), &scale);
        let mut out = Vec::new();
        figure.write_json(&mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

        let trace = &json["data"][0];
        assert_eq!(trace["type"], "scatter3d");
        assert_eq!(trace["mode"], "markers");
        assert_eq!(trace["marker"]["size"], 6);
        assert_eq!(trace["marker"]["colorscale"], "Jet");
        assert_eq!(trace["marker"]["colorbar"]["title"]["text"], "Timestamp");
        assert!(trace["marker"].get("cmin").is_none());
        assert_eq!(trace["marker"]["color"][0], 1_704_067_200.0);
        assert!(trace["z"][2].is_null());
        assert_eq!(json["layout"]["scene"]["zaxis"]["title"]["text"], "Elevation");
        assert_eq!(json["layout"]["margin"]["t"], 5);
    }
}
