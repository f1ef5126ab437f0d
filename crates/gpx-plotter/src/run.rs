use crate::export::{open_output, write_table};
use crate::figure::{ColorScale, Figure};
use crate::intake::read_track_file;
use crate::logging::{log_version_info, setup_logging};
use crate::settings::Settings;
use anyhow::{Context, Result};
use std::io::Write;
use track_table_lib::{Config, ResultTable, parse_track_file_with};

/// Command line entry point
pub fn run() -> Result<()> {
    let settings = Settings::from_cli();
    setup_logging(settings.verbose);
    log_version_info();
    run_with(&settings)
}

/// Load, parse and export one track file as described by `settings`
pub fn run_with(settings: &Settings) -> Result<()> {
    // Validate the cheap stuff before touching the file
    let color_scale = ColorScale::new(settings.color_by, settings.cmin, settings.cmax)?;

    let raw = read_track_file(&settings.input, settings.max_file_size())?;
    let config = Config {
        speed_mode: settings.speed_mode,
    };
    let table = parse_track_file_with(&raw, &config)
        .with_context(|| format!("failed to load {}", settings.input.display()))?;
    if table.is_empty() {
        tracing::warn!("{} contains no track points", settings.input.display());
    }

    if settings.list_columns {
        write_column_names(&table, std::io::stdout().lock())?;
        return Ok(());
    }

    if let Some(path) = &settings.figure {
        Figure::scatter3d(&table, &color_scale)
            .write_to_path(path)
            .with_context(|| format!("failed to write figure to {}", path.display()))?;
        tracing::info!(
            "Wrote 3D scatter colored by {} to {}",
            color_scale.column(),
            path.display()
        );
    }

    let writer = open_output(&settings.output)
        .with_context(|| format!("failed to open {}", settings.output.display()))?;
    write_table(&table, settings.format, writer)
        .with_context(|| format!("failed to write table to {}", settings.output.display()))?;
    tracing::info!(
        "Wrote {} rows as {:?} to {}",
        table.len(),
        settings.format,
        settings.output.display()
    );

    Ok(())
}

/// One column name per line, in table order
fn write_column_names<W: Write>(table: &ResultTable, mut writer: W) -> std::io::Result<()> {
    for name in table.column_names() {
        writeln!(writer, "{name}")?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::FigureError;
    use crate::intake::IntakeError;
    use approx::assert_relative_eq;
    use clap::Parser;
    use std::path::PathBuf;
    use track_table_lib::{TrackError, parse_track_file, utils};

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <trk>
    <trkseg>
      <trkpt lat="46.0" lon="8.0"><ele>300</ele><time>2024-03-01T09:00:00Z</time></trkpt>
      <trkpt lat="46.001" lon="8.0"><ele>305</ele><time>2024-03-01T09:00:30Z</time></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="46.002" lon="8.0"><ele>310</ele><time>2024-03-01T09:05:00Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gpx-plotter-run-{}-{name}", std::process::id()))
    }

    fn settings(args: &[&str]) -> Settings {
        let mut argv = vec!["gpx-plotter"];
        argv.extend_from_slice(args);
        Settings::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_run_writes_table_and_figure() {
        let input = temp_path("ride.gpx");
        let output = temp_path("ride.csv");
        let figure = temp_path("ride-figure.json");
        std::fs::write(&input, SAMPLE).unwrap();

        let settings = settings(&[
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--figure",
            figure.to_str().unwrap(),
            "--color-by",
            "Elevation",
        ]);
        run_with(&settings).unwrap();

        let csv = std::fs::read_to_string(&output).unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.starts_with("Timestamp,Latitude,Longitude,Elevation,Speed"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&figure).unwrap()).unwrap();
        assert_relative_eq!(json["data"][0]["marker"]["color"][2].as_f64().unwrap(), 310.0);

        for path in [input, output, figure] {
            std::fs::remove_file(path).unwrap();
        }
    }

    #[test]
    fn test_json_speed_values() {
        let input = temp_path("speed.gpx");
        let output = temp_path("speed.json");
        std::fs::write(&input, SAMPLE).unwrap();

        let settings = settings(&[
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--format",
            "json",
        ]);
        run_with(&settings).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        let speed = json[1]["Speed"].as_f64().unwrap();
        let expected = utils::haversine_distance(46.0, 8.0, 46.001, 8.0) / 30.0;
        assert_relative_eq!(speed, expected, max_relative = 1e-6);
        assert!(json[2]["Speed"].is_null());

        for path in [input, output] {
            std::fs::remove_file(path).unwrap();
        }
    }

    #[test]
    fn test_list_columns_skips_export() {
        let input = temp_path("columns.gpx");
        let output = temp_path("columns.csv");
        let figure = temp_path("columns-figure.json");
        std::fs::write(&input, SAMPLE).unwrap();

        let settings = settings(&[
            input.to_str().unwrap(),
            "--list-columns",
            "--output",
            output.to_str().unwrap(),
            "--figure",
            figure.to_str().unwrap(),
        ]);
        run_with(&settings).unwrap();

        assert!(!output.exists());
        assert!(!figure.exists());
        std::fs::remove_file(input).unwrap();
    }

    #[test]
    fn test_column_names_listing() {
        let table = parse_track_file(SAMPLE.as_bytes()).unwrap();
        let mut out = Vec::new();
        write_column_names(&table, &mut out).unwrap();

        let listed: Vec<String> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        assert_eq!(listed, table.column_names());
        assert_eq!(listed[0], "Timestamp");
        assert_eq!(listed[4], "Speed");
    }

    #[test]
    fn test_invalid_bounds_fail_before_reading() {
        let settings = settings(&["does-not-exist.gpx", "--cmin", "10", "--cmax", "1"]);
        let err = run_with(&settings).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FigureError>(),
            Some(FigureError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_oversized_file_is_rejected() {
        let input = temp_path("big.gpx");
        std::fs::write(&input, SAMPLE).unwrap();

        let settings = settings(&[input.to_str().unwrap(), "--max-file-size", "64"]);
        let err = run_with(&settings).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IntakeError>(),
            Some(IntakeError::TooLarge { limit: 64, .. })
        ));

        std::fs::remove_file(input).unwrap();
    }

    #[test]
    fn test_malformed_file_reports_parse_error() {
        let input = temp_path("broken.gpx");
        std::fs::write(&input, &SAMPLE[..SAMPLE.len() / 2]).unwrap();

        let settings = settings(&[input.to_str().unwrap()]);
        let err = run_with(&settings).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrackError>(),
            Some(TrackError::Parse(_))
        ));

        std::fs::remove_file(input).unwrap();
    }
}
