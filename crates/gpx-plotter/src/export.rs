//! Point table export (CSV or JSON records)

use chrono::SecondsFormat;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use track_table_lib::{ResultTable, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Header line plus one line per point; absent values are empty cells
    Csv,
    /// Array of objects keyed by column name; absent values are `null`
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Open `path` for writing, or stdout for `-`
pub fn open_output(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        Ok(Box::new(io::stdout().lock()))
    } else {
        Ok(Box::new(BufWriter::new(File::create(path)?)))
    }
}

/// Write every row of `table` to `writer` in `format`
pub fn write_table<W: Write>(
    table: &ResultTable,
    format: OutputFormat,
    writer: W,
) -> Result<(), ExportError> {
    match format {
        OutputFormat::Csv => write_csv(table, writer),
        OutputFormat::Json => write_json(table, writer),
    }
}

fn write_csv<W: Write>(table: &ResultTable, writer: W) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(table.column_names())?;
    for row in table.rows() {
        writer.write_record(csv_fields(row))?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_fields(row: &Row) -> [String; 5] {
    let optional = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
    [
        row.timestamp
            .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            .unwrap_or_default(),
        row.latitude.to_string(),
        row.longitude.to_string(),
        optional(row.elevation),
        optional(row.speed),
    ]
}

fn write_json<W: Write>(table: &ResultTable, mut writer: W) -> Result<(), ExportError> {
    let rows: Vec<&Row> = table.rows().collect();
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
