//! GPX 3D Plotter - Application Library
//!
//! Reads one GPX file (size-limited), turns it into a point table with
//! `track-table-lib`, and writes the table plus an optional plotly-compatible
//! 3D scatter figure colored by a chosen column.

pub mod export;
pub mod figure;
pub mod intake;
mod logging;
mod run;
pub mod settings;

pub use run::{run, run_with};
