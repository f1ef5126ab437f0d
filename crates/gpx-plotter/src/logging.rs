/*!
Logging setup for the plotter binary.

`RUST_LOG` wins when set; otherwise the default level is `info`, or `debug`
with `--verbose`. Output goes to stderr so that a table written to stdout stays
machine-readable. With the `profiling` feature, span close events are logged
too, which carries the timings of the library functions annotated with
`profiling::function` / `profiling::all_functions`.
*/

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. Calling it twice is harmless.
pub fn setup_logging(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    #[cfg(feature = "profiling")]
    let builder = builder.with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE);

    let _ = builder.try_init();
}

/// Log the package name and version
pub fn log_version_info() {
    tracing::info!("{}", short_version_info());
}

pub fn short_version_info() -> String {
    format!(
        "{} {}{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        if cfg!(debug_assertions) { " (debug)" } else { "" }
    )
}
