//! Structured logging initialization for the bundle CLI.
//!
//! Supports both human-friendly and machine-readable (JSON) output formats,
//! with TTY detection and verbosity control.

use std::io::{self, IsTerminal};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "rcb=error"
    } else {
        match verbose {
            0 => "rcb=warn",
            1 => "rcb=debug",
            _ => "rcb=trace,reqwest=debug",
        }
    }
}

/// Initialize the tracing subscriber based on CLI flags and environment.
///
/// # Arguments
///
/// * `robot_mode` - If true, output structured JSON logs for machine consumption
/// * `verbose` - Verbosity level: 0 = warn, 1 = debug, 2+ = trace
/// * `quiet` - If true, only errors are logged
///
/// `RUST_LOG` overrides the computed filter (e.g. "rcb=debug,reqwest=info").
///
/// | Mode | TTY | Output |
/// |------|-----|--------|
/// | Robot | any | JSON lines to stderr |
/// | Human | yes | Pretty colored output to stderr |
/// | Human | no | Compact plain output to stderr |
pub fn init_logging(robot_mode: bool, verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    if robot_mode {
        let fmt_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(io::stderr);

        report_init(
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init(),
        );
    } else if io::stderr().is_terminal() {
        let fmt_layer = fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(io::stderr);

        report_init(
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init(),
        );
    } else {
        let fmt_layer = fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false)
            .with_span_events(FmtSpan::NONE)
            .compact()
            .with_writer(io::stderr);

        report_init(
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init(),
        );
    }
}

/// A subscriber is already installed when tests or embedding code initialize
/// logging first. The existing one stays in place.
fn report_init(result: Result<(), TryInitError>) {
    if let Err(e) = result {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
}
