//! Log output for the command line
//!
//! Logs go to stderr so they never mix with program output.

use std::io;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding a filter directive, e.g. `lox=debug`.
pub const LOG_ENV: &str = "LOX_LOG";

/// Install the global subscriber.
///
/// `LOX_LOG` wins when set. Otherwise the level starts at `warn` and each
/// `-v` raises it; `--trace` turns on trace events from the interpreters.
pub fn init(verbose: u8, trace: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, trace)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

fn default_directive(verbose: u8, trace: bool) -> String {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    if trace {
        format!("{},lox=trace,lox_bytecode=trace", level)
    } else {
        level.to_string()
    }
}
