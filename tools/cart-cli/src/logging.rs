//! Diagnostic logging for the CLI.

use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// Logs go to stderr so they never mix with command output. `RUST_LOG`
/// wins when set; otherwise `--verbose` raises the cart crates to `debug`.
pub fn init_logging(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "warn,turbo_cart=debug,turbo_cache=debug"
    } else {
        "warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}
