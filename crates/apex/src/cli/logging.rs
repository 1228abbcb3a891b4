//! Log subscriber for the binary

use tracing_subscriber::EnvFilter;

/// Install the `fmt` subscriber; `RUST_LOG` overrides the default level
///
/// Records from the `log` facade used by the library crates are forwarded
/// to the subscriber.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
