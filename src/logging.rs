//! Diagnostic logging setup
//!
//! Library code emits `tracing` events; the binary installs one subscriber
//! writing to stderr so verdicts on stdout stay clean. `RUST_LOG` overrides
//! the level derived from the verbosity flags.

use tracing_subscriber::EnvFilter;

use crate::cli::Verbosity;

/// Filter for the given verbosity, honouring `RUST_LOG` when set
pub fn filter_for(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()))
}

/// Install the global subscriber; later calls are no-ops
pub fn init(verbosity: Verbosity, color: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(verbosity))
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .try_init();
}
