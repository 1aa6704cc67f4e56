//! Diagnostic logging setup
//!
//! Logs go to stderr so page output on stdout stays clean. `RUST_LOG`
//! overrides the level derived from the `-v`/`-q` flags.

use tracing_subscriber::EnvFilter;

use crate::cli::Verbosity;

/// Install the global `tracing` subscriber. Safe to call more than once.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn default_directive(verbosity: Verbosity) -> String {
    format!("medquery={}", verbosity.log_level())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(Verbosity::Normal), "medquery=warn");
        assert_eq!(default_directive(Verbosity::VeryVerbose), "medquery=debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init(Verbosity::Quiet);
        init(Verbosity::Verbose);
    }
}
