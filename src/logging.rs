//! Injected diagnostics for the codec, and subscriber setup for the binary.
//!
//! Library code never reaches for a global logger. Functions that have
//! something worth reporting take a `&dyn Logger`; the binary passes
//! [`TracingLogger`], tests pass [`NoopLogger`] or their own recorder.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the `tracing` filter directive.
pub const LOG_ENV: &str = "RANGELINK_LOG";

/// Sink for diagnostic messages raised inside the codec.
pub trait Logger {
    /// Detail useful when tracing a single operation.
    fn debug(&self, context: &str, message: &str);
    /// Something went wrong that the caller will also see as an error.
    fn warn(&self, context: &str, message: &str);
}

/// Forwards to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, context: &str, message: &str) {
        tracing::debug!(context, "{message}");
    }

    fn warn(&self, context: &str, message: &str) {
        tracing::warn!(context, "{message}");
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn debug(&self, _context: &str, _message: &str) {}

    fn warn(&self, _context: &str, _message: &str) {}
}

/// Install a stderr `fmt` subscriber filtered by `RANGELINK_LOG`.
///
/// `verbose` raises the fallback level from `warn` to `debug` when the
/// variable is unset. Calling this twice is harmless; the second install is ignored.
pub fn init(verbose: bool) {
    let fallback = if verbose { "rangelink=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_err| return EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
