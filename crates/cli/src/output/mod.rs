//! Output handling for the gs binary
//!
//! Commands never print directly; they go through [`Formatter`] for
//! messages and [`ProgressBar`] for long transfers, both driven by the
//! global output flags captured in [`OutputConfig`].

mod formatter;
mod progress;

pub use formatter::Formatter;
pub use progress::ProgressBar;

/// Snapshot of the global output flags, passed into every command
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Emit JSON documents instead of human-readable text
    pub json: bool,
    /// Strip ANSI colors from human-readable output
    pub no_color: bool,
    /// Never draw progress bars
    pub no_progress: bool,
    /// Only print errors and data, no status messages
    pub quiet: bool,
}
