//! Output formatting for the gs commands
//!
//! Every command funnels its messages through a Formatter so the global
//! --json, --quiet and --no-color flags behave the same everywhere.
//! Data goes to stdout, diagnostics to stderr, so rows and object
//! contents stay pipeable.

use serde::Serialize;

use super::OutputConfig;

const OK: &str = "✓";
const FAIL: &str = "✗";
const WARN: &str = "⚠";

/// Formats command output according to the global output flags.
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn is_quiet(&self) -> bool {
        self.config.quiet
    }

    /// Colors are dropped in JSON mode even without --no-color.
    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    fn glyph(&self, symbol: &str, color: &str) -> String {
        if self.colors_enabled() {
            format!("\x1b[{color}m{symbol}\x1b[0m")
        } else {
            symbol.to_string()
        }
    }

    /// Print a status line for a completed operation.
    ///
    /// Suppressed in quiet mode, and in JSON mode too: JSON runs emit
    /// their own result document and the exit code carries the status.
    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        println!("{} {message}", self.glyph(OK, "32"));
    }

    /// Report a failure on stderr.
    ///
    /// Never suppressed: quiet runs still report errors, and JSON runs
    /// get the message wrapped in an error document.
    pub fn error(&self, message: &str) {
        if self.config.json {
            let doc = serde_json::json!({ "error": message });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&doc).unwrap_or_else(|_| message.to_string())
            );
        } else {
            eprintln!("{} {message}", self.glyph(FAIL, "31"));
        }
    }

    /// Print a non-fatal notice on stderr. Quiet and JSON runs skip it.
    pub fn warning(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        eprintln!("{} {message}", self.glyph(WARN, "33"));
    }

    /// Pretty-print a result document to stdout.
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Print a data line to stdout unless quiet mode is on.
    pub fn println(&self, message: &str) {
        if !self.config.quiet {
            println!("{message}");
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}
