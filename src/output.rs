//! Output helpers for consistent CLI output.

use owo_colors::OwoColorize;

/// Standard output helper for consistent CLI formatting.
pub struct Output;

impl Output {
    /// Print a success message with a green checkmark.
    pub fn success(msg: impl AsRef<str>) {
        println!("{} {}", "✓".green().bold(), msg.as_ref());
    }

    /// Print an error message with a red X to stderr.
    pub fn error(msg: impl AsRef<str>) {
        eprintln!("{} {}", "✗".red().bold(), msg.as_ref().red());
    }

    /// Print a warning message with a yellow warning symbol.
    pub fn warning(msg: impl AsRef<str>) {
        println!("{} {}", "⚠".yellow(), msg.as_ref());
    }

    /// Print an info/status message with a cyan arrow.
    pub fn info(msg: impl AsRef<str>) {
        println!("{} {}", "→".cyan(), msg.as_ref().dimmed());
    }
}
