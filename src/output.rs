//! # Output Configuration
//!
//! Controls how the CLI decorates its user-facing summary lines. Progress
//! lines (`[Loading]`, `[Doing]`, command lines) go through the `log` facade;
//! this module only covers the header and result lines printed by commands.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;

use console::style;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and the `--color` flag
    /// value (`always`, `never`, anything else means auto-detect).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stderr().features().colors_supported()
    }

    /// Emoji when colors are on, the plain tag otherwise.
    pub fn emoji<'a>(&self, emoji: &'a str, plain: &'a str) -> &'a str {
        if self.use_color {
            emoji
        } else {
            plain
        }
    }

    /// A success line, green when colors are on.
    pub fn success(&self, message: &str) -> String {
        let tag = self.emoji("✅", "[OK]");
        if self.use_color {
            format!("{} {}", tag, style(message).green())
        } else {
            format!("{} {}", tag, message)
        }
    }

    /// A failure line, red when colors are on.
    pub fn failure(&self, message: &str) -> String {
        let tag = self.emoji("❌", "[ERR]");
        if self.use_color {
            format!("{} {}", tag, style(message).red().bold())
        } else {
            format!("{} {}", tag, message)
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}
