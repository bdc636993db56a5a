//! # Output Configuration
//!
//! Controls CLI output appearance: whether colors and emoji are used,
//! based on terminal capabilities and user preferences.
//!
//! The resolution order honors the usual conventions:
//! `--color=always|never` wins outright; in `auto` mode the `NO_COLOR`
//! variable (per <https://no-color.org/>), `CLICOLOR=0`, `CLICOLOR_FORCE`
//! and `TERM=dumb` are consulted before falling back to the `console`
//! crate's TTY detection.

use std::env;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    use_color: bool,
}

impl OutputConfig {
    /// Resolve the configuration from the `--color` flag value
    /// (`always`, `never`, or `auto`) and the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => detect_color_support(),
        };
        Self { use_color }
    }

    /// Whether colored/emoji output is active.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Pick the emoji or its plain-text stand-in.
    pub fn emoji<'a>(&self, emoji: &'a str, plain: &'a str) -> &'a str {
        if self.use_color {
            emoji
        } else {
            plain
        }
    }

    /// A configuration with colors forced on.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// A configuration with colors forced off.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Detect whether color output is supported based on the environment.
fn detect_color_support() -> bool {
    // The presence of NO_COLOR (even empty) disables colors
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

    console::Term::stdout().features().colors_supported()
}
