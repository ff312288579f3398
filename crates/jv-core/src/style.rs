//! Terminal styling helpers with NO_COLOR support.

use crossterm::style::Stylize;

/// Check if color output is enabled (respects `NO_COLOR` env var).
pub fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Role of a piece of text, mapped to a color when styling is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Dim,
    Accent,
    Warn,
    Error,
}

/// Terminal style helper that respects NO_COLOR.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    enabled: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self::new()
    }
}

impl Style {
    pub fn new() -> Self {
        Self {
            enabled: color_enabled(),
        }
    }

    /// Create a style with colors explicitly enabled (for tests).
    pub fn force_enabled() -> Self {
        Self { enabled: true }
    }

    /// Create a style with colors explicitly disabled.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Render `text` in the given tone, or unchanged when styling is off.
    pub fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.enabled {
            return text.to_string();
        }
        match tone {
            Tone::Dim => text.dim().to_string(),
            Tone::Accent => text.cyan().to_string(),
            Tone::Warn => text.yellow().to_string(),
            Tone::Error => text.red().to_string(),
        }
    }
}

/// Cut `s` to at most `max` characters, marking the cut with `...`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max || max <= 3 {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max - 3).collect();
    truncated.push_str("...");
    truncated
}
