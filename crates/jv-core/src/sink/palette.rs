//! Live text panel on the terminal.
//!
//! TTY output gets a dim prefix, a highlighted actuator line and lines cut
//! to the terminal width. Non-TTY output is plain text with the prefix.

use std::io::Write;

use super::DiagnosticSink;
use crate::style::{truncate_chars, Style, Tone};

const PREFIX: &str = "[jv]";

pub struct PaletteSink<W: Write> {
    writer: W,
    is_tty: bool,
    force_update: bool,
    style: Style,
    term_width: u16,
}

impl<W: Write> PaletteSink<W> {
    /// `force_update` flushes after every record so the panel tracks the sweep.
    pub fn new(writer: W, is_tty: bool, force_update: bool) -> Self {
        let term_width = if is_tty {
            crossterm::terminal::size().map(|(w, _)| w).unwrap_or(80)
        } else {
            80
        };
        let style = if is_tty { Style::new() } else { Style::disabled() };

        Self {
            writer,
            is_tty,
            force_update,
            style,
            term_width,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn fit(&self, text: &str) -> String {
        if !self.is_tty {
            return text.to_string();
        }
        let max = (self.term_width as usize).saturating_sub(PREFIX.len() + 1);
        truncate_chars(text, max)
    }

    fn tone_for(text: &str) -> Option<Tone> {
        if text.ends_with(" error") {
            Some(Tone::Warn)
        } else if text.ends_with("<<<") {
            Some(Tone::Accent)
        } else {
            None
        }
    }
}

impl<W: Write> DiagnosticSink for PaletteSink<W> {
    fn record(&mut self, text: &str) {
        let line = self.fit(text);
        let line = match Self::tone_for(&line) {
            Some(tone) => self.style.paint(&line, tone),
            None => line,
        };
        let _ = writeln!(self.writer, "{} {}", self.style.paint(PREFIX, Tone::Dim), line);
        if self.force_update {
            let _ = self.writer.flush();
        }
    }

    fn refresh(&mut self) {
        let _ = self.writer.flush();
    }
}
