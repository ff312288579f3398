//! Diagnostic sinks: where progress text from a sweep goes.
//!
//! A sweep only needs one capability from its log destination, recording a
//! line of text. Deployment picks the destination: a live panel on the
//! terminal, plain stdout, or an append-only file.

pub mod file;
pub mod palette;

use std::io::{self, IsTerminal, Write};

use clap::ValueEnum;
use serde::Deserialize;

pub use file::{FileSink, LineFormat, SinkError};
pub use palette::PaletteSink;

use crate::config::LogConfig;

/// Destination for human-readable progress text.
pub trait DiagnosticSink {
    fn record(&mut self, text: &str);

    /// Give a live view the chance to catch up with what was recorded.
    fn refresh(&mut self) {}
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Box<S> {
    fn record(&mut self, text: &str) {
        (**self).record(text);
    }

    fn refresh(&mut self) {
        (**self).refresh();
    }
}

/// Collects lines in memory.
impl DiagnosticSink for Vec<String> {
    fn record(&mut self, text: &str) {
        self.push(text.to_string());
    }
}

/// Which sink a deployment writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Palette,
    Console,
    File,
}

/// Plain lines on a writer, stdout by default.
pub struct ConsoleSink<W: Write> {
    writer: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DiagnosticSink for ConsoleSink<W> {
    fn record(&mut self, text: &str) {
        let _ = writeln!(self.writer, "{text}");
    }

    fn refresh(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Build the sink selected by `config`.
pub fn from_config(config: &LogConfig) -> Result<Box<dyn DiagnosticSink>, SinkError> {
    let sink: Box<dyn DiagnosticSink> = match config.sink {
        SinkKind::Palette => {
            let is_tty = io::stderr().is_terminal();
            Box::new(PaletteSink::new(io::stderr(), is_tty, config.force_update))
        }
        SinkKind::Console => Box::new(ConsoleSink::stdout()),
        SinkKind::File => Box::new(FileSink::new(&config.resolve_path(), config.format)?),
    };
    Ok(sink)
}
