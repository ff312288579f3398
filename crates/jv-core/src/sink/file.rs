//! Append-only file sink.
//!
//! Every record is written and flushed immediately so the log survives an
//! aborted sweep.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use thiserror::Error;

use super::DiagnosticSink;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("could not open/create file = {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Line layout of a [`FileSink`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineFormat {
    /// The text itself, CRLF-terminated.
    #[default]
    Plain,
    /// One JSON object per line with timestamp and session id.
    Jsonl,
}

pub struct FileSink {
    writer: BufWriter<File>,
    format: LineFormat,
    session_id: String,
}

impl FileSink {
    /// Open `path` for appending, creating it and its parent directories.
    pub fn new(path: &Path, format: LineFormat) -> Result<Self, SinkError> {
        let open = || -> io::Result<File> {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            OpenOptions::new().create(true).append(true).open(path)
        };
        let file = open().map_err(|source| SinkError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            writer: BufWriter::new(file),
            format,
            session_id: generate_session_id(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl DiagnosticSink for FileSink {
    fn record(&mut self, text: &str) {
        match self.format {
            LineFormat::Plain => {
                let _ = write!(self.writer, "{text}\r\n");
            }
            LineFormat::Jsonl => {
                let value = serde_json::json!({
                    "ts": epoch_secs(),
                    "session": self.session_id,
                    "text": text,
                });
                if let Ok(line) = serde_json::to_string(&value) {
                    let _ = writeln!(self.writer, "{line}");
                }
            }
        }
        let _ = self.writer.flush();
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn generate_session_id() -> String {
    let pid = std::process::id();
    let ts = epoch_secs();
    format!("s{:x}", pid ^ (ts as u32))
}
