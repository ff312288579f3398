//! Delimited text table the sweep writes into.
//!
//! A new table starts with its header. An existing, non-empty table is
//! appended to without a header, and the writer reports itself as resuming
//! so the sampler skips the row the previous run already wrote.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use jv_protocol::{Header, Sample};
use thiserror::Error;
use tracing::{debug, warn};

use crate::format::NumberFormat;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row has {actual} fields, table has {expected}")]
    RowWidth { expected: usize, actual: usize },
}

/// Destination for sample rows.
pub trait RowSink {
    /// Whether rows from an earlier run are already present.
    fn resuming(&self) -> bool {
        false
    }

    fn append_row(&mut self, sample: &Sample) -> Result<(), TableError>;
}

/// In-memory table.
impl RowSink for Vec<Sample> {
    fn resuming(&self) -> bool {
        !self.is_empty()
    }

    fn append_row(&mut self, sample: &Sample) -> Result<(), TableError> {
        self.push(sample.clone());
        Ok(())
    }
}

pub struct TableWriter<W: Write> {
    writer: csv::Writer<W>,
    format: NumberFormat,
    width: usize,
    resuming: bool,
    rows: usize,
}

impl TableWriter<File> {
    /// Open `path`, writing `header` only when the file is new or empty.
    pub fn open(path: &Path, header: &Header, format: NumberFormat) -> Result<Self, TableError> {
        let has_data = fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);
        if has_data {
            check_existing_header(path, header, &format);
        } else if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        debug!(path = %path.display(), resuming = has_data, "table opened");
        Self::from_writer(file, header, format, has_data)
    }
}

impl<W: Write> TableWriter<W> {
    /// Wrap `inner`. Unless `resuming`, the header is written immediately.
    pub fn from_writer(
        inner: W,
        header: &Header,
        format: NumberFormat,
        resuming: bool,
    ) -> Result<Self, TableError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(format.delimiter())
            .terminator(csv::Terminator::CRLF)
            .has_headers(false)
            .from_writer(inner);

        if !resuming {
            writer.write_record(header.labels())?;
            writer.flush()?;
        }

        Ok(Self {
            writer,
            format,
            width: header.width(),
            resuming,
            rows: 0,
        })
    }

    /// Rows appended through this writer.
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(self) -> Result<W, TableError> {
        self.writer
            .into_inner()
            .map_err(|e| TableError::Io(e.into_error()))
    }
}

impl<W: Write> RowSink for TableWriter<W> {
    fn resuming(&self) -> bool {
        self.resuming
    }

    fn append_row(&mut self, sample: &Sample) -> Result<(), TableError> {
        if sample.width() != self.width {
            return Err(TableError::RowWidth {
                expected: self.width,
                actual: sample.width(),
            });
        }

        let mut record = Vec::with_capacity(self.width);
        record.push(self.format.format(sample.actuator));
        record.extend(sample.cells.iter().map(|c| self.format.format_cell(c)));

        self.writer.write_record(&record)?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }
}

/// Warn when an existing table was started with different columns.
fn check_existing_header(path: &Path, header: &Header, format: &NumberFormat) {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(format.delimiter())
        .from_path(path);

    let first = reader.and_then(|mut r| {
        let next = r.records().next();
        next.transpose()
    });
    match first {
        Ok(Some(record)) if record.iter().eq(header.labels().iter().map(String::as_str)) => {}
        Ok(Some(record)) => {
            warn!(
                path = %path.display(),
                found = record.len(),
                expected = header.width(),
                "existing table has a different header; appending anyway"
            );
        }
        Ok(None) => {}
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read existing table header");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jv_protocol::Cell;

    fn header(sensors: &[&str]) -> Header {
        let mut h = Header::new("[cm/degree]");
        for s in sensors {
            h.push_sensor("Leg", s);
        }
        h
    }

    fn written(writer: TableWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn new_table_gets_header() {
        let writer =
            TableWriter::from_writer(Vec::new(), &header(&["H", "VL"]), NumberFormat::default(), false)
                .unwrap();
        assert!(!writer.resuming());
        assert_eq!(written(writer), "[cm/degree],Leg/H,Leg/VL\r\n");
    }

    #[test]
    fn resuming_table_skips_header() {
        let mut writer =
            TableWriter::from_writer(Vec::new(), &header(&["H"]), NumberFormat::default(), true)
                .unwrap();
        assert!(writer.resuming());
        writer
            .append_row(&Sample::new(0.5, vec![Cell::Reading(12.346)]))
            .unwrap();
        assert_eq!(written(writer), "0.5,12.35\r\n");
    }

    #[test]
    fn rows_use_marker_and_format() {
        let mut writer =
            TableWriter::from_writer(Vec::new(), &header(&["H", "VL"]), NumberFormat::default(), false)
                .unwrap();
        writer
            .append_row(&Sample::new(1.0, vec![Cell::Reading(-3.0), Cell::Unreadable]))
            .unwrap();
        assert_eq!(writer.rows_written(), 1);
        assert_eq!(
            written(writer),
            "[cm/degree],Leg/H,Leg/VL\r\n1.0,-3.0,error\r\n"
        );
    }

    #[test]
    fn comma_separator_switches_delimiter() {
        let mut writer =
            TableWriter::from_writer(Vec::new(), &header(&["H"]), NumberFormat::new(2, ','), false)
                .unwrap();
        writer
            .append_row(&Sample::new(1.5, vec![Cell::Reading(22.25)]))
            .unwrap();
        assert_eq!(written(writer), "[cm/degree];Leg/H\r\n1,5;22,25\r\n");
    }

    #[test]
    fn width_mismatch_rejected() {
        let mut writer =
            TableWriter::from_writer(Vec::new(), &header(&["H", "VL"]), NumberFormat::default(), false)
                .unwrap();
        let err = writer
            .append_row(&Sample::new(0.0, vec![Cell::Reading(1.0)]))
            .unwrap_err();
        assert!(matches!(
            err,
            TableError::RowWidth {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn open_creates_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("params.csv");
        let h = header(&["H"]);

        let mut first = TableWriter::open(&path, &h, NumberFormat::default()).unwrap();
        assert!(!first.resuming());
        first.append_row(&Sample::new(0.0, vec![Cell::Reading(1.0)])).unwrap();
        drop(first);

        let mut second = TableWriter::open(&path, &h, NumberFormat::default()).unwrap();
        assert!(second.resuming());
        second.append_row(&Sample::new(0.5, vec![Cell::Reading(2.0)])).unwrap();
        drop(second);

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[cm/degree],Leg/H\r\n0.0,1.0\r\n0.5,2.0\r\n"
        );
    }

    #[test]
    fn empty_existing_file_gets_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.csv");
        fs::write(&path, "").unwrap();

        let writer = TableWriter::open(&path, &header(&["H"]), NumberFormat::default()).unwrap();
        assert!(!writer.resuming());
        drop(writer);
        assert_eq!(fs::read_to_string(&path).unwrap(), "[cm/degree],Leg/H\r\n");
    }

    #[test]
    fn mismatched_header_still_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.csv");
        fs::write(&path, "[cm/degree],Other/X\r\n0.0,1.0\r\n").unwrap();

        let mut writer = TableWriter::open(&path, &header(&["H"]), NumberFormat::default()).unwrap();
        assert!(writer.resuming());
        writer.append_row(&Sample::new(0.5, vec![Cell::Reading(2.0)])).unwrap();
        drop(writer);
        assert!(fs::read_to_string(&path).unwrap().ends_with("0.5,2.0\r\n"));
    }

    #[test]
    fn vec_sink_resumes_when_non_empty() {
        let mut rows: Vec<Sample> = Vec::new();
        assert!(!rows.resuming());
        rows.append_row(&Sample::new(0.0, Vec::new())).unwrap();
        assert!(rows.resuming());
    }
}
