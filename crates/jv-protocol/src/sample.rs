//! Sample and header types for the output table.

use serde::{Deserialize, Serialize};

/// Literal written in place of a sensor value that could not be read.
pub const UNREADABLE_MARKER: &str = "error";

/// One sensor cell in a sample row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Cell {
    /// A successful reading, already in the table's angle unit.
    Reading(f64),
    /// The sensor failed for this step.
    Unreadable,
}

impl Cell {
    pub fn value(&self) -> Option<f64> {
        match self {
            Cell::Reading(v) => Some(*v),
            Cell::Unreadable => None,
        }
    }

    pub fn is_unreadable(&self) -> bool {
        matches!(self, Cell::Unreadable)
    }
}

/// One row: the actuator value followed by one cell per sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub actuator: f64,
    pub cells: Vec<Cell>,
}

impl Sample {
    pub fn new(actuator: f64, cells: Vec<Cell>) -> Self {
        Self { actuator, cells }
    }

    /// Number of fields this sample occupies in a table row.
    pub fn width(&self) -> usize {
        1 + self.cells.len()
    }

    pub fn unreadable_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_unreadable()).count()
    }
}

/// Column labels of a table.
///
/// The first label annotates the units (e.g. `[cm/degree]`); the remaining
/// labels name the sensors as `<group>/<sensor>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    labels: Vec<String>,
}

impl Header {
    pub fn new(unit_annotation: impl Into<String>) -> Self {
        Self {
            labels: vec![unit_annotation.into()],
        }
    }

    /// Append a `<group>/<sensor>` column.
    pub fn push_sensor(&mut self, group: &str, sensor: &str) {
        self.labels.push(format!("{group}/{sensor}"));
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn unit_annotation(&self) -> &str {
        &self.labels[0]
    }

    pub fn sensor_count(&self) -> usize {
        self.labels.len() - 1
    }

    /// Total number of columns, including the actuator column.
    pub fn width(&self) -> usize {
        self.labels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_starts_with_annotation() {
        let mut header = Header::new("[cm/degree]");
        header.push_sensor("FrontLeft", "H");
        header.push_sensor("FrontLeft", "VL");

        assert_eq!(header.unit_annotation(), "[cm/degree]");
        assert_eq!(header.labels(), ["[cm/degree]", "FrontLeft/H", "FrontLeft/VL"]);
        assert_eq!(header.sensor_count(), 2);
        assert_eq!(header.width(), 3);
    }

    #[test]
    fn sample_width_matches_header() {
        let mut header = Header::new("[cm/degree]");
        header.push_sensor("MidLeft", "VH");
        let sample = Sample::new(0.5, vec![Cell::Reading(12.0)]);
        assert_eq!(sample.width(), header.width());
    }

    #[test]
    fn unreadable_cells_counted() {
        let sample = Sample::new(
            1.0,
            vec![Cell::Reading(1.0), Cell::Unreadable, Cell::Unreadable],
        );
        assert_eq!(sample.unreadable_count(), 2);
        assert_eq!(sample.cells[0].value(), Some(1.0));
        assert_eq!(sample.cells[1].value(), None);
    }

    #[test]
    fn cell_serializes_tagged() {
        let json = serde_json::to_string(&Cell::Unreadable).unwrap();
        assert_eq!(json, r#"{"kind":"unreadable"}"#);

        let json = serde_json::to_string(&Cell::Reading(2.5)).unwrap();
        assert_eq!(json, r#"{"kind":"reading","value":2.5}"#);
    }
}
