//! The stepped sampler.
//!
//! Drives the actuator through a [`StepPlan`] and, after every move, reads
//! each sensor and appends one row. A sensor that fails to read only costs
//! its own cell; any other failure ends the sweep.

use std::thread;
use std::time::Duration;

use jv_protocol::{Cell, Sample, StepPlan};
use jv_rig::{Actuator, AngleUnit, RigError, Sensor};
use thiserror::Error;
use tracing::{debug, warn};

use crate::format::NumberFormat;
use crate::sink::DiagnosticSink;
use crate::table::{RowSink, TableError};

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("rig error: {0}")]
    Rig(#[from] RigError),
    #[error("table error: {0}")]
    Table(#[from] TableError),
}

/// A sensor and the column label it is tabulated under.
pub struct SensorChannel {
    label: String,
    sensor: Box<dyn Sensor>,
}

impl SensorChannel {
    pub fn new(label: impl Into<String>, sensor: Box<dyn Sensor>) -> Self {
        Self {
            label: label.into(),
            sensor,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Read and convert, or [`Cell::Unreadable`] if the sensor fails.
    fn sample(&self, unit: AngleUnit) -> Result<Cell, RigError> {
        let radians = self.sensor.read()?;
        let value = unit.from_radians(radians);
        if value.is_finite() {
            Ok(Cell::Reading(value))
        } else {
            Err(RigError::Read {
                sensor: self.label.clone(),
                reason: format!("non-finite reading {radians}"),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepOptions {
    /// Used for progress text; the table applies its own format.
    pub format: NumberFormat,
    pub angle_unit: AngleUnit,
    /// Refresh the diagnostic sink and pause after every move.
    pub update_view: bool,
    pub step_pause: Duration,
    pub restore_actuator: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            format: NumberFormat::default(),
            angle_unit: AngleUnit::Degree,
            update_view: false,
            step_pause: Duration::ZERO,
            restore_actuator: true,
        }
    }
}

/// Outcome of a completed sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    /// Rows appended by this sweep.
    pub steps: usize,
    /// The table already held rows, so the start value was skipped.
    pub resumed: bool,
    pub first: Option<f64>,
    pub last: Option<f64>,
    pub unreadable: usize,
}

/// Sweep `actuator` through `plan`, appending one row per step to `rows`.
pub fn run(
    plan: &StepPlan,
    sensors: &[SensorChannel],
    actuator: &mut dyn Actuator,
    rows: &mut dyn RowSink,
    options: &SweepOptions,
    sink: &mut dyn DiagnosticSink,
) -> Result<SweepReport, SweepError> {
    let fmt = &options.format;
    let mut report = SweepReport {
        resumed: rows.resuming(),
        ..Default::default()
    };

    let mut current = plan.start();
    if report.resumed {
        // The row for `start` is already in the table.
        current += plan.increment();
    }

    loop {
        sink.record(&format!("{} {} <<<", actuator.name(), fmt.format(current)));
        actuator.set_position(current)?;

        if options.update_view {
            sink.refresh();
            if !options.step_pause.is_zero() {
                thread::sleep(options.step_pause);
            }
        }

        let mut cells = Vec::with_capacity(sensors.len());
        for channel in sensors {
            let cell = match channel.sample(options.angle_unit) {
                Ok(cell) => cell,
                Err(e) => {
                    warn!(sensor = channel.label(), error = %e, "sensor unreadable");
                    Cell::Unreadable
                }
            };
            sink.record(&format!("{} : {}", channel.label(), fmt.format_cell(&cell)));
            cells.push(cell);
        }

        let sample = Sample::new(current, cells);
        rows.append_row(&sample)?;
        report.steps += 1;
        report.unreadable += sample.unreadable_count();
        report.first.get_or_insert(current);
        report.last = Some(current);
        debug!(step = report.steps, value = current, "row appended");

        if plan.is_done(current) {
            break;
        }
        current += plan.increment();
    }

    if options.restore_actuator {
        actuator.set_position(plan.start())?;
        sink.record(&format!(
            "{} restored to {}",
            actuator.name(),
            fmt.format(plan.start())
        ));
    }

    sink.record("Done!");
    Ok(report)
}
