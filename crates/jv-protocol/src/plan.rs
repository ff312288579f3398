//! Step plan: the stepped range an actuator is swept through.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("increment must not be zero")]
    ZeroIncrement,
    #[error("{field} is not a finite number: {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("increment {increment} is too small to move away from {value}")]
    Stalled { value: f64, increment: f64 },
}

/// A sweep from `start` towards `end` in steps of `increment`.
///
/// The sign of `increment` selects the direction and the stop comparison, so
/// a plan whose end lies "behind" the start still terminates after one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPlan {
    start: f64,
    end: f64,
    increment: f64,
}

impl StepPlan {
    pub fn new(start: f64, end: f64, increment: f64) -> Result<Self, PlanError> {
        for (field, value) in [("start", start), ("end", end), ("increment", increment)] {
            if !value.is_finite() {
                return Err(PlanError::NonFinite { field, value });
            }
        }
        if increment == 0.0 {
            return Err(PlanError::ZeroIncrement);
        }
        let plan = Self {
            start,
            end,
            increment,
        };
        // Float spacing grows with magnitude, so if stepping moves both the
        // start and the end it moves every value the sweep passes through.
        let mut visited = vec![start];
        if !plan.is_done(start) {
            visited.push(end);
        }
        if let Some(value) = visited.into_iter().find(|v| v + increment == *v) {
            return Err(PlanError::Stalled { value, increment });
        }
        Ok(plan)
    }

    /// Build a plan that moves the actuator by `movement` from `start`.
    ///
    /// A negative movement negates the configured increment, whatever sign
    /// the increment already had.
    pub fn from_movement(start: f64, movement: f64, increment: f64) -> Result<Self, PlanError> {
        let increment = if movement < 0.0 { -increment } else { increment };
        Self::new(start, start + movement, increment)
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn increment(&self) -> f64 {
        self.increment
    }

    pub fn is_descending(&self) -> bool {
        self.increment < 0.0
    }

    /// Whether a sweep that just sampled `current` has reached the end.
    pub fn is_done(&self, current: f64) -> bool {
        if self.is_descending() {
            current <= self.end
        } else {
            current >= self.end
        }
    }
}
