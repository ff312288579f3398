//! jv-protocol: Shared types for jointval.
//!
//! This crate defines the step plan and the tabular sample model passed
//! between the sampler, the rig adapters and the table writer.

pub mod plan;
pub mod sample;

pub use plan::{PlanError, StepPlan};
pub use sample::{Cell, Header, Sample, UNREADABLE_MARKER};
