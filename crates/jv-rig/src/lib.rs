//! jv-rig: Collaborator interfaces for the mechanism being swept.
//!
//! The sampler only ever talks to a rig through these traits: one linear
//! actuator it positions, a set of rotational sensors it reads, and a
//! lookup that resolves human-readable entity names to handles.

pub mod error;
pub mod mock;
pub mod units;

pub use error::{EntityKind, RigError};
pub use mock::{MockRig, MockRigConfig, MockSensorConfig};
pub use units::{AngleUnit, LengthUnit};

/// The single controllable linear joint.
///
/// Positions are in the rig's native length unit.
pub trait Actuator {
    fn name(&self) -> &str;

    /// Current position.
    fn position(&self) -> Result<f64, RigError>;

    /// Move to `value`. The move is complete when this returns.
    fn set_position(&mut self, value: f64) -> Result<(), RigError>;
}

/// A dependent revolute joint whose rotation is read, never written.
pub trait Sensor {
    fn name(&self) -> &str;

    /// Current rotation in radians.
    fn read(&self) -> Result<f64, RigError>;
}

/// Resolves entity names to actuator and sensor handles.
pub trait EntityLookup {
    fn actuator(&self, name: &str) -> Result<Box<dyn Actuator>, RigError>;

    /// Resolve the revolute joint `joint` inside the component `group`.
    fn sensor(&self, group: &str, joint: &str) -> Result<Box<dyn Sensor>, RigError>;
}
