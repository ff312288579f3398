//! In-process rig for tests and dry runs.
//!
//! All handles handed out by a [`MockRig`] share one slider position, so a
//! sensor read after a move sees the new position. Each sensor reports
//! `offset + gain * position` radians. Failures can be scripted per sensor
//! read index and per actuator move index.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Deserialize;

use crate::error::{EntityKind, RigError};
use crate::{Actuator, EntityLookup, Sensor};

/// Description of a mock rig. Deserializable so a rig can live in a TOML file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MockRigConfig {
    /// Name of the slider joint.
    pub actuator: String,
    /// Initial slider position in native units.
    pub position: f64,
    /// Zero-based move index on which the actuator fails.
    pub fail_on_move: Option<usize>,
    pub sensors: Vec<MockSensorConfig>,
}

impl Default for MockRigConfig {
    fn default() -> Self {
        Self {
            actuator: "Slider184".to_string(),
            position: 0.0,
            fail_on_move: None,
            sensors: Vec::new(),
        }
    }
}

impl MockRigConfig {
    pub fn new(actuator: impl Into<String>) -> Self {
        Self {
            actuator: actuator.into(),
            ..Default::default()
        }
    }

    pub fn with_position(mut self, position: f64) -> Self {
        self.position = position;
        self
    }

    pub fn with_sensor(mut self, sensor: MockSensorConfig) -> Self {
        self.sensors.push(sensor);
        self
    }

    pub fn with_actuator_failure(mut self, move_index: usize) -> Self {
        self.fail_on_move = Some(move_index);
        self
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MockSensorConfig {
    /// Entity path, `<group entity>/<joint entity>`.
    pub entity: String,
    #[serde(default = "default_gain")]
    pub gain: f64,
    #[serde(default)]
    pub offset: f64,
    /// Zero-based read indices on which this sensor fails.
    #[serde(default)]
    pub fail_on: Vec<usize>,
}

fn default_gain() -> f64 {
    1.0
}

impl MockSensorConfig {
    pub fn linear(group: &str, joint: &str, gain: f64, offset: f64) -> Self {
        Self {
            entity: format!("{group}/{joint}"),
            gain,
            offset,
            fail_on: Vec::new(),
        }
    }

    pub fn failing_on(mut self, reads: &[usize]) -> Self {
        self.fail_on = reads.to_vec();
        self
    }
}

#[derive(Debug)]
struct RigState {
    position: Cell<f64>,
    moves: RefCell<Vec<f64>>,
}

/// A deterministic rig implementing [`EntityLookup`].
pub struct MockRig {
    config: MockRigConfig,
    state: Rc<RigState>,
}

impl MockRig {
    pub fn new(config: MockRigConfig) -> Self {
        let state = Rc::new(RigState {
            position: Cell::new(config.position),
            moves: RefCell::new(Vec::new()),
        });
        Self { config, state }
    }

    /// Current slider position.
    pub fn position(&self) -> f64 {
        self.state.position.get()
    }

    /// Every position the actuator was successfully moved to, in order.
    pub fn moves(&self) -> Vec<f64> {
        self.state.moves.borrow().clone()
    }

    pub fn config(&self) -> &MockRigConfig {
        &self.config
    }
}

impl EntityLookup for MockRig {
    fn actuator(&self, name: &str) -> Result<Box<dyn Actuator>, RigError> {
        if name != self.config.actuator {
            return Err(RigError::not_found(EntityKind::Actuator, name));
        }
        Ok(Box::new(MockActuator {
            name: name.to_string(),
            state: Rc::clone(&self.state),
            fail_on_move: self.config.fail_on_move,
            attempts: 0,
        }))
    }

    fn sensor(&self, group: &str, joint: &str) -> Result<Box<dyn Sensor>, RigError> {
        let prefix = format!("{group}/");
        if !self
            .config
            .sensors
            .iter()
            .any(|s| s.entity.starts_with(&prefix))
        {
            return Err(RigError::not_found(EntityKind::Group, group));
        }

        let entity = format!("{group}/{joint}");
        let spec = self
            .config
            .sensors
            .iter()
            .find(|s| s.entity == entity)
            .ok_or_else(|| RigError::not_found(EntityKind::Joint, &entity))?;

        Ok(Box::new(MockSensor {
            name: joint.to_string(),
            state: Rc::clone(&self.state),
            gain: spec.gain,
            offset: spec.offset,
            fail_on: spec.fail_on.clone(),
            reads: Cell::new(0),
        }))
    }
}

struct MockActuator {
    name: String,
    state: Rc<RigState>,
    fail_on_move: Option<usize>,
    attempts: usize,
}

impl Actuator for MockActuator {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Result<f64, RigError> {
        Ok(self.state.position.get())
    }

    fn set_position(&mut self, value: f64) -> Result<(), RigError> {
        let index = self.attempts;
        self.attempts += 1;
        if self.fail_on_move == Some(index) {
            return Err(RigError::Actuate {
                actuator: self.name.clone(),
                target: value,
                reason: format!("scripted failure on move {index}"),
            });
        }
        self.state.position.set(value);
        self.state.moves.borrow_mut().push(value);
        Ok(())
    }
}

struct MockSensor {
    name: String,
    state: Rc<RigState>,
    gain: f64,
    offset: f64,
    fail_on: Vec<usize>,
    reads: Cell<usize>,
}

impl Sensor for MockSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<f64, RigError> {
        let index = self.reads.get();
        self.reads.set(index + 1);
        if self.fail_on.contains(&index) {
            return Err(RigError::Read {
                sensor: self.name.clone(),
                reason: format!("scripted failure on read {index}"),
            });
        }
        Ok(self.offset + self.gain * self.state.position.get())
    }
}

/// Built-in rigs for common scenarios.
pub mod fixtures {
    use super::*;

    /// Leg components of the six-legged walker, as `(label, entity)`.
    pub const LEGS: [(&str, &str); 6] = [
        ("FrontLeft", "Scorpion Leg LH Long v2:2"),
        ("FrontRight", "Scorpion Leg RH Long v2:2"),
        ("MidLeft", "Scorpion Leg LH Long v2:1"),
        ("MidRight", "Scorpion Leg RH Long v2:1"),
        ("BackLeft", "Scorpion Leg LH Long v2:3"),
        ("BackRight", "Scorpion Leg RH Long v2:3"),
    ];

    /// Revolute joints inside each leg, as `(label, entity)`.
    pub const JOINTS: [(&str, &str); 3] = [("H", "Hor"), ("VL", "VerLow"), ("VH", "VerHigh")];

    /// A rig with every leg joint present, each with a distinct response.
    pub fn legged_rig(position: f64) -> MockRigConfig {
        let mut config = MockRigConfig::new("Slider184").with_position(position);
        for (i, (_, leg)) in LEGS.iter().enumerate() {
            for (j, (_, joint)) in JOINTS.iter().enumerate() {
                let gain = 0.1 * (j + 1) as f64;
                let offset = 0.05 * i as f64;
                config = config.with_sensor(MockSensorConfig::linear(leg, joint, gain, offset));
            }
        }
        config
    }

    /// A single-group rig with `count` unit-gain sensors named `J0..Jn`.
    pub fn simple_rig(count: usize) -> MockRigConfig {
        (0..count).fold(MockRigConfig::new("Slider"), |config, i| {
            config.with_sensor(MockSensorConfig::linear("Leg", &format!("J{i}"), 1.0, 0.0))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensors_follow_the_slider() {
        let rig = MockRig::new(
            MockRigConfig::new("Slider")
                .with_sensor(MockSensorConfig::linear("Leg", "Hor", 2.0, 0.5)),
        );
        let mut actuator = rig.actuator("Slider").unwrap();
        let sensor = rig.sensor("Leg", "Hor").unwrap();

        actuator.set_position(1.0).unwrap();
        assert_eq!(sensor.read().unwrap(), 2.5);
        actuator.set_position(-1.0).unwrap();
        assert_eq!(sensor.read().unwrap(), -1.5);
        assert_eq!(rig.moves(), vec![1.0, -1.0]);
        assert_eq!(rig.position(), -1.0);
    }

    #[test]
    fn unknown_actuator() {
        let rig = MockRig::new(MockRigConfig::new("Slider"));
        let err = rig.actuator("Slider999").err().unwrap();
        assert_eq!(err, RigError::not_found(EntityKind::Actuator, "Slider999"));
    }

    #[test]
    fn unknown_group_then_unknown_joint() {
        let rig = MockRig::new(fixtures::simple_rig(1));
        let err = rig.sensor("Arm", "J0").err().unwrap();
        assert_eq!(err, RigError::not_found(EntityKind::Group, "Arm"));

        let err = rig.sensor("Leg", "J7").err().unwrap();
        assert_eq!(err, RigError::not_found(EntityKind::Joint, "Leg/J7"));
    }

    #[test]
    fn scripted_sensor_failure() {
        let rig = MockRig::new(
            MockRigConfig::new("Slider")
                .with_sensor(MockSensorConfig::linear("Leg", "Hor", 1.0, 0.0).failing_on(&[1])),
        );
        let sensor = rig.sensor("Leg", "Hor").unwrap();
        assert!(sensor.read().is_ok());
        assert!(matches!(sensor.read(), Err(RigError::Read { .. })));
        assert!(sensor.read().is_ok());
    }

    #[test]
    fn scripted_actuator_failure() {
        let rig = MockRig::new(MockRigConfig::new("Slider").with_actuator_failure(1));
        let mut actuator = rig.actuator("Slider").unwrap();
        actuator.set_position(0.5).unwrap();
        let err = actuator.set_position(1.0).unwrap_err();
        assert!(matches!(err, RigError::Actuate { target, .. } if target == 1.0));
        assert_eq!(rig.position(), 0.5);
    }

    #[test]
    fn legged_rig_resolves_every_joint() {
        let rig = MockRig::new(fixtures::legged_rig(2.0));
        for (_, leg) in fixtures::LEGS {
            for (_, joint) in fixtures::JOINTS {
                assert!(rig.sensor(leg, joint).is_ok(), "{leg}/{joint}");
            }
        }
        let actuator = rig.actuator("Slider184").unwrap();
        assert_eq!(actuator.position().unwrap(), 2.0);
    }

    #[test]
    fn config_from_toml() {
        let toml_str = r#"
actuator = "Slider7"
position = 1.5
fail_on_move = 3

[[sensors]]
entity = "Leg/Hor"
gain = 0.25

[[sensors]]
entity = "Leg/VerLow"
offset = 0.1
fail_on = [0, 2]
"#;
        let config: MockRigConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.actuator, "Slider7");
        assert_eq!(config.position, 1.5);
        assert_eq!(config.fail_on_move, Some(3));
        assert_eq!(config.sensors.len(), 2);
        assert_eq!(config.sensors[0].gain, 0.25);
        assert_eq!(config.sensors[0].offset, 0.0);
        assert_eq!(config.sensors[1].gain, 1.0);
        assert_eq!(config.sensors[1].fail_on, vec![0, 2]);
    }
}
