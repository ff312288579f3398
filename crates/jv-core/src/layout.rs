//! Rig layout: which actuator to drive and which joints to tabulate.

use jv_protocol::Header;
use jv_rig::{Actuator, EntityLookup, RigError};
use serde::Deserialize;

use crate::sampler::SensorChannel;
use crate::sink::DiagnosticSink;

/// A column label paired with the entity name the rig knows it by.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NamedEntity {
    pub label: String,
    pub entity: String,
}

impl NamedEntity {
    pub fn new(label: &str, entity: &str) -> Self {
        Self {
            label: label.to_string(),
            entity: entity.to_string(),
        }
    }
}

/// Every joint in `joints` is read inside every component in `groups`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RigLayout {
    pub actuator: String,
    pub groups: Vec<NamedEntity>,
    pub joints: Vec<NamedEntity>,
}

impl Default for RigLayout {
    fn default() -> Self {
        Self {
            actuator: "Slider184".to_string(),
            groups: vec![
                NamedEntity::new("FrontLeft", "Scorpion Leg LH Long v2:2"),
                NamedEntity::new("FrontRight", "Scorpion Leg RH Long v2:2"),
                NamedEntity::new("MidLeft", "Scorpion Leg LH Long v2:1"),
                NamedEntity::new("MidRight", "Scorpion Leg RH Long v2:1"),
                NamedEntity::new("BackLeft", "Scorpion Leg LH Long v2:3"),
                NamedEntity::new("BackRight", "Scorpion Leg RH Long v2:3"),
            ],
            joints: vec![
                NamedEntity::new("H", "Hor"),
                NamedEntity::new("VL", "VerLow"),
                NamedEntity::new("VH", "VerHigh"),
            ],
        }
    }
}

/// Handles and header produced by [`resolve_layout`].
pub struct ResolvedRig {
    pub actuator: Box<dyn Actuator>,
    pub sensors: Vec<SensorChannel>,
    pub header: Header,
}

/// Look up the actuator and every group × joint sensor, group-major.
///
/// Any name the rig does not know aborts resolution.
pub fn resolve_layout(
    lookup: &dyn EntityLookup,
    layout: &RigLayout,
    unit_annotation: &str,
    sink: &mut dyn DiagnosticSink,
) -> Result<ResolvedRig, RigError> {
    let actuator = lookup.actuator(&layout.actuator)?;

    sink.record("Fetching revolute joints");
    let mut header = Header::new(unit_annotation);
    let mut sensors = Vec::with_capacity(layout.groups.len() * layout.joints.len());

    for group in &layout.groups {
        sink.record(&format!("  Group = {}", group.entity));
        for joint in &layout.joints {
            let sensor = lookup.sensor(&group.entity, &joint.entity)?;
            sink.record(&format!("    Joint = {}", sensor.name()));
            header.push_sensor(&group.label, &joint.label);
            sensors.push(SensorChannel::new(
                format!("{}/{}", group.label, joint.label),
                sensor,
            ));
        }
    }

    Ok(ResolvedRig {
        actuator,
        sensors,
        header,
    })
}
