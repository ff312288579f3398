use std::fmt;

use thiserror::Error;

/// What kind of entity a failed lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Actuator,
    Group,
    Joint,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Actuator => "actuator",
            EntityKind::Group => "group",
            EntityKind::Joint => "joint",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RigError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: EntityKind, name: String },
    #[error("failed to read {sensor}: {reason}")]
    Read { sensor: String, reason: String },
    #[error("failed to move {actuator} to {target}: {reason}")]
    Actuate {
        actuator: String,
        target: f64,
        reason: String,
    },
}

impl RigError {
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message() {
        let err = RigError::not_found(EntityKind::Joint, "VerLow");
        assert_eq!(err.to_string(), "joint not found: VerLow");
    }

    #[test]
    fn actuate_message() {
        let err = RigError::Actuate {
            actuator: "Slider184".to_string(),
            target: 1.5,
            reason: "limit reached".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to move Slider184 to 1.5: limit reached"
        );
    }
}
