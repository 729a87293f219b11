use serde::{Deserialize, Serialize};
use std::fmt;

use super::io_point::{IoActor, IoCapability, IoPoint, IoSource};
use crate::errors::RouterError;

/// Stable unique identifier of a device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Wraps any string-like value as a device id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// # Device
///
/// An external entity owning an ordered list of IO points. Its existence and
/// point list come entirely from the discovery collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Stable unique id.
    pub id: DeviceId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// IO points in declaration order.
    #[serde(default)]
    pub io_capabilities: Vec<IoCapability>,
}

impl Device {
    /// Creates a device without IO points.
    pub fn new(id: impl Into<DeviceId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            io_capabilities: Vec::new(),
        }
    }

    /// Appends an IO source.
    pub fn with_source(mut self, source: IoSource) -> Self {
        self.io_capabilities.push(source.into());
        self
    }

    /// Appends an IO actor.
    pub fn with_actor(mut self, actor: IoActor) -> Self {
        self.io_capabilities.push(actor.into());
        self
    }

    /// IO sources in declaration order.
    pub fn sources(&self) -> impl Iterator<Item = &IoSource> + '_ {
        self.io_capabilities.iter().filter_map(|cap| match cap {
            IoCapability::Source(source) => Some(source),
            IoCapability::Actor(_) => None,
        })
    }

    /// IO actors in declaration order.
    pub fn actors(&self) -> impl Iterator<Item = &IoActor> + '_ {
        self.io_capabilities.iter().filter_map(|cap| match cap {
            IoCapability::Actor(actor) => Some(actor),
            IoCapability::Source(_) => None,
        })
    }

    /// Checks the model invariants of every IO point (non-empty value type).
    pub fn validate(&self) -> Result<(), RouterError> {
        for cap in &self.io_capabilities {
            let point = cap.as_point();
            if point.value_type().trim().is_empty() {
                return Err(RouterError::InvalidPoint {
                    point: point.id().to_string(),
                    device: self.id.to_string(),
                    reason: "value type must be a non-empty string".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_and_actors_keep_declaration_order() {
        let device = Device::new("d1", "Panel")
            .with_source(IoSource::new("s1", "Temperature"))
            .with_actor(IoActor::new("a1", "Temperature"))
            .with_source(IoSource::new("s2", "Humidity"));

        let sources: Vec<_> = device.sources().map(|s| s.id.as_str()).collect();
        let actors: Vec<_> = device.actors().map(|a| a.id.as_str()).collect();
        assert_eq!(sources, vec!["s1", "s2"]);
        assert_eq!(actors, vec!["a1"]);
    }

    #[test]
    fn test_validate_rejects_empty_value_type() {
        let device = Device::new("d1", "Panel").with_actor(IoActor::new("a1", " "));
        match device.validate() {
            Err(RouterError::InvalidPoint { point, device, .. }) => {
                assert_eq!(point, "a1");
                assert_eq!(device, "d1");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
