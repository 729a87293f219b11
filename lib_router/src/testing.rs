//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};

use crate::core::ports::AssociationTransport;
use crate::core::resolver::combine;
use crate::model::{
    Association, AssociationRule, AssociationState, Device, IoActor, IoSource, PointId, RouterHandle, UpdateRate,
};

pub(crate) fn always(name: &str, value_type: &str) -> AssociationRule {
    AssociationRule::new(name, value_type, |_, _, _, _, _| Ok(true))
}

pub(crate) fn never(name: &str, value_type: &str) -> AssociationRule {
    AssociationRule::new(name, value_type, |_, _, _, _, _| Ok(false))
}

/// A router view with nothing associated and no rules.
pub(crate) struct EmptyHandle;

impl RouterHandle for EmptyHandle {
    fn active_associations(&self) -> &[Association] {
        &[]
    }

    fn association_state(&self, _: &PointId, _: &PointId) -> AssociationState {
        AssociationState::Unassociated
    }

    fn rule_value_types(&self) -> Vec<String> {
        Vec::new()
    }

    fn compute_default_update_rate(&self, source: &IoSource, actor: &IoActor, _: &Device, _: &Device) -> UpdateRate {
        combine(source.update_rate, actor.update_rate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Recorded {
    Associate(String, String, UpdateRate),
    Disassociate(String, String),
}

/// Transport that records every call; clones share the same log.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingTransport {
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl RecordingTransport {
    /// Drains the recorded calls.
    pub(crate) fn take(&self) -> Vec<Recorded> {
        std::mem::take(&mut *self.log.lock().unwrap())
    }
}

impl AssociationTransport for RecordingTransport {
    fn associate(&mut self, source: &IoSource, actor: &IoActor, rate: UpdateRate) {
        self.log.lock().unwrap().push(Recorded::Associate(
            source.id.to_string(),
            actor.id.to_string(),
            rate,
        ));
    }

    fn disassociate(&mut self, source: &IoSource, actor: &IoActor) {
        self.log
            .lock()
            .unwrap()
            .push(Recorded::Disassociate(source.id.to_string(), actor.id.to_string()));
    }
}

/// A thermometer feeding a display, and a hygrometer next to an HVAC unit.
pub(crate) fn temperature_world() -> Vec<Device> {
    vec![
        Device::new("thermometer", "Thermometer")
            .with_source(IoSource::new("temp-source", "Temperature").with_update_rate(1000)),
        Device::new("display", "Display")
            .with_actor(IoActor::new("temp-actor", "Temperature").with_update_rate(500)),
        Device::new("hygrometer", "Hygrometer").with_source(IoSource::new("hum-source", "Humidity")),
        Device::new("hvac", "HVAC").with_actor(IoActor::new("hum-actor", "Humidity")),
    ]
}
