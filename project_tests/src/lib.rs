//! # Shared Test Fixtures
//!
//! Topologies, rule builders and a recording transport used by the
//! integration tests under `tests/`.

use std::sync::{Arc, Mutex};

use lib_router::{
    AssociationRule, AssociationTransport, Device, IoActor, IoRouterLifecycle, IoSource, RuleBasedIoRouter,
    StaticDeviceDirectory, UpdateRate,
};

/// One transport call, with point ids flattened to strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Connect(String, String, UpdateRate),
    Disconnect(String, String),
}

/// Records every call. Clones share one log, so a test can keep a handle
/// while the router owns the transport.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    log: Arc<Mutex<Vec<Effect>>>,
}

impl RecordingTransport {
    /// Drains the recorded effects.
    pub fn take(&self) -> Vec<Effect> {
        std::mem::take(&mut *self.log.lock().unwrap())
    }

    /// Number of effects recorded since the last `take`.
    pub fn pending(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

impl AssociationTransport for RecordingTransport {
    fn associate(&mut self, source: &IoSource, actor: &IoActor, rate: UpdateRate) {
        self.log
            .lock()
            .unwrap()
            .push(Effect::Connect(source.id.to_string(), actor.id.to_string(), rate));
    }

    fn disassociate(&mut self, source: &IoSource, actor: &IoActor) {
        self.log
            .lock()
            .unwrap()
            .push(Effect::Disconnect(source.id.to_string(), actor.id.to_string()));
    }
}

pub type TestRouter = RuleBasedIoRouter<StaticDeviceDirectory, RecordingTransport>;

/// A started router over `devices`, plus a handle on its transport log.
pub fn started_router(devices: Vec<Device>) -> (TestRouter, RecordingTransport) {
    let transport = RecordingTransport::default();
    let mut router = RuleBasedIoRouter::new(StaticDeviceDirectory::new(devices), transport.clone());
    router.on_init();
    router.on_started();
    (router, transport)
}

pub fn always(name: &str, value_type: &str) -> AssociationRule {
    AssociationRule::new(name, value_type, |_, _, _, _, _| Ok(true))
}

pub fn never(name: &str, value_type: &str) -> AssociationRule {
    AssociationRule::new(name, value_type, |_, _, _, _, _| Ok(false))
}

pub fn connect(source: &str, actor: &str, rate: UpdateRate) -> Effect {
    Effect::Connect(source.to_string(), actor.to_string(), rate)
}

pub fn disconnect(source: &str, actor: &str) -> Effect {
    Effect::Disconnect(source.to_string(), actor.to_string())
}

/// Sensor device exposing a single Temperature source.
pub fn sensor(id: &str, source: &str, rate: Option<u64>) -> Device {
    let mut point = IoSource::new(source, "Temperature");
    if let Some(rate) = rate {
        point = point.with_update_rate(rate);
    }
    Device::new(id, format!("Sensor {}", id)).with_source(point)
}

/// Display device exposing a single Temperature actor.
pub fn display(id: &str, actor: &str, rate: Option<u64>) -> Device {
    let mut point = IoActor::new(actor, "Temperature");
    if let Some(rate) = rate {
        point = point.with_update_rate(rate);
    }
    Device::new(id, format!("Display {}", id)).with_actor(point)
}

/// A small plant: two temperature sensors, two displays and a humidity pair.
pub fn plant() -> Vec<Device> {
    vec![
        sensor("sensor-1", "t1", Some(20)),
        sensor("sensor-2", "t2", None),
        display("display-1", "d1", Some(50)),
        display("display-2", "d2", Some(10)),
        Device::new("climate", "Climate unit")
            .with_source(IoSource::new("h1", "Humidity").with_update_rate(2000))
            .with_actor(IoActor::new("h-in", "Humidity")),
    ]
}
