//! # Collaborator Ports
//!
//! The engine only decides *which* pairs to route at *what* rate. Discovery,
//! value format compatibility, the actual routing transport and the lifecycle
//! scheduling all live outside of it and plug in through these traits.

use crate::core::resolver::combine;
use crate::model::{Device, DeviceId, IoActor, IoSource, UpdateRate};

/// Supplies the current device topology (the discovery collaborator).
pub trait DeviceDirectory {
    /// Every device currently known, in discovery order.
    fn associated_devices(&self) -> Vec<Device>;
}

/// Value type / format compatibility predicate.
pub trait CompatibilityCheck {
    /// Whether values of `source` can be consumed by `actor` at all.
    fn are_value_types_compatible(&self, source: &IoSource, actor: &IoActor) -> bool;
}

/// Compatible when both value types are identical.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueTypeEquality;

impl CompatibilityCheck for ValueTypeEquality {
    fn are_value_types_compatible(&self, source: &IoSource, actor: &IoActor) -> bool {
        source.value_type == actor.value_type
    }
}

/// Carries out association effects (the routing transport).
///
/// Both operations must be idempotent. `disassociate` is safe to call for a
/// pair that is not connected. The engine does not check whether an effect
/// succeeded before updating its own bookkeeping.
pub trait AssociationTransport {
    /// Establishes routing for a pair, or updates its recommended rate.
    fn associate(&mut self, source: &IoSource, actor: &IoActor, rate: UpdateRate);
    /// Tears down routing for a pair.
    fn disassociate(&mut self, source: &IoSource, actor: &IoActor);
}

/// Extension point for a custom per-pair rate policy.
///
/// The built-in matching and resolution always use [`combine`]; a surrounding
/// component may consult this policy when it needs its own recommendation.
pub trait UpdateRatePolicy: Send + Sync {
    /// Computes the recommended rate for one source/actor pair. Defaults to the
    /// slower of the two point rates.
    fn compute_default_update_rate(
        &self,
        source: &IoSource,
        actor: &IoActor,
        _source_device: &Device,
        _actor_device: &Device,
    ) -> UpdateRate {
        combine(source.update_rate, actor.update_rate)
    }
}

/// The stock policy: slower endpoint wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUpdateRatePolicy;

impl UpdateRatePolicy for DefaultUpdateRatePolicy {}

/// Lifecycle hooks invoked by an external controller.
///
/// The controller is responsible for serializing calls; the engine assumes
/// exclusive access for the duration of each hook.
pub trait IoRouterLifecycle {
    /// Resets the engine to an empty registry and no associations.
    fn on_init(&mut self);
    /// Applies the configured rules, if any, and runs the first pass.
    fn on_started(&mut self);
    /// Tears down every active association.
    fn on_stopped(&mut self);
    /// A device appeared (already visible through the directory).
    fn on_device_advertised(&mut self, device: &Device);
    /// Devices disappeared (already gone from the directory).
    fn on_devices_deadvertised(&mut self, devices: &[Device]);
}

/// # Static Device Directory
///
/// In-memory directory for embedders that learn about devices through their
/// own channel, and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticDeviceDirectory {
    devices: Vec<Device>,
}

impl StaticDeviceDirectory {
    /// Creates a directory seeded with `devices`.
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    /// Adds a device, replacing a known device with the same id in place.
    pub fn advertise(&mut self, device: Device) {
        match self.devices.iter_mut().find(|d| d.id == device.id) {
            Some(existing) => *existing = device,
            None => self.devices.push(device),
        }
    }

    /// Removes the devices with the given ids, returning those that were known.
    pub fn deadvertise(&mut self, ids: &[DeviceId]) -> Vec<Device> {
        let mut removed = Vec::new();
        self.devices.retain(|d| {
            if ids.contains(&d.id) {
                removed.push(d.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Number of known devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether no device is known.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl DeviceDirectory for StaticDeviceDirectory {
    fn associated_devices(&self) -> Vec<Device> {
        self.devices.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advertise_replaces_known_device() {
        let mut directory = StaticDeviceDirectory::default();
        directory.advertise(Device::new("d1", "old"));
        directory.advertise(Device::new("d2", "other"));
        directory.advertise(Device::new("d1", "new"));

        let devices = directory.associated_devices();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "new");
    }

    #[test]
    fn test_deadvertise_returns_removed_devices() {
        let mut directory = StaticDeviceDirectory::new(vec![Device::new("d1", ""), Device::new("d2", "")]);
        let removed = directory.deadvertise(&[DeviceId::from("d2"), DeviceId::from("d9")]);

        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id.as_str(), "d2");
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_default_rate_policy_prefers_slower_endpoint() {
        let source = IoSource::new("s", "Temperature").with_update_rate(1000);
        let actor = IoActor::new("a", "Temperature").with_update_rate(500);
        let device = Device::new("d", "");

        let rate = DefaultUpdateRatePolicy.compute_default_update_rate(&source, &actor, &device, &device);
        assert_eq!(rate, Some(1000));
    }
}
