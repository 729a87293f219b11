//! # Rule-Based IO Router
//!
//! The coordinator of the engine. It owns the rule registry and the active
//! associations, and runs one full scan → match → resolve → reconcile pass for
//! every trigger it receives:
//!
//! - `define_rules` (rule redefinition),
//! - `on_device_advertised` (a device appeared),
//! - `on_devices_deadvertised` (devices disappeared).
//!
//! Passes are synchronous and never overlap: every entry point takes
//! `&mut self`. All state is per instance; two routers never share anything.

use crate::core::matcher;
use crate::core::ports::{
    AssociationTransport, CompatibilityCheck, DefaultUpdateRatePolicy, DeviceDirectory, IoRouterLifecycle,
    UpdateRatePolicy, ValueTypeEquality,
};
use crate::core::reconciler::{AssociationEffect, Reconciler};
use crate::core::registry::RuleRegistry;
use crate::core::resolver;
use crate::core::scanner;
use crate::model::{
    Association, AssociationRule, AssociationState, Device, IoActor, IoSource, PointId, RouterHandle, UpdateRate,
};

/// Lifecycle states of a router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    /// Constructed, `on_init` not called yet.
    Created,
    /// Registry and associations reset, waiting for `on_started`.
    Initialized,
    /// Running: every trigger evaluates the rules.
    Started,
    /// All associations torn down; topology triggers are ignored.
    Stopped,
}

/// Startup options of a router.
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Rules applied on start. An empty list means "no configured rules".
    pub rules: Vec<AssociationRule>,
    /// Devices with externally defined topics, scanned after the discovered ones.
    pub external_devices: Vec<Device>,
}

/// Summary of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Compatible candidate pairs found by the scanner.
    pub candidates: usize,
    /// Pairs selected by a rule.
    pub matched: usize,
    /// Rule conditions that failed during matching.
    pub faults: usize,
    /// Rules discarded at registration (only set by `define_rules`).
    pub rejected_rules: usize,
    /// New associations.
    pub connected: usize,
    /// Associations kept with a new rate.
    pub updated: usize,
    /// Associations torn down.
    pub disconnected: usize,
    /// Point ids that appeared more than once in the topology.
    pub duplicate_ids: Vec<PointId>,
}

impl PassReport {
    /// Total number of transport effects issued.
    pub fn effects(&self) -> usize {
        self.connected + self.updated + self.disconnected
    }
}

/// Read-only handle passed to rule conditions during matching.
struct RouterView<'a> {
    registry: &'a RuleRegistry,
    reconciler: &'a Reconciler,
    rate_policy: &'a dyn UpdateRatePolicy,
}

impl RouterHandle for RouterView<'_> {
    fn active_associations(&self) -> &[Association] {
        self.reconciler.active()
    }

    fn association_state(&self, source: &PointId, actor: &PointId) -> AssociationState {
        self.reconciler.state_of(source, actor)
    }

    fn rule_value_types(&self) -> Vec<String> {
        self.registry.value_types()
    }

    fn compute_default_update_rate(
        &self,
        source: &IoSource,
        actor: &IoActor,
        source_device: &Device,
        actor_device: &Device,
    ) -> UpdateRate {
        self.rate_policy
            .compute_default_update_rate(source, actor, source_device, actor_device)
    }
}

/// # Rule-Based IO Router
///
/// Generic over its discovery (`D`) and transport (`T`) collaborators.
/// Compatibility and rate policy default to [`ValueTypeEquality`] and
/// [`DefaultUpdateRatePolicy`].
///
/// Dropping a router that still holds associations tears them down, so no
/// association outlives its engine.
pub struct RuleBasedIoRouter<D: DeviceDirectory, T: AssociationTransport> {
    directory: D,
    transport: T,
    compatibility: Box<dyn CompatibilityCheck>,
    rate_policy: Box<dyn UpdateRatePolicy>,
    registry: RuleRegistry,
    reconciler: Reconciler,
    options: RouterOptions,
    state: RouterState,
}

impl<D: DeviceDirectory, T: AssociationTransport> RuleBasedIoRouter<D, T> {
    /// Creates a router in the `Created` state with default options.
    pub fn new(directory: D, transport: T) -> Self {
        Self {
            directory,
            transport,
            compatibility: Box::new(ValueTypeEquality),
            rate_policy: Box::new(DefaultUpdateRatePolicy),
            registry: RuleRegistry::new(),
            reconciler: Reconciler::new(),
            options: RouterOptions::default(),
            state: RouterState::Created,
        }
    }

    /// Sets the startup options (configured rules and external devices).
    pub fn with_options(mut self, options: RouterOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the compatibility predicate.
    pub fn with_compatibility(mut self, compatibility: impl CompatibilityCheck + 'static) -> Self {
        self.compatibility = Box::new(compatibility);
        self
    }

    /// Replaces the per-pair rate policy.
    pub fn with_rate_policy(mut self, rate_policy: impl UpdateRatePolicy + 'static) -> Self {
        self.rate_policy = Box::new(rate_policy);
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RouterState {
        self.state
    }

    /// Startup options.
    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    /// The discovery collaborator.
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Mutable access to the directory, e.g. to advertise a device before
    /// calling `on_device_advertised`.
    pub fn directory_mut(&mut self) -> &mut D {
        &mut self.directory
    }

    /// The routing transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the routing transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Associations committed by the last pass.
    pub fn active_associations(&self) -> &[Association] {
        self.reconciler.active()
    }

    /// State of a (source, actor) pair after the last pass.
    pub fn association_state(&self, source: &PointId, actor: &PointId) -> AssociationState {
        self.reconciler.state_of(source, actor)
    }

    /// Number of registered rules.
    pub fn rule_count(&self) -> usize {
        self.registry.len()
    }

    /// The configured per-pair rate policy. Not used by the built-in passes,
    /// which always cumulate with `combine`.
    pub fn compute_default_update_rate(
        &self,
        source: &IoSource,
        actor: &IoActor,
        source_device: &Device,
        actor_device: &Device,
    ) -> UpdateRate {
        self.rate_policy
            .compute_default_update_rate(source, actor, source_device, actor_device)
    }

    /// Replaces all rules and re-evaluates.
    ///
    /// Previously defined rules are discarded. Rules without a condition are
    /// logged and ignored. Returns `None` when the router is stopped: the
    /// registry is still rebuilt, but no pass runs.
    pub fn define_rules<I>(&mut self, rules: I) -> Option<PassReport>
    where
        I: IntoIterator<Item = AssociationRule>,
    {
        let rejected = self.registry.define(rules);
        if self.state == RouterState::Stopped {
            log::debug!("Router stopped; rules stored without evaluation");
            return None;
        }
        let mut report = self.evaluate_rules();
        report.rejected_rules = rejected.len();
        Some(report)
    }

    /// Runs one full evaluation pass against the current topology and rules.
    pub fn evaluate_rules(&mut self) -> PassReport {
        let devices = self.devices();
        let scanned = scanner::scan(&devices, self.compatibility.as_ref());

        let view = RouterView {
            registry: &self.registry,
            reconciler: &self.reconciler,
            rate_policy: self.rate_policy.as_ref(),
        };
        let matched = matcher::match_pairs(&scanned.pairs, &self.registry, &view);

        let mut report = PassReport {
            candidates: scanned.pairs.len(),
            matched: matched.matched(),
            faults: matched.faults.len(),
            duplicate_ids: scanned.duplicate_ids,
            ..PassReport::default()
        };

        let resolved = resolver::resolve(matched.pairs);
        let effects = self.reconciler.reconcile(resolved);
        self.apply(effects, &mut report);

        log::debug!(
            "Pass done: {} candidates, {} matched, {} faults -> +{} ~{} -{}",
            report.candidates,
            report.matched,
            report.faults,
            report.connected,
            report.updated,
            report.disconnected
        );
        report
    }

    /// Discovered devices followed by the configured external devices.
    fn devices(&self) -> Vec<Device> {
        let mut devices = self.directory.associated_devices();
        devices.extend(self.options.external_devices.iter().cloned());
        devices
    }

    fn apply(&mut self, effects: Vec<AssociationEffect>, report: &mut PassReport) {
        for effect in effects {
            match effect {
                AssociationEffect::Connect(a) => {
                    log::debug!("Associate {} -> {} at {:?}", a.source.id, a.actor.id, a.rate);
                    self.transport.associate(&a.source, &a.actor, a.rate);
                    report.connected += 1;
                }
                AssociationEffect::Update(a) => {
                    log::debug!("Re-associate {} -> {} at {:?}", a.source.id, a.actor.id, a.rate);
                    self.transport.associate(&a.source, &a.actor, a.rate);
                    report.updated += 1;
                }
                AssociationEffect::Disconnect { source, actor } => {
                    log::debug!("Disassociate {} -> {}", source.id, actor.id);
                    self.transport.disassociate(&source, &actor);
                    report.disconnected += 1;
                }
            }
        }
    }

    fn teardown(&mut self) -> usize {
        let effects = self.reconciler.teardown();
        let mut report = PassReport::default();
        self.apply(effects, &mut report);
        report.disconnected
    }

    fn on_topology_changed(&mut self, trigger: &str) {
        if self.state == RouterState::Stopped {
            log::debug!("Router stopped; ignoring {}", trigger);
            return;
        }
        self.evaluate_rules();
    }
}

impl<D: DeviceDirectory, T: AssociationTransport> IoRouterLifecycle for RuleBasedIoRouter<D, T> {
    fn on_init(&mut self) {
        let released = self.teardown();
        if released > 0 {
            log::warn!("Router re-initialized with {} live associations; torn down", released);
        }
        self.registry.clear();
        self.state = RouterState::Initialized;
    }

    fn on_started(&mut self) {
        self.state = RouterState::Started;
        log::info!(
            "Router started with {} configured rules and {} external devices",
            self.options.rules.len(),
            self.options.external_devices.len()
        );
        if !self.options.rules.is_empty() {
            let rules = self.options.rules.clone();
            self.define_rules(rules);
        }
    }

    fn on_stopped(&mut self) {
        let released = self.teardown();
        self.state = RouterState::Stopped;
        log::info!("Router stopped; {} associations torn down", released);
    }

    fn on_device_advertised(&mut self, device: &Device) {
        log::debug!("Device advertised: {}", device.id);
        self.on_topology_changed("device advertise");
    }

    fn on_devices_deadvertised(&mut self, devices: &[Device]) {
        log::debug!("{} devices deadvertised", devices.len());
        self.on_topology_changed("device deadvertise");
    }
}

impl<D: DeviceDirectory, T: AssociationTransport> Drop for RuleBasedIoRouter<D, T> {
    fn drop(&mut self) {
        let released = self.teardown();
        if released > 0 {
            log::warn!("Router dropped while running; {} associations torn down", released);
        }
    }
}
