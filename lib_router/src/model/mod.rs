//! # Point & Rule Model
//!
//! Plain data shapes the engine operates on. Devices and their IO points are
//! supplied by the discovery collaborator; rules by the embedder; associations
//! are produced by the engine itself.

/// Active source/actor bindings and the per-pair state machine.
pub mod association;
/// Devices owning ordered collections of IO points.
pub mod device;
/// IO sources, IO actors and their shared capability trait.
pub mod io_point;
/// Association rules, rule conditions and the read-only router handle.
pub mod rule;

pub use association::{Association, AssociationState};
pub use device::{Device, DeviceId};
pub use io_point::{BackpressureStrategy, IoActor, IoCapability, IoPoint, IoSource, PointId, UpdateRate};
pub use rule::{condition_fn, AssociationRule, RouterHandle, RuleCondition, GLOBAL_VALUE_TYPE};
