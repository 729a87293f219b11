//! # lib_router
//!
//! Rule-based routing of typed values from IO sources to IO actors that live on
//! dynamically appearing and disappearing devices.
//!
//! Every trigger (rule redefinition, device advertised, devices deadvertised)
//! runs one synchronous evaluation pass:
//!
//! 1. **Scan** the device topology for value-type compatible source/actor pairs.
//! 2. **Match** each pair against the ordered rule list of its value type.
//! 3. **Resolve** a single recommended update rate per source.
//! 4. **Reconcile** the result with the active associations, issuing only the
//!    connect/update/disconnect effects that are actually needed.
//!
//! Optional modules are gated behind cargo features (`configs`, `loggers`,
//! `channels`, or `full` for all of them).

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Error type shared by the engine and its configuration layer.
pub mod errors;
/// Data shapes: IO points, devices, rules and associations.
pub mod model;
/// The association engine and its collaborator ports.
pub mod core;

/// File-backed router options (rules, external devices, static topology).
#[cfg(feature = "configs")]
pub mod configs;
/// Log output setup for router processes.
#[cfg(feature = "loggers")]
pub mod loggers;

#[cfg(test)]
pub(crate) mod testing;

// Re-export everything an embedder needs to wire up a router.
pub use crate::core::ports::{
    AssociationTransport, CompatibilityCheck, DefaultUpdateRatePolicy, DeviceDirectory,
    IoRouterLifecycle, StaticDeviceDirectory, UpdateRatePolicy, ValueTypeEquality,
};
#[cfg(feature = "channels")]
pub use crate::core::dispatcher::{AssociationEvent, ChannelTransport};
pub use crate::core::resolver::combine;
pub use crate::core::router::{PassReport, RouterOptions, RouterState, RuleBasedIoRouter};
pub use errors::RouterError;
pub use model::*;
