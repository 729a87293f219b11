use super::io_point::{IoActor, IoSource, UpdateRate};

/// # Association
///
/// An active routing binding from one source to one actor at one recommended
/// update rate. Owned by the engine; it lives from the reconciliation pass that
/// produced it until a later pass supersedes or tears it down.
#[derive(Debug, Clone, PartialEq)]
pub struct Association {
    /// The publishing side.
    pub source: IoSource,
    /// The consuming side.
    pub actor: IoActor,
    /// Recommended update rate shared by every actor bound to `source`.
    pub rate: UpdateRate,
}

impl Association {
    /// Bundles a source, an actor and a recommended rate.
    pub fn new(source: IoSource, actor: IoActor, rate: UpdateRate) -> Self {
        Self { source, actor, rate }
    }
}

/// Lifecycle of a single (source, actor) pair.
///
/// `Unassociated` → `Associated(rate)` → `Associated(rate')` → `Unassociated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationState {
    /// Not routed. Initial state, and the state every pair returns to on shutdown.
    Unassociated,
    /// Routed at the given recommended rate.
    Associated(UpdateRate),
}
