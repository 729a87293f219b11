//! # Reconciler
//!
//! Owns the authoritative list of active associations and turns a freshly
//! resolved target set into the smallest list of effects that brings the
//! routing in line with it. Pairs whose rate did not change are carried over
//! silently, so re-running a pass on an unchanged world costs nothing.

use crate::core::matcher::AssociationPairs;
use crate::model::{Association, AssociationState, IoActor, IoSource, PointId};

/// A side effect the transport has to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum AssociationEffect {
    /// Start routing a new pair.
    Connect(Association),
    /// Keep routing an existing pair, republishing a new recommended rate.
    Update(Association),
    /// Stop routing a pair.
    Disconnect {
        /// Source of the torn down pair.
        source: IoSource,
        /// Actor of the torn down pair.
        actor: IoActor,
    },
}

/// Active association bookkeeping.
#[derive(Debug, Default)]
pub struct Reconciler {
    active: Vec<Association>,
}

impl Reconciler {
    /// Creates a reconciler with no active associations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associations committed by the last pass.
    pub fn active(&self) -> &[Association] {
        &self.active
    }

    /// Current state of a (source, actor) pair.
    pub fn state_of(&self, source: &PointId, actor: &PointId) -> AssociationState {
        self.active
            .iter()
            .find(|a| &a.source.id == source && &a.actor.id == actor)
            .map_or(AssociationState::Unassociated, |a| AssociationState::Associated(a.rate))
    }

    /// Diffs `resolved` against the active set, commits it and returns the
    /// effects needed to get there.
    ///
    /// Previously active pairs come first, in their existing order: dropped
    /// pairs yield `Disconnect`, rate changes yield `Update`, unchanged pairs
    /// yield nothing. Whatever remains in `resolved` afterwards is new and
    /// yields `Connect`.
    pub fn reconcile(&mut self, mut resolved: AssociationPairs) -> Vec<AssociationEffect> {
        let mut effects = Vec::new();
        let mut next = Vec::with_capacity(self.active.len());

        for current in self.active.drain(..) {
            let target = resolved
                .get_mut(&current.source.id)
                .and_then(|actors| actors.remove(&current.actor.id));

            match target {
                None => effects.push(AssociationEffect::Disconnect {
                    source: current.source,
                    actor: current.actor,
                }),
                Some(matched) => {
                    let association = Association::new(matched.source, matched.actor, matched.rate);
                    if association.rate != current.rate {
                        effects.push(AssociationEffect::Update(association.clone()));
                    }
                    next.push(association);
                }
            }
        }

        for actors in resolved.into_values() {
            for matched in actors.into_values() {
                let association = Association::new(matched.source, matched.actor, matched.rate);
                effects.push(AssociationEffect::Connect(association.clone()));
                next.push(association);
            }
        }

        self.active = next;
        effects
    }

    /// Tears down every active association and clears the active set.
    pub fn teardown(&mut self) -> Vec<AssociationEffect> {
        self.active
            .drain(..)
            .map(|a| AssociationEffect::Disconnect {
                source: a.source,
                actor: a.actor,
            })
            .collect()
    }
}
