//! # Core Engine Module
//!
//! This module forms the heart of the rule-based IO router. One evaluation pass
//! runs the components below strictly in order, synchronously, to completion:
//!
//! - **`scanner`**: turns the current device topology into the list of
//!   value-type compatible source/actor candidate pairs.
//!
//! - **`matcher`**: applies the ordered rule list of each pair's value type
//!   (first match wins) and records a tentative rate per matched pair.
//!
//! - **`resolver`**: folds all tentative rates of one source into a single
//!   cumulated rate, since a physical source can only publish at one rate.
//!
//! - **`reconciler`**: diffs the resolved targets against the active
//!   associations and emits the minimal connect/update/disconnect effects.
//!
//! The `router` owns the rule `registry` and the reconciler state and drives the
//! pass on every trigger. Collaborators (discovery, compatibility, transport)
//! plug in through the traits in `ports`.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Rule registry keyed by value type.
pub mod registry;
/// Compatible candidate pair enumeration.
pub mod scanner;
/// Ordered, first-match-wins rule evaluation.
pub mod matcher;
/// Rate combination and per-source cumulation.
pub mod resolver;
/// Active association bookkeeping and minimal diffing.
pub mod reconciler;
/// Collaborator traits and the lifecycle interface.
pub mod ports;
/// The engine tying everything together.
pub mod router;
/// Channel-backed transport streaming association events.
#[cfg(feature = "channels")]
pub mod dispatcher;

// --- Public API Re-exports ---
pub use matcher::{AssociationPairs, MatchOutcome, MatchedPair};
pub use reconciler::{AssociationEffect, Reconciler};
pub use registry::RuleRegistry;
pub use resolver::combine;
pub use router::{PassReport, RouterOptions, RouterState, RuleBasedIoRouter};
pub use scanner::{CandidatePair, ScanOutcome};
