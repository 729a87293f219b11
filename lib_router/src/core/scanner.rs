//! # Compatibility Scanner
//!
//! Partitions every IO point of every device into sources and actors keyed by
//! point id, then forms the cross product filtered by the compatibility
//! predicate. Cost grows with sources × actors, which is fine at edge/IoT scale.

use std::collections::BTreeMap;

use crate::core::ports::CompatibilityCheck;
use crate::model::{Device, IoActor, IoCapability, IoSource, PointId};

/// A value-type compatible source/actor pair together with their devices.
#[derive(Debug, Clone, Copy)]
pub struct CandidatePair<'a> {
    /// The candidate source.
    pub source: &'a IoSource,
    /// Device owning the source.
    pub source_device: &'a Device,
    /// The candidate actor.
    pub actor: &'a IoActor,
    /// Device owning the actor.
    pub actor_device: &'a Device,
}

/// Result of one scan.
#[derive(Debug, Default)]
pub struct ScanOutcome<'a> {
    /// Compatible pairs, ordered by source id then actor id.
    pub pairs: Vec<CandidatePair<'a>>,
    /// Point ids seen more than once; the last occurrence was kept.
    pub duplicate_ids: Vec<PointId>,
}

/// Enumerates the compatible candidate pairs of a topology.
pub fn scan<'a>(devices: &'a [Device], compatibility: &dyn CompatibilityCheck) -> ScanOutcome<'a> {
    let mut sources: BTreeMap<&'a PointId, (&'a IoSource, &'a Device)> = BTreeMap::new();
    let mut actors: BTreeMap<&'a PointId, (&'a IoActor, &'a Device)> = BTreeMap::new();
    let mut duplicate_ids = Vec::new();

    for device in devices {
        for cap in &device.io_capabilities {
            let replaced = match cap {
                IoCapability::Source(source) => {
                    sources.insert(&source.id, (source, device)).map(|(old, _)| &old.id)
                }
                IoCapability::Actor(actor) => {
                    actors.insert(&actor.id, (actor, device)).map(|(old, _)| &old.id)
                }
            };
            if let Some(id) = replaced {
                log::warn!(
                    "Duplicate IO point id '{}' (now on device '{}'); keeping the last one",
                    id,
                    device.id
                );
                duplicate_ids.push(id.clone());
            }
        }
    }

    let mut pairs = Vec::new();
    for &(source, source_device) in sources.values() {
        for &(actor, actor_device) in actors.values() {
            if compatibility.are_value_types_compatible(source, actor) {
                pairs.push(CandidatePair {
                    source,
                    source_device,
                    actor,
                    actor_device,
                });
            }
        }
    }

    log::debug!(
        "Scanned {} devices: {} sources, {} actors, {} compatible pairs",
        devices.len(),
        sources.len(),
        actors.len(),
        pairs.len()
    );

    ScanOutcome { pairs, duplicate_ids }
}
