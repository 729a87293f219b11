//! # Rate Resolver
//!
//! A physical source publishes at exactly one rate, so every actor bound to it
//! has to observe the same recommendation. The resolver folds the tentative
//! rates of all matches of a source into one cumulated rate.

use crate::core::matcher::AssociationPairs;
use crate::model::UpdateRate;

/// Combines two update rates into one that satisfies both.
///
/// Rates are intervals, so the larger value (the slower rate) wins; the router
/// never recommends a rate faster than either side asked for. An unspecified
/// rate defers to the other one.
pub fn combine(a: UpdateRate, b: UpdateRate) -> UpdateRate {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (Some(rate), None) | (None, Some(rate)) => Some(rate),
        (None, None) => None,
    }
}

/// Replaces every tentative rate with the cumulated rate of its source.
pub fn resolve(mut pairs: AssociationPairs) -> AssociationPairs {
    for actors in pairs.values_mut() {
        let cumulated = actors.values().fold(None, |acc, matched| combine(matched.rate, acc));
        for matched in actors.values_mut() {
            matched.rate = cumulated;
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matcher::MatchedPair;
    use crate::model::{IoActor, IoSource, PointId};
    use std::collections::BTreeMap;

    #[test]
    fn test_combine() {
        assert_eq!(combine(Some(5), Some(10)), Some(10));
        assert_eq!(combine(Some(10), Some(5)), Some(10));
        assert_eq!(combine(None, Some(7)), Some(7));
        assert_eq!(combine(Some(7), None), Some(7));
        assert_eq!(combine(None, None), None);
    }

    fn matched(source: &IoSource, actor: &IoActor) -> MatchedPair {
        MatchedPair {
            source: source.clone(),
            actor: actor.clone(),
            rate: combine(source.update_rate, actor.update_rate),
        }
    }

    #[test]
    fn test_fan_out_cumulates_to_slowest_rate() {
        let source = IoSource::new("s", "Temperature").with_update_rate(20);
        let a1 = IoActor::new("a1", "Temperature").with_update_rate(50);
        let a2 = IoActor::new("a2", "Temperature").with_update_rate(10);

        let mut actors = BTreeMap::new();
        actors.insert(a1.id.clone(), matched(&source, &a1));
        actors.insert(a2.id.clone(), matched(&source, &a2));
        let mut pairs = AssociationPairs::new();
        pairs.insert(source.id.clone(), actors);

        let resolved = resolve(pairs);
        let actors = &resolved[&PointId::from("s")];
        assert_eq!(actors[&PointId::from("a1")].rate, Some(50));
        assert_eq!(actors[&PointId::from("a2")].rate, Some(50));
    }

    #[test]
    fn test_unlimited_everywhere_stays_unlimited() {
        let source = IoSource::new("s", "Temperature");
        let a1 = IoActor::new("a1", "Temperature");

        let mut actors = BTreeMap::new();
        actors.insert(a1.id.clone(), matched(&source, &a1));
        let mut pairs = AssociationPairs::new();
        pairs.insert(source.id.clone(), actors);

        let resolved = resolve(pairs);
        assert_eq!(resolved[&PointId::from("s")][&PointId::from("a1")].rate, None);
    }
}
