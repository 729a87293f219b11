//! # Rule Matcher
//!
//! Decides, pair by pair, which compatible candidates should be associated.
//!
//! For each pair the rule list of the source's value type is selected (falling
//! back to the global list only when the value type has no list at all). Rules
//! are evaluated in registration order and the first condition returning `true`
//! wins; later rules of that list are never invoked for the pair. A condition
//! that fails, by returning an error or by panicking, counts as "no match" for
//! that rule only.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use crate::core::registry::RuleRegistry;
use crate::core::resolver::combine;
use crate::core::scanner::CandidatePair;
use crate::errors::RouterError;
use crate::model::{AssociationRule, IoActor, IoSource, PointId, RouterHandle, UpdateRate};

/// A pair selected by a rule, with its tentative (later: cumulated) rate.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedPair {
    /// The matched source.
    pub source: IoSource,
    /// The matched actor.
    pub actor: IoActor,
    /// Tentative rate after matching, cumulated rate after resolving.
    pub rate: UpdateRate,
}

/// Matched pairs keyed by source id, then actor id.
pub type AssociationPairs = BTreeMap<PointId, BTreeMap<PointId, MatchedPair>>;

/// Result of matching one batch of candidates.
#[derive(Debug, Default)]
pub struct MatchOutcome {
    /// The pairs that should be associated.
    pub pairs: AssociationPairs,
    /// Condition faults contained during evaluation.
    pub faults: Vec<RouterError>,
}

impl MatchOutcome {
    /// Number of matched (source, actor) pairs.
    pub fn matched(&self) -> usize {
        self.pairs.values().map(BTreeMap::len).sum()
    }
}

/// Runs every candidate pair through its governing rule list.
pub fn match_pairs(
    candidates: &[CandidatePair<'_>],
    registry: &RuleRegistry,
    router: &dyn RouterHandle,
) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();

    for pair in candidates {
        let Some(rules) = registry.rules_for(&pair.source.value_type) else {
            continue;
        };

        for rule in rules {
            match evaluate_rule(rule, pair, router) {
                Ok(true) => {
                    outcome
                        .pairs
                        .entry(pair.source.id.clone())
                        .or_default()
                        .insert(
                            pair.actor.id.clone(),
                            MatchedPair {
                                source: pair.source.clone(),
                                actor: pair.actor.clone(),
                                rate: combine(pair.source.update_rate, pair.actor.update_rate),
                            },
                        );
                    break;
                }
                Ok(false) => {}
                Err(fault) => {
                    log::warn!("{}", fault);
                    outcome.faults.push(fault);
                }
            }
        }
    }

    outcome
}

fn evaluate_rule(
    rule: &AssociationRule,
    pair: &CandidatePair<'_>,
    router: &dyn RouterHandle,
) -> Result<bool, RouterError> {
    // Rules without a condition never reach the registry.
    let Some(condition) = rule.condition.as_ref() else {
        return Ok(false);
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        condition.evaluate(pair.source, pair.source_device, pair.actor, pair.actor_device, router)
    }));

    match result {
        Ok(Ok(is_match)) => Ok(is_match),
        Ok(Err(e)) => Err(RouterError::RuleConditionFault {
            rule: rule.name.clone(),
            reason: format!("{:#}", e),
        }),
        Err(payload) => Err(RouterError::RuleConditionFault {
            rule: rule.name.clone(),
            reason: format!("panicked: {}", panic_message(payload.as_ref())),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ports::ValueTypeEquality;
    use crate::core::scanner::scan;
    use crate::model::Device;
    use crate::testing::{always, never, EmptyHandle};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn devices() -> Vec<Device> {
        vec![
            Device::new("d1", "Sensor")
                .with_source(IoSource::new("s1", "Temperature").with_update_rate(20))
                .with_source(IoSource::new("s2", "Temperature")),
            Device::new("d2", "Display")
                .with_actor(IoActor::new("a1", "Temperature").with_update_rate(50))
                .with_actor(IoActor::new("a2", "Temperature").with_update_rate(10)),
        ]
    }

    fn run(registry: &RuleRegistry, devices: &[Device]) -> MatchOutcome {
        let scanned = scan(devices, &ValueTypeEquality);
        match_pairs(&scanned.pairs, registry, &EmptyHandle)
    }

    #[test]
    fn test_tentative_rate_is_slower_of_both_endpoints() {
        let mut registry = RuleRegistry::new();
        registry.define(vec![always("all", "Temperature")]);
        let outcome = run(&registry, &devices());

        let s1 = &outcome.pairs[&PointId::from("s1")];
        assert_eq!(s1[&PointId::from("a1")].rate, Some(50));
        assert_eq!(s1[&PointId::from("a2")].rate, Some(20));
        let s2 = &outcome.pairs[&PointId::from("s2")];
        assert_eq!(s2[&PointId::from("a2")].rate, Some(10));
        assert_eq!(outcome.matched(), 4);
    }

    #[test]
    fn test_specific_rule_governs_over_global_rule() {
        let mut registry = RuleRegistry::new();
        registry.define(vec![always("global", ""), never("deny-temperature", "Temperature")]);
        let outcome = run(&registry, &devices());

        assert!(outcome.pairs.is_empty());
    }

    #[test]
    fn test_global_rule_applies_without_specific_list() {
        let mut registry = RuleRegistry::new();
        registry.define(vec![always("global", ""), never("humidity", "Humidity")]);
        let outcome = run(&registry, &devices());

        assert_eq!(outcome.matched(), 4);
    }

    #[test]
    fn test_first_match_wins() {
        let second_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&second_calls);

        let mut registry = RuleRegistry::new();
        registry.define(vec![
            always("first", "Temperature"),
            AssociationRule::new("second", "Temperature", move |_, _, _, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }),
        ]);
        let outcome = run(&registry, &devices());

        assert_eq!(outcome.matched(), 4);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_later_rule_evaluated_when_earlier_is_false() {
        let mut registry = RuleRegistry::new();
        registry.define(vec![
            never("first", "Temperature"),
            AssociationRule::new("only-a1", "Temperature", |_, _, actor, _, _| {
                Ok(actor.id.as_str() == "a1")
            }),
        ]);
        let outcome = run(&registry, &devices());

        assert_eq!(outcome.matched(), 2);
        for actors in outcome.pairs.values() {
            assert!(actors.contains_key(&PointId::from("a1")));
            assert!(!actors.contains_key(&PointId::from("a2")));
        }
    }

    #[test]
    fn test_fault_is_isolated_to_the_rule_and_pair() {
        let mut registry = RuleRegistry::new();
        registry.define(vec![
            AssociationRule::new("flaky", "Temperature", |source, _, _, _, _| {
                if source.id.as_str() == "s1" {
                    anyhow::bail!("sensor lookup failed");
                }
                Ok(false)
            }),
            always("fallback", "Temperature"),
        ]);
        let outcome = run(&registry, &devices());

        // The faulting rule is skipped, the next rule still decides for s1.
        assert_eq!(outcome.matched(), 4);
        assert_eq!(outcome.faults.len(), 2);
        assert!(matches!(
            &outcome.faults[0],
            RouterError::RuleConditionFault { rule, reason } if rule == "flaky" && reason.contains("sensor lookup failed")
        ));
    }

    #[test]
    fn test_panicking_condition_is_contained() {
        let mut registry = RuleRegistry::new();
        registry.define(vec![AssociationRule::new("boom", "Temperature", |_, _, actor, _, _| {
            if actor.id.as_str() == "a2" {
                panic!("condition exploded");
            }
            Ok(true)
        })]);
        let outcome = run(&registry, &devices());

        assert_eq!(outcome.matched(), 2);
        assert_eq!(outcome.faults.len(), 2);
        assert!(matches!(
            &outcome.faults[0],
            RouterError::RuleConditionFault { reason, .. } if reason.contains("condition exploded")
        ));
    }
}
