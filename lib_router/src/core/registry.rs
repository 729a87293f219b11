//! # Rule Registry
//!
//! Rules grouped by value type, each group kept in registration order.
//! The registry is rebuilt wholesale on every definition; there is no
//! incremental add or remove.
use std::collections::HashMap;

use crate::errors::RouterError;
use crate::model::rule::{AssociationRule, GLOBAL_VALUE_TYPE};

/// Registered rules keyed by value type.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, Vec<AssociationRule>>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every registered rule with `rules`.
    ///
    /// Rules without a condition are logged and dropped; the remaining rules
    /// are still registered. The rejections are returned for reporting.
    pub fn define<I>(&mut self, rules: I) -> Vec<RouterError>
    where
        I: IntoIterator<Item = AssociationRule>,
    {
        self.rules.clear();
        let mut rejected = Vec::new();

        for rule in rules {
            if rule.condition.is_none() {
                let err = RouterError::InvalidRule { name: rule.name.clone() };
                log::warn!("{}", err);
                rejected.push(err);
                continue;
            }
            self.rules.entry(rule.value_type.clone()).or_default().push(rule);
        }

        log::debug!(
            "Rule registry rebuilt: {} rules across {} value types ({} rejected)",
            self.len(),
            self.rules.len(),
            rejected.len()
        );
        rejected
    }

    /// Drops every rule.
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// The rule list governing `value_type`.
    ///
    /// The specific list wins whenever one exists; the global list is only
    /// consulted for value types without rules of their own.
    pub fn rules_for(&self, value_type: &str) -> Option<&[AssociationRule]> {
        self.rules
            .get(value_type)
            .or_else(|| self.rules.get(GLOBAL_VALUE_TYPE))
            .map(Vec::as_slice)
    }

    /// Value types that have rules, sorted; `""` stands for the global list.
    pub fn value_types(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.rules.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Total number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Whether no rule is registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::always;

    fn names(rules: Option<&[AssociationRule]>) -> Vec<&str> {
        rules
            .unwrap_or_default()
            .iter()
            .map(|r| r.name.as_str())
            .collect()
    }

    #[test]
    fn test_specific_list_shadows_global_list() {
        let mut registry = RuleRegistry::new();
        registry.define(vec![
            always("G1", ""),
            always("T1", "Temperature"),
            always("T2", "Temperature"),
        ]);

        assert_eq!(names(registry.rules_for("Temperature")), vec!["T1", "T2"]);
        assert_eq!(names(registry.rules_for("Humidity")), vec!["G1"]);
    }

    #[test]
    fn test_no_rules_for_unknown_type_without_global() {
        let mut registry = RuleRegistry::new();
        registry.define(vec![always("T1", "Temperature")]);
        assert!(registry.rules_for("Humidity").is_none());
    }

    #[test]
    fn test_rule_without_condition_is_rejected_others_kept() {
        let mut registry = RuleRegistry::new();
        let rejected = registry.define(vec![
            AssociationRule::without_condition("broken", "Temperature"),
            always("T1", "Temperature"),
        ]);

        assert_eq!(rejected.len(), 1);
        assert!(matches!(&rejected[0], RouterError::InvalidRule { name } if name == "broken"));
        assert_eq!(names(registry.rules_for("Temperature")), vec!["T1"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_define_replaces_previous_rules() {
        let mut registry = RuleRegistry::new();
        registry.define(vec![always("T1", "Temperature"), always("G1", "")]);
        registry.define(vec![always("H1", "Humidity")]);

        assert!(registry.rules_for("Temperature").is_none());
        assert_eq!(registry.value_types(), vec!["Humidity".to_string()]);
    }
}
