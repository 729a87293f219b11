//! # Association Rules
//!
//! A rule decides whether a value-type compatible source/actor pair should be
//! associated. Rules are grouped by value type; a rule with an empty value type
//! is global and only consulted for value types that have no rules of their own.

use std::fmt;
use std::sync::Arc;

use super::association::{Association, AssociationState};
use super::device::Device;
use super::io_point::{IoActor, IoSource, PointId, UpdateRate};

/// Value type key under which global rules are registered.
pub const GLOBAL_VALUE_TYPE: &str = "";

/// Narrow, read-only view of the router handed to rule conditions.
pub trait RouterHandle {
    /// Associations committed by the previous pass.
    fn active_associations(&self) -> &[Association];

    /// Whether the pair was associated after the previous pass.
    fn is_associated(&self, source: &PointId, actor: &PointId) -> bool {
        matches!(self.association_state(source, actor), AssociationState::Associated(_))
    }

    /// State of the pair after the previous pass.
    fn association_state(&self, source: &PointId, actor: &PointId) -> AssociationState;

    /// Value types that currently have rules (`""` for global rules).
    fn rule_value_types(&self) -> Vec<String>;

    /// The router's configured per-pair rate policy.
    fn compute_default_update_rate(
        &self,
        source: &IoSource,
        actor: &IoActor,
        source_device: &Device,
        actor_device: &Device,
    ) -> UpdateRate;
}

/// Predicate deciding whether a compatible pair should be associated.
///
/// An `Err` is contained by the engine: it is logged and the rule counts as
/// not matching for that pair only.
pub trait RuleCondition: Send + Sync {
    /// Evaluates the condition for one candidate pair.
    fn evaluate(
        &self,
        source: &IoSource,
        source_device: &Device,
        actor: &IoActor,
        actor_device: &Device,
        router: &dyn RouterHandle,
    ) -> anyhow::Result<bool>;
}

struct FnCondition<F>(F);

impl<F> RuleCondition for FnCondition<F>
where
    F: Fn(&IoSource, &Device, &IoActor, &Device, &dyn RouterHandle) -> anyhow::Result<bool> + Send + Sync,
{
    fn evaluate(
        &self,
        source: &IoSource,
        source_device: &Device,
        actor: &IoActor,
        actor_device: &Device,
        router: &dyn RouterHandle,
    ) -> anyhow::Result<bool> {
        (self.0)(source, source_device, actor, actor_device, router)
    }
}

/// Wraps a closure as a shareable rule condition.
pub fn condition_fn<F>(condition: F) -> Arc<dyn RuleCondition>
where
    F: Fn(&IoSource, &Device, &IoActor, &Device, &dyn RouterHandle) -> anyhow::Result<bool>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnCondition(condition))
}

/// # Association Rule
#[derive(Clone)]
pub struct AssociationRule {
    /// Display name, used for diagnostics only.
    pub name: String,
    /// Value type the rule applies to; empty for a global rule.
    pub value_type: String,
    /// The predicate. Rules without one are rejected at registration.
    pub condition: Option<Arc<dyn RuleCondition>>,
}

impl AssociationRule {
    /// Creates a rule from a closure.
    pub fn new<F>(name: impl Into<String>, value_type: impl Into<String>, condition: F) -> Self
    where
        F: Fn(&IoSource, &Device, &IoActor, &Device, &dyn RouterHandle) -> anyhow::Result<bool>
            + Send
            + Sync
            + 'static,
    {
        Self::with_condition(name, value_type, condition_fn(condition))
    }

    /// Creates a rule from an existing condition object.
    pub fn with_condition(
        name: impl Into<String>,
        value_type: impl Into<String>,
        condition: Arc<dyn RuleCondition>,
    ) -> Self {
        Self {
            name: name.into(),
            value_type: value_type.into(),
            condition: Some(condition),
        }
    }

    /// Creates a rule lacking a condition. The registry will reject it.
    pub fn without_condition(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: value_type.into(),
            condition: None,
        }
    }

    /// Whether this rule applies to every value type without specific rules.
    pub fn is_global(&self) -> bool {
        self.value_type == GLOBAL_VALUE_TYPE
    }
}

impl fmt::Debug for AssociationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssociationRule")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("has_condition", &self.condition.is_some())
            .finish()
    }
}
