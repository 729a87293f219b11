//! # IO Points
//!
//! IO sources produce values, IO actors consume them. Both are "IO points":
//! capabilities attached to a device, carrying a semantic value type and an
//! optional update rate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Interval in milliseconds between published values. Smaller is faster,
/// `None` means unlimited.
pub type UpdateRate = Option<u64>;

/// Stable unique identifier of an IO point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(String);

impl PointId {
    /// Wraps any string-like value as a point id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PointId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PointId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// # Backpressure Strategy
///
/// How an IO source copes with producing values faster than its recommended
/// update rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackpressureStrategy {
    /// `None` when no recommended rate is assigned, `Sample` otherwise.
    #[default]
    Default,
    /// Publish every value immediately, ignoring the recommended rate.
    None,
    /// Publish the most recent value once per rate interval.
    Sample,
    /// Publish a value only after a full rate interval passed without another one.
    Throttle,
}

impl BackpressureStrategy {
    /// Resolves the strategy that is effectively applied for a given
    /// recommended rate. Never returns `Default`.
    ///
    /// `Sample` and `Throttle` have no interval to work with when the rate is
    /// unlimited, so they fall back to `None` as well.
    pub fn resolve(self, rate: UpdateRate) -> BackpressureStrategy {
        match (self, rate) {
            (_, None) => Self::None,
            (Self::Default, Some(_)) => Self::Sample,
            (strategy, Some(_)) => strategy,
        }
    }
}

/// Capability shared by IO sources and IO actors.
pub trait IoPoint {
    /// Stable unique id of the point.
    fn id(&self) -> &PointId;
    /// Display name (diagnostics only).
    fn name(&self) -> &str;
    /// Semantic, application specific type of the values, e.g. `Temperature`.
    fn value_type(&self) -> &str;
    /// Maximum drain rate (sources) or desired rate (actors).
    fn update_rate(&self) -> UpdateRate;
    /// Topic defined outside the router that this point is bound to, if any.
    fn external_topic(&self) -> Option<&str>;
}

/// # IO Source
///
/// Producer of typed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IoSource {
    /// Stable unique id.
    pub id: PointId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Non-empty semantic value type.
    pub value_type: String,
    /// Maximum possible drain rate in milliseconds.
    #[serde(default)]
    pub update_rate: UpdateRate,
    /// Externally defined topic the source publishes on.
    #[serde(default)]
    pub external_topic: Option<String>,
    /// Backpressure strategy, `Default` unless specified.
    #[serde(default)]
    pub update_strategy: BackpressureStrategy,
}

impl IoSource {
    /// Creates a source with unlimited rate and the default strategy.
    pub fn new(id: impl Into<PointId>, value_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            value_type: value_type.into(),
            update_rate: None,
            external_topic: None,
            update_strategy: BackpressureStrategy::Default,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the update rate in milliseconds.
    pub fn with_update_rate(mut self, rate_ms: u64) -> Self {
        self.update_rate = Some(rate_ms);
        self
    }

    /// Binds the source to an externally defined topic.
    pub fn with_external_topic(mut self, topic: impl Into<String>) -> Self {
        self.external_topic = Some(topic.into());
        self
    }

    /// Sets the backpressure strategy.
    pub fn with_strategy(mut self, strategy: BackpressureStrategy) -> Self {
        self.update_strategy = strategy;
        self
    }
}

impl IoPoint for IoSource {
    fn id(&self) -> &PointId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn value_type(&self) -> &str {
        &self.value_type
    }

    fn update_rate(&self) -> UpdateRate {
        self.update_rate
    }

    fn external_topic(&self) -> Option<&str> {
        self.external_topic.as_deref()
    }
}

/// # IO Actor
///
/// Consumer of typed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IoActor {
    /// Stable unique id.
    pub id: PointId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Non-empty semantic value type.
    pub value_type: String,
    /// Desired update rate in milliseconds.
    #[serde(default)]
    pub update_rate: UpdateRate,
    /// Externally defined topic the actor listens on.
    #[serde(default)]
    pub external_topic: Option<String>,
    /// Treat payloads as opaque raw strings instead of structured values.
    #[serde(default, alias = "useRawIoValues")]
    pub use_raw_values: bool,
}

impl IoActor {
    /// Creates an actor with unlimited rate and structured payloads.
    pub fn new(id: impl Into<PointId>, value_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            value_type: value_type.into(),
            update_rate: None,
            external_topic: None,
            use_raw_values: false,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the update rate in milliseconds.
    pub fn with_update_rate(mut self, rate_ms: u64) -> Self {
        self.update_rate = Some(rate_ms);
        self
    }

    /// Binds the actor to an externally defined topic.
    pub fn with_external_topic(mut self, topic: impl Into<String>) -> Self {
        self.external_topic = Some(topic.into());
        self
    }

    /// Marks payloads as raw (not decoded).
    pub fn with_raw_values(mut self, raw: bool) -> Self {
        self.use_raw_values = raw;
        self
    }
}

impl IoPoint for IoActor {
    fn id(&self) -> &PointId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn value_type(&self) -> &str {
        &self.value_type
    }

    fn update_rate(&self) -> UpdateRate {
        self.update_rate
    }

    fn external_topic(&self) -> Option<&str> {
        self.external_topic.as_deref()
    }
}

/// An IO point as listed by a device, tagged as source or actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "coreType")]
pub enum IoCapability {
    /// A producer.
    #[serde(rename = "IoSource")]
    Source(IoSource),
    /// A consumer.
    #[serde(rename = "IoActor")]
    Actor(IoActor),
}

impl IoCapability {
    /// Borrows the capability through the shared point trait.
    pub fn as_point(&self) -> &dyn IoPoint {
        match self {
            IoCapability::Source(source) => source,
            IoCapability::Actor(actor) => actor,
        }
    }
}

impl From<IoSource> for IoCapability {
    fn from(source: IoSource) -> Self {
        IoCapability::Source(source)
    }
}

impl From<IoActor> for IoCapability {
    fn from(actor: IoActor) -> Self {
        IoCapability::Actor(actor)
    }
}
