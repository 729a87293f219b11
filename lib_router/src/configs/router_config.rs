use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::router::RouterOptions;
use crate::errors::RouterError;
use crate::model::{AssociationRule, Device, DeviceId, IoActor, IoSource, RouterHandle, RuleCondition};

/// Declarative rule condition, as written in a router options file.
///
/// Serialized with a `kind` tag, e.g. `{ kind: "sourceDeviceIn", devices: ["d1"] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConditionSpec {
    /// Matches every pair.
    Always,
    /// Matches no pair.
    Never,
    /// Source and actor live on the same device.
    SameDevice,
    /// Source and actor live on different devices.
    DifferentDevice,
    /// The source device is one of `devices`.
    SourceDeviceIn {
        /// Accepted device ids.
        devices: Vec<DeviceId>,
    },
    /// The actor device is one of `devices`.
    ActorDeviceIn {
        /// Accepted device ids.
        devices: Vec<DeviceId>,
    },
    /// The source name contains `text`.
    SourceNameContains {
        /// Substring to look for.
        text: String,
    },
    /// The actor name contains `text`.
    ActorNameContains {
        /// Substring to look for.
        text: String,
    },
    /// The source can publish at least every `rate` milliseconds.
    /// Unlimited sources always qualify.
    MaxSourceRate {
        /// Largest accepted source interval in milliseconds.
        rate: u64,
    },
    /// Either endpoint is bound to an externally defined topic.
    HasExternalTopic,
    /// Negates `condition`.
    Not {
        /// The negated condition.
        condition: Box<ConditionSpec>,
    },
    /// Every condition holds (true when empty).
    All {
        /// Conditions to combine.
        conditions: Vec<ConditionSpec>,
    },
    /// At least one condition holds (false when empty).
    Any {
        /// Conditions to combine.
        conditions: Vec<ConditionSpec>,
    },
}

impl ConditionSpec {
    /// Evaluates the condition for one pair.
    pub fn matches(&self, source: &IoSource, source_device: &Device, actor: &IoActor, actor_device: &Device) -> bool {
        match self {
            ConditionSpec::Always => true,
            ConditionSpec::Never => false,
            ConditionSpec::SameDevice => source_device.id == actor_device.id,
            ConditionSpec::DifferentDevice => source_device.id != actor_device.id,
            ConditionSpec::SourceDeviceIn { devices } => devices.contains(&source_device.id),
            ConditionSpec::ActorDeviceIn { devices } => devices.contains(&actor_device.id),
            ConditionSpec::SourceNameContains { text } => source.name.contains(text.as_str()),
            ConditionSpec::ActorNameContains { text } => actor.name.contains(text.as_str()),
            ConditionSpec::MaxSourceRate { rate } => source.update_rate.map_or(true, |r| r <= *rate),
            ConditionSpec::HasExternalTopic => source.external_topic.is_some() || actor.external_topic.is_some(),
            ConditionSpec::Not { condition } => !condition.matches(source, source_device, actor, actor_device),
            ConditionSpec::All { conditions } => conditions
                .iter()
                .all(|c| c.matches(source, source_device, actor, actor_device)),
            ConditionSpec::Any { conditions } => conditions
                .iter()
                .any(|c| c.matches(source, source_device, actor, actor_device)),
        }
    }
}

impl RuleCondition for ConditionSpec {
    fn evaluate(
        &self,
        source: &IoSource,
        source_device: &Device,
        actor: &IoActor,
        actor_device: &Device,
        _router: &dyn RouterHandle,
    ) -> anyhow::Result<bool> {
        Ok(self.matches(source, source_device, actor, actor_device))
    }
}

/// One rule entry of a router options file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    /// Diagnostic name.
    pub name: String,
    /// Value type the rule governs; omitted or empty for a global rule.
    #[serde(default)]
    pub value_type: String,
    /// The condition. A missing condition yields a rule the registry rejects.
    #[serde(default)]
    pub condition: Option<ConditionSpec>,
}

impl RuleDefinition {
    /// Builds the engine rule.
    pub fn to_rule(&self) -> AssociationRule {
        match &self.condition {
            Some(spec) => {
                let condition: Arc<dyn RuleCondition> = Arc::new(spec.clone());
                AssociationRule::with_condition(self.name.clone(), self.value_type.clone(), condition)
            }
            None => AssociationRule::without_condition(self.name.clone(), self.value_type.clone()),
        }
    }
}

/// # Router Options File
///
/// ```json5
/// {
///   rules: [
///     { name: "temperature", valueType: "Temperature", condition: { kind: "always" } },
///   ],
///   externalDevices: [],
///   devices: [
///     { id: "thermo", ioCapabilities: [
///       { coreType: "IoSource", id: "t-out", valueType: "Temperature", updateRate: 1000 },
///     ] },
///   ],
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterConfigFile {
    /// Rules applied when the router starts.
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    /// Devices with externally defined topics, always scanned.
    #[serde(default)]
    pub external_devices: Vec<Device>,
    /// Static topology for processes without a discovery service.
    #[serde(default)]
    pub devices: Vec<Device>,
}

impl RouterConfigFile {
    /// Parses a JSON5 document.
    pub fn parse(text: &str) -> Result<Self, RouterError> {
        serde_json5::from_str(text).map_err(|e| RouterError::ParseError(e.to_string()))
    }

    /// Reads and parses a JSON5 file.
    pub fn load(path: &Path) -> Result<Self, RouterError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Checks every external and static device against the point model.
    pub fn validate(&self) -> Result<(), RouterError> {
        for device in self.external_devices.iter().chain(self.devices.iter()) {
            device.validate()?;
        }
        Ok(())
    }

    /// Engine rules in file order.
    pub fn rules(&self) -> Vec<AssociationRule> {
        self.rules.iter().map(RuleDefinition::to_rule).collect()
    }

    /// Startup options for a router.
    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            rules: self.rules(),
            external_devices: self.external_devices.clone(),
        }
    }
}

/// Loads and validates a router options file.
pub fn load_router_config(path: &Path) -> Result<RouterConfigFile, RouterError> {
    let config = RouterConfigFile::load(path)?;
    config.validate()?;
    log::info!(
        "Loaded {} rules, {} external devices and {} devices from {:?}",
        config.rules.len(),
        config.external_devices.len(),
        config.devices.len(),
        path
    );
    Ok(config)
}
