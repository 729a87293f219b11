//! # Configuration Modules
//!
//! File-backed router options: declarative rules, external devices and an
//! optional static device topology, read from JSON5 documents.

/// Router options file (rules, external devices, static devices).
pub mod router_config;

pub use router_config::{load_router_config, ConditionSpec, RouterConfigFile, RuleDefinition};
