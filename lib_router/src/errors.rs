use thiserror::Error;

/// Errors raised by the routing engine and its configuration layer.
///
/// `InvalidRule` and `RuleConditionFault` never abort an evaluation pass: the
/// engine logs them, counts them in the pass report and carries on.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A rule was registered without a condition and has been discarded.
    #[error("Rule '{name}' has no condition and was discarded")]
    InvalidRule {
        /// Diagnostic name of the rejected rule.
        name: String,
    },

    /// A rule condition failed (returned an error or panicked) while evaluating a pair.
    #[error("Failed invoking condition of rule '{rule}': {reason}")]
    RuleConditionFault {
        /// Diagnostic name of the faulting rule.
        rule: String,
        /// Rendered error or panic message.
        reason: String,
    },

    /// An IO point violates the model, e.g. carries an empty value type.
    #[error("Invalid IO point '{point}' on device '{device}': {reason}")]
    InvalidPoint {
        /// Id of the offending point.
        point: String,
        /// Id of the device owning the point.
        device: String,
        /// What is wrong with it.
        reason: String,
    },

    /// I/O error while reading a router options file.
    #[error("I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    /// A router options file could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),
}
