//! Error types for caravan-engine.

/// Errors produced by a resolution call.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// One or more modules could not be resolved.
    #[error("resolution failed:\n{}", .problems.join("\n"))]
    Resolution { problems: Vec<String> },

    /// A conflict strategy name is not recognised.
    #[error("unknown conflict strategy \"{value}\": expected nearest, latest, or forced")]
    UnknownStrategy { value: String },
}
