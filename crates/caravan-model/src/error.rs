//! Error types for caravan-model.

/// Errors raised while parsing declarative dependency input.
///
/// Both variants are fatal: they surface before any traversal starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A module id or coordinate string is malformed.
    #[error("invalid coordinate \"{coordinate}\": {reason}")]
    InvalidCoordinate { coordinate: String, reason: String },

    /// A configuration-mapping expression is malformed.
    #[error("invalid configuration mapping \"{expression}\": {reason}")]
    MappingSyntax { expression: String, reason: String },
}
