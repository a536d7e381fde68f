//! Error types for the deliberation engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while planning, reasoning, or validating.
///
/// Policy findings (unavailable tools, unsafe operations, weak reasoning)
/// are *not* errors; they are returned to the caller as typed
/// [`ValidationIssue`](crate::validator::ValidationIssue) data. Only
/// not-found lookups, structural defects, and misconfiguration surface here.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Configuration validation error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A plan id that does not exist in the store
    #[error("Plan not found: {id}")]
    PlanNotFound { id: String },

    /// A reasoning chain id that does not exist in the store
    #[error("Reasoning chain not found: {id}")]
    ChainNotFound { id: String },

    /// Structural defect in a step graph (cycle, unresolved dependency)
    #[error("Plan structure error: {message}")]
    Structure { message: String },

    /// Goal classification failure
    #[error("Classification error: {message}")]
    Classification { message: String },

    /// Decision making error
    #[error("Decision error: {message}")]
    Decision { message: String },

    /// Store access error
    #[error("Store error: {message}")]
    Store { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl EngineError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a plan-not-found error
    pub fn plan_not_found(id: impl ToString) -> Self {
        Self::PlanNotFound { id: id.to_string() }
    }

    /// Create a chain-not-found error
    pub fn chain_not_found(id: impl ToString) -> Self {
        Self::ChainNotFound { id: id.to_string() }
    }

    /// Create a structure error
    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure { message: message.into() }
    }

    /// Create a classification error
    pub fn classification(message: impl Into<String>) -> Self {
        Self::Classification { message: message.into() }
    }

    /// Create a decision error
    pub fn decision(message: impl Into<String>) -> Self {
        Self::Decision { message: message.into() }
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store { message: message.into() }
    }

    /// Whether this error indicates a missing entity rather than bad input
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PlanNotFound { .. } | Self::ChainNotFound { .. })
    }

    /// Get error category for metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::PlanNotFound { .. } => "plan_not_found",
            Self::ChainNotFound { .. } => "chain_not_found",
            Self::Structure { .. } => "structure",
            Self::Classification { .. } => "classification",
            Self::Decision { .. } => "decision",
            Self::Store { .. } => "store",
            Self::Serialization { .. } => "serialization",
        }
    }
}

/// Convert from serde_json errors
impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization { message: err.to_string() }
    }
}
