//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use cert_orchestrator_provider::ProviderError;

/// Core layer error type
///
/// `Clone` because a failed deferred value is handed to every consumer.
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Configuration that cannot be turned into a request at all
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Two resources registered under the same URN
    #[error("Duplicate resource URN: {0}")]
    DuplicateUrn(String),

    /// A resource was skipped because something it depends on failed
    #[error("Dependency of {urn} failed: {cause}")]
    DependencyFailed {
        urn: String,
        #[source]
        cause: Box<CoreError>,
    },

    /// No provider able to perform the step
    #[error("Missing provider: {0}")]
    MissingProvider(String),

    /// State store error
    #[error("State error: {0}")]
    StateError(String),

    /// serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, rejected request, etc.), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::InvalidInput(_) | Self::DuplicateUrn(_) | Self::MissingProvider(_) => true,
            Self::DependencyFailed { cause, .. } => cause.is_expected(),
            Self::Provider(e) => e.is_expected(),
            Self::StateError(_) | Self::SerializationError(_) => false,
        }
    }

    /// The error at the end of a chain of failed dependencies.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Self::DependencyFailed { cause, .. } = current {
            current = cause;
        }
        current
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
