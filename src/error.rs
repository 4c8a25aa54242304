//! Error types for orbcompare.
//!
//! Every fallible operation returns `Result<T, ViewerError>`. Playback itself
//! cannot fail: its input is validated before a controller is created.

use thiserror::Error;

/// Result type alias for orbcompare operations.
pub type ViewerResult<T> = Result<T, ViewerError>;

/// Unified error type for all orbcompare operations.
#[derive(Debug, Error)]
pub enum ViewerError {
    // ===== Session Errors =====
    /// The prediction service answered with a non-2xx status.
    #[error("Prediction service returned HTTP {status}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
    },

    /// Transport-level failure (no response at all).
    #[error("Network error: {0}")]
    Network(String),

    /// No response arrived within the configured timeout.
    #[error("Prediction request timed out after {after_ms} ms")]
    Timeout {
        /// Timeout that elapsed, in milliseconds.
        after_ms: u64,
    },

    /// Response body does not describe a playable result.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The two trajectories of one result differ in length.
    #[error("Trajectory lengths differ: physics has {physics} points, ml has {ml}")]
    UnequalTrajectoryLengths {
        /// Number of points in the physics trajectory.
        physics: usize,
        /// Number of points in the ml trajectory.
        ml: usize,
    },

    /// A run is already in flight.
    #[error("A simulation is already running")]
    Busy,

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ViewerError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a malformed-response error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Whether this error came out of the request/response exchange.
    #[must_use]
    pub const fn is_session_failure(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed { .. }
                | Self::Network(_)
                | Self::Timeout { .. }
                | Self::MalformedResponse(_)
                | Self::UnequalTrajectoryLengths { .. }
        )
    }

    /// Short user-facing text for the blocking alert.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::RequestFailed { status } => {
                format!("The prediction service failed (HTTP {status}). Check the log for details.")
            }
            Self::Network(_) => {
                "Could not reach the prediction service. Check the log for details.".to_string()
            }
            Self::Timeout { after_ms } => {
                format!("The prediction service did not answer within {after_ms} ms.")
            }
            Self::MalformedResponse(_) | Self::UnequalTrajectoryLengths { .. } => {
                "The prediction service sent an unusable result. Check the log for details."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
