// src/error.rs

/// Result type used throughout the beacon library
pub type AutoscalerResult<T> = Result<T, AutoscalerError>;

/// All possible errors that can occur in the beacon library
#[derive(thiserror::Error, Debug)]
pub enum AutoscalerError {
    /// A requested replica count fell outside the configured bounds
    #[error("Invalid replicas count {requested}: must be between {min} and {max}")]
    InvalidReplicaCount { requested: i64, min: u32, max: u32 },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Engine is not running or has stopped
    #[error("Autoscaler engine is not running: {message}")]
    EngineNotRunning { message: String },

    /// Channel communication error (internal)
    #[error("Internal channel error: {message}")]
    ChannelError { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Malformed TOML configuration
    #[cfg(feature = "config-toml")]
    #[error("TOML parse error: {source}")]
    TomlParse {
        #[from]
        source: toml::de::Error,
    },

    /// Metric registration or encoding failed
    #[cfg(feature = "prometheus-metrics")]
    #[error("Metrics error: {source}")]
    Metrics {
        #[from]
        source: prometheus::Error,
    },
}

/// Helper methods for creating common errors
impl AutoscalerError {
    pub fn invalid_replica_count(requested: i64, min: u32, max: u32) -> Self {
        Self::InvalidReplicaCount {
            requested,
            min,
            max,
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn engine_not_running<S: Into<String>>(message: S) -> Self {
        Self::EngineNotRunning {
            message: message.into(),
        }
    }

    /// True when the error is a rejected replica count, which callers surface as a client error
    pub fn is_invalid_replica_count(&self) -> bool {
        matches!(self, Self::InvalidReplicaCount { .. })
    }
}

/// Convert from channel send errors
impl<T> From<tokio::sync::mpsc::error::SendError<T>> for AutoscalerError {
    fn from(error: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Self::ChannelError {
            message: format!("Failed to send on channel: {}", error),
        }
    }
}

/// Convert from channel receive errors
impl From<tokio::sync::oneshot::error::RecvError> for AutoscalerError {
    fn from(error: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::ChannelError {
            message: format!("Failed to receive on channel: {}", error),
        }
    }
}
