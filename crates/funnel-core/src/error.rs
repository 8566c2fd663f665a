//! Error types for the Funnel workspace.
//!
//! Flow operations themselves never fail; they degrade to no-ops or fallback
//! values. Errors only surface at the edges: loading configuration, loading
//! step registries, parsing event scripts and page addresses.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the entire Funnel workspace.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum FunnelError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", "URL"
        message: String,
    },

    /// Configuration error (invalid config values or step registry)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Multiple errors
    #[error("Multiple errors occurred ({} total)", .0.len())]
    Multiple(Vec<FunnelError>),
}

impl FunnelError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Collapses a list of errors: `Ok(())` when empty, the single error when
    /// there is one, `Multiple` otherwise.
    pub fn from_many(mut errors: Vec<FunnelError>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Self::Multiple(errors)),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this is a config error, including a `Multiple` made only of config errors
    pub fn is_config(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Multiple(errors) => !errors.is_empty() && errors.iter().all(Self::is_config),
            _ => false,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for FunnelError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for FunnelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FunnelError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for FunnelError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for FunnelError {
    fn from(err: url::ParseError) -> Self {
        Self::Serialization {
            format: "URL".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error
impl From<anyhow::Error> for FunnelError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, FunnelError>`.
pub type Result<T> = std::result::Result<T, FunnelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_many_collapses() {
        assert!(FunnelError::from_many(Vec::new()).is_ok());

        let single = FunnelError::from_many(vec![FunnelError::config("a")]).unwrap_err();
        assert_eq!(single, FunnelError::Config("a".to_string()));

        let many = FunnelError::from_many(vec![
            FunnelError::config("a"),
            FunnelError::config("b"),
        ])
        .unwrap_err();
        assert!(matches!(many, FunnelError::Multiple(ref errors) if errors.len() == 2));
        assert!(many.is_config());
    }

    #[test]
    fn test_toml_error_is_serialization() {
        let err: FunnelError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(err.is_serialization());
        assert!(err.to_string().contains("TOML"));
    }
}
