//! Error types for harness-config.

use std::fmt;
use std::path::PathBuf;

/// Result type alias for harness-config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading, resolving or substituting properties.
///
/// Every variant is fatal to the calling scenario. Nothing in this crate
/// retries or degrades to a partial value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The properties directory or a named properties file is absent or empty.
    #[error("Configuration missing at {}: {reason}", .path.display())]
    ConfigurationMissing {
        /// The path that was expected to exist
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// The active environment is not registered.
    #[error("[{environment}] environment does not exist")]
    UnsupportedEnvironment {
        /// The environment name as it was requested
        environment: String,
    },

    /// A file-backed or runtime key has no value.
    #[error("[{key}] returned null{}", .hint.as_deref().map(|h| format!(". {h}")).unwrap_or_default())]
    UnresolvedKey {
        /// The key (composite key for environment lookups) that was missing
        key: String,
        /// Optional instruction for the operator
        hint: Option<String>,
    },

    /// A runtime placeholder expands back into itself.
    #[error("Cyclic substitution: {}", .chain.join(" -> "))]
    CyclicSubstitution {
        /// The keys visited, ending with the one that closed the cycle
        chain: Vec<String>,
    },

    /// A `{$` marker without a closing brace.
    #[error("Unterminated placeholder at byte {position} in '{input}'")]
    MalformedPlaceholder {
        /// Byte offset of the `{$` marker
        position: usize,
        /// The string being substituted
        input: String,
    },

    /// Substitution went past a nesting, size or replacement limit.
    #[error("Substitution of [{key}] exceeded the {kind} limit of {max}")]
    SubstitutionLimit {
        /// The key being expanded when the limit was hit
        key: String,
        /// Which limit: `depth`, `length` or `replacement`
        kind: &'static str,
        /// The limit's value
        max: usize,
    },

    /// No constructor is registered for the requested object id.
    #[error("No object registered for id '{0}'")]
    UnknownObject(String),

    /// Required properties did not resolve at build time.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// A properties file could not be parsed.
    #[error("Failed to parse properties: {0}")]
    ParseError(String),

    /// A value could not be decoded.
    #[error("Failed to decode value for [{key}]: {reason}")]
    DecodeError {
        /// The key whose value failed to decode
        key: String,
        /// Decoder message
        reason: String,
    },

    /// File watching failed to initialize.
    #[error("File watching error: {0}")]
    WatchError(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error for other cases.
    #[error("Configuration error: {0}")]
    Other(String),
}

impl ConfigError {
    pub(crate) fn missing(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ConfigurationMissing {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unresolved(key: impl Into<String>) -> Self {
        Self::UnresolvedKey {
            key: key.into(),
            hint: None,
        }
    }
}

/// Validation error for required properties.
#[derive(Debug)]
pub enum ValidationError {
    /// Custom validation error with a message.
    Custom(String),

    /// A specific property has no usable value.
    InvalidField {
        /// The property key
        field: String,
        /// The reason why it's invalid
        reason: String,
    },

    /// Multiple validation errors occurred.
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Create a custom validation error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(msg) => write!(f, "{}", msg),
            Self::InvalidField { field, reason } => {
                write!(f, "Property '{}' is invalid: {}", field, reason)
            }
            Self::Multiple(errors) => {
                writeln!(f, "Multiple validation errors:")?;
                for (i, err) in errors.iter().enumerate() {
                    writeln!(f, "  {}. {}", i + 1, err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        ConfigError::ValidationError(err.to_string())
    }
}
