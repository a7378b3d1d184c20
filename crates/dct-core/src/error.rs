//! Error types for the dictionary tools.

/// Errors that can occur while transforming mappings.
#[derive(Debug, thiserror::Error)]
pub enum DctError {
    /// A value that must be a mapping was something else.
    #[error("invalid input at {at}: expected mapping, found {found}")]
    NotAMapping { at: String, found: &'static str },

    /// Two entries resolved to the same compound key.
    #[error("key collision on {key:?}")]
    KeyCollision { key: String },

    /// A configuration value was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("config io error: {0}")]
    ConfigIo(#[from] std::io::Error),
}

/// Convenience alias for dictionary tool results.
pub type DctResult<T> = Result<T, DctError>;
