//! Error types for the `rich_content` crate.

/// Errors raised while configuring a [`ContentProcessor`](crate::ContentProcessor).
///
/// Content transforms themselves never fail: malformed or hostile markup is
/// degraded (offending tags, attributes and URLs are dropped) rather than
/// rejected.
#[derive(Debug, thiserror::Error)]
pub enum RichContentError {
    /// The builder configuration is invalid.
    #[error("Config error: {0}")]
    Config(String),

    /// A processor was already registered as the global instance.
    #[error("Global content processor already initialized")]
    AlreadyInitialized,
}

/// A type alias for `Result<T, RichContentError>`.
pub type Result<T> = std::result::Result<T, RichContentError>;
