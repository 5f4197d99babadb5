/// Errors raised while configuring or writing to output sinks.
///
/// # Examples
///
/// ```rust
/// use wearwatch_notify::error::NotifyError;
///
/// let err = NotifyError::InvalidConfig("missing path".to_string());
/// assert!(err.to_string().contains("path"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Sink configuration is missing a required field or contains an invalid value.
    #[error("Notify: invalid sink configuration: {0}")]
    InvalidConfig(String),

    /// The sink type is not registered in the plugin registry.
    #[error("Notify: unknown sink type '{0}'")]
    UnknownSinkType(String),

    #[error("Notify: I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Notify: JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NotifyError>;
