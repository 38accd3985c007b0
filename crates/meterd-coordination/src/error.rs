/// Errors from the coordination backend boundary.
///
/// # Examples
///
/// ```rust
/// use meterd_coordination::error::CoordinationError;
///
/// let err = CoordinationError::UnsupportedBackend("zookeeper".to_string());
/// assert!(err.to_string().contains("zookeeper"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum CoordinationError {
    /// The backend URL scheme has no registered backend implementation.
    #[error("Coordination: unsupported backend scheme '{0}'")]
    UnsupportedBackend(String),

    /// The backend URL could not be parsed into scheme and locator.
    #[error("Coordination: invalid backend url '{0}'")]
    InvalidUrl(String),

    /// The backend could not be reached or initialized. Fatal at startup.
    #[error("Coordination: backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Coordination: io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` alias for coordination operations.
pub type Result<T> = std::result::Result<T, CoordinationError>;
