/// Errors from the notification delivery layer.
///
/// The [`Notifier`](crate::Notifier) trait itself returns `anyhow::Result`
/// so channel implementations can wrap transport-specific failures freely;
/// this enum covers the typed cases the factory and channels surface.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The publisher URL scheme has no registered channel.
    #[error("Notify: unknown publisher scheme '{0}'")]
    UnknownScheme(String),

    /// The publisher URL could not be parsed.
    #[error("Notify: invalid publisher url '{0}'")]
    InvalidUrl(String),

    /// An HTTP request to the notification endpoint failed.
    #[error("Notify: HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Convenience `Result` alias for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;
