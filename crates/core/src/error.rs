/// Result alias that carries the custom [`VisualiserError`] type.
pub type Result<T> = std::result::Result<T, VisualiserError>;

/// Common error type for the core crate.
///
/// None of these variants is fatal to the frame loop. Callers surface them
/// inline (search and playback failures) or log them (asset and render
/// failures) and keep ticking.
#[derive(Debug, thiserror::Error)]
pub enum VisualiserError {
    /// Free-form message for failures without a dedicated variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration or payload that failed to (de)serialise.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Configuration values that parsed but make no sense.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Search request failed or returned a non-success status.
    #[error("network error: {0}")]
    Network(String),
    /// Cover art or other texture source could not be fetched or decoded.
    #[error("asset error: {0}")]
    Asset(String),
    /// Audio resource could not be created or started.
    #[error("playback error: {0}")]
    Playback(String),
    /// The frame sink rejected a frame.
    #[error("render error: {0}")]
    Render(String),
}

impl VisualiserError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for VisualiserError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for VisualiserError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<ureq::Error> for VisualiserError {
    fn from(value: ureq::Error) -> Self {
        Self::Network(value.to_string())
    }
}

impl From<image::ImageError> for VisualiserError {
    fn from(value: image::ImageError) -> Self {
        Self::Asset(value.to_string())
    }
}
