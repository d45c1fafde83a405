use thiserror::Error;

#[derive(Debug, Error)]
pub enum TinderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Window not found: {0}")]
    WindowNotFound(String),

    #[error("No window region available")]
    NotReady,

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("Perception provider unavailable")]
    PerceptionUnavailable,

    #[error("Perception provider error: {0}")]
    Perception(String),

    #[error("Perception call timed out after {0}s")]
    PerceptionTimeout(u64),

    #[error("Perception response did not parse: {0}")]
    PerceptionParse(String),

    #[error("Actuation failed: {0}")]
    Actuation(String),

    #[error("Slot grid origin is not calibrated")]
    GridNotCalibrated,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type TinderResult<T> = Result<T, TinderError>;
