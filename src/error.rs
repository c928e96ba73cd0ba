use thiserror::Error;

/// All possible errors that can occur while loading, editing or exporting audio
#[derive(Debug, Error)]
pub enum AudioError {
    /// Failed to open or read the audio file from disk
    #[error("Failed to open audio file '{path}': {source}")]
    FileOpen {
        path: String,
        source: std::io::Error,
    },

    /// The file was rejected by the upload extension filter
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Error occurred while decoding the audio data
    #[error("Audio decoding failed: {0}")]
    DecodeFailed(String),

    /// Error occurred while encoding to WAV
    #[error("WAV encoding failed: {0}")]
    EncodeFailed(String),

    /// Channel layout or sample rate does not describe a usable buffer
    #[error("Invalid audio buffer: {0}")]
    InvalidBuffer(String),

    /// Editor configuration is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The blocking edit pipeline panicked or was cancelled
    #[error("Edit task failed: {0}")]
    TaskJoin(String),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from hound WAV reader
    #[error("Hound WAV error: {0}")]
    Hound(#[from] hound::Error),

    /// Malformed configuration file
    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenient Result type that uses our AudioError
pub type Result<T> = std::result::Result<T, AudioError>;
