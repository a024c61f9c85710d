use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("No URL provided. Paste a YouTube link first.")]
    MissingUrl,

    #[error("Not a valid YouTube URL: {0}")]
    InvalidUrl(String),

    #[error("The video reported no downloadable formats")]
    NoFormats,

    #[error("No 720p or 1080p format is available for this video")]
    NoAcceptableFormat,

    #[error("Failed to fetch video info: {0}")]
    Metadata(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("I/O error: {0}")]
    Io(String),
}
