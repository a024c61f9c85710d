pub mod client;
pub mod models;

pub use client::{parse_progress, DownloadProcess, YtDlpClient, YtDlpError};
pub use models::{FormatCandidate, VideoMetadata};
