use crate::ytdlp::VideoMetadata;

/// What the user asked for. Immutable once submitted.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub media_type: MediaType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Audio,
    Video,
}

impl MediaType {
    /// File extension of the final artifact.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Audio => "mp3",
            Self::Video => "mp4",
        }
    }

    /// Format-selection hint passed to the metadata call.
    pub fn format_hint(self) -> &'static str {
        match self {
            Self::Audio => "bestaudio/best",
            Self::Video => "bestvideo+bestaudio/best",
        }
    }
}

/// The two resolutions the video path offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoResolution {
    P720,
    P1080,
}

impl VideoResolution {
    pub fn height(self) -> u32 {
        match self {
            Self::P720 => 720,
            Self::P1080 => 1080,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::P720 => "720p",
            Self::P1080 => "1080p",
        }
    }
}

/// One format id picked out of the metadata, derived once per request.
#[derive(Debug, Clone)]
pub struct ResolvedSelection {
    pub format_id: String,
    pub title: String,
    pub resolution: Option<VideoResolution>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    Idle,
    FetchingMetadata,
    ChoosingResolution,
    Downloading,
    Completed,
    Failed,
}

/// Carried between the metadata step and the resolution prompt in video mode.
#[derive(Debug, Clone)]
pub struct PendingVideoChoice {
    pub request: DownloadRequest,
    pub metadata: VideoMetadata,
}
