use serde::Deserialize;

/// Parsed `yt-dlp --dump-json` payload. Only the fields the selector and the
/// output-path builder need; everything else in the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    #[serde(default)]
    pub formats: Vec<FormatCandidate>,
}

/// One encoding/resolution/bitrate option offered by the source video.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatCandidate {
    pub format_id: String,
    /// Average audio bitrate in kbps; absent on video-only formats.
    #[serde(default)]
    pub abr: Option<f64>,
    /// Frame height in pixels; absent on audio-only formats.
    #[serde(default)]
    pub height: Option<u32>,
}
