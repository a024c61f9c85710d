use std::env;
use std::path::PathBuf;

/// Paths the app depends on, resolved once at startup.
///
/// Defaults point at binaries on `PATH` and the user's Downloads folder;
/// `YTDLP_PATH` / `FFMPEG_PATH` override the tool locations.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ytdlp_path: String,
    pub ffmpeg_path: String,
    pub downloads_dir: PathBuf,
    pub log_dir: PathBuf,
    pub icon_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let downloads_dir = dirs::download_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
            .unwrap_or_else(|| PathBuf::from("."));

        let log_dir = dirs::data_local_dir()
            .map(|dir| dir.join("simple-youtube-downloader").join("log"))
            .unwrap_or_else(|| PathBuf::from("log"));

        Self {
            ytdlp_path: env::var("YTDLP_PATH").unwrap_or_else(|_| "yt-dlp".to_string()),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            downloads_dir,
            log_dir,
            icon_path: dirs::data_local_dir()
                .map(|dir| dir.join("simple-youtube-downloader").join("youtube.png")),
        }
    }
}
