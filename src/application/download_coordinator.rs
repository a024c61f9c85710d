use std::path::PathBuf;

use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    domain::{selector, AppError, DownloadRequest, MediaType, ResolvedSelection, VideoResolution},
    utils::{is_youtube_url, sanitize_filename, touch_file},
    ytdlp::{parse_progress, DownloadProcess, VideoMetadata, YtDlpClient},
};

#[derive(Debug, Clone)]
pub enum DownloadEvent {
    Progress(f32),
    Completed(PathBuf),
    Failed(AppError),
}

/// Orchestrates one request end to end: metadata fetch, format selection
/// hand-off, argument construction, and the streamed download itself.
#[derive(Clone)]
pub struct DownloadCoordinator {
    client: YtDlpClient,
    downloads_dir: PathBuf,
}

impl DownloadCoordinator {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: YtDlpClient::new(config.ytdlp_path.clone(), config.ffmpeg_path.clone()),
            downloads_dir: config.downloads_dir.clone(),
        }
    }

    /// Validate the input and fetch the video's format list. An empty URL is
    /// rejected before anything touches the network.
    pub async fn prepare(&self, request: &DownloadRequest) -> Result<VideoMetadata, AppError> {
        let url = request.url.trim();
        if url.is_empty() {
            return Err(AppError::MissingUrl);
        }
        if !is_youtube_url(url) {
            return Err(AppError::InvalidUrl(url.to_string()));
        }

        self.client
            .fetch_metadata(url, request.media_type)
            .await
            .map_err(|e| AppError::Metadata(e.to_string()))
    }

    /// Audio path: best bitrate wins, no user prompt needed.
    pub fn resolve_audio(metadata: &VideoMetadata) -> Result<ResolvedSelection, AppError> {
        let best = selector::select_audio(&metadata.formats)?;
        Ok(ResolvedSelection {
            format_id: best.format_id.clone(),
            title: metadata.title.clone(),
            resolution: None,
        })
    }

    /// Video path: the caller already asked the user which height they want.
    pub fn resolve_video(
        metadata: &VideoMetadata,
        chosen: VideoResolution,
    ) -> Result<ResolvedSelection, AppError> {
        let candidate = selector::select_video(&metadata.formats, chosen)?;
        Ok(ResolvedSelection {
            format_id: candidate.format_id.clone(),
            title: metadata.title.clone(),
            resolution: Some(chosen),
        })
    }

    /// `<downloads>/<title>[ - <resolution>]` with filesystem-hostile
    /// characters replaced.
    fn output_basename(selection: &ResolvedSelection) -> String {
        let mut name = sanitize_filename(&selection.title);
        if let Some(resolution) = selection.resolution {
            name = format!("{} - {}", name, resolution.label());
        }
        name.trim_matches(|c| c == '.' || c == ' ').to_string()
    }

    /// Where the finished file is expected to land.
    pub fn output_path(&self, selection: &ResolvedSelection, media_type: MediaType) -> PathBuf {
        self.downloads_dir.join(format!(
            "{}.{}",
            Self::output_basename(selection),
            media_type.extension()
        ))
    }

    /// yt-dlp argument set for the download call. The URL and the ffmpeg
    /// location are appended by the client.
    pub fn build_download_args(
        &self,
        media_type: MediaType,
        selection: &ResolvedSelection,
    ) -> Vec<String> {
        let template = self
            .downloads_dir
            .join(format!("{}.%(ext)s", Self::output_basename(selection)))
            .to_string_lossy()
            .into_owned();

        let mut args = vec![
            "-f".to_string(),
            selection.format_id.clone(),
            "-o".to_string(),
            template,
            "--newline".to_string(),
        ];

        match media_type {
            MediaType::Audio => {
                // MP3 at 192 kbps / 44.1 kHz through libmp3lame, existing
                // files overwritten, ffmpeg kept quiet.
                args.extend(
                    [
                        "-x",
                        "--audio-format",
                        "mp3",
                        "--audio-quality",
                        "192",
                        "--force-overwrites",
                        "--postprocessor-args",
                        "-loglevel quiet -acodec libmp3lame -ar 44100",
                    ]
                    .map(str::to_string),
                );
            }
            MediaType::Video => {
                args.push("--no-playlist".to_string());
            }
        }

        args
    }

    /// Run the download as a stream of UI events. The stream always ends with
    /// either `Completed` or `Failed`.
    pub fn download_stream(
        &self,
        request: DownloadRequest,
        selection: ResolvedSelection,
    ) -> BoxStream<'static, DownloadEvent> {
        let args = self.build_download_args(request.media_type, &selection);
        let output_path = self.output_path(&selection, request.media_type);
        info!(url = %request.url, format_id = %selection.format_id, output = %output_path.display(), "starting download");

        futures::stream::unfold(
            DownloadRuntimeState::Start {
                client: self.client.clone(),
                args,
                url: request.url,
                output_path,
            },
            |state| async move {
                match state {
                    DownloadRuntimeState::Start {
                        client,
                        args,
                        url,
                        output_path,
                    } => match client.start_download(args, &url) {
                        Ok(process) => Some((
                            DownloadEvent::Progress(0.0),
                            DownloadRuntimeState::Running {
                                process,
                                output_path,
                            },
                        )),
                        Err(e) => Some((
                            DownloadEvent::Failed(AppError::Download(e.to_string())),
                            DownloadRuntimeState::Finished,
                        )),
                    },
                    DownloadRuntimeState::Running {
                        mut process,
                        output_path,
                    } => {
                        // Skip non-progress output until the next progress
                        // line or the end of the stream.
                        while let Some(line) = process.next_line().await {
                            if let Some(fraction) = parse_progress(&line) {
                                return Some((
                                    DownloadEvent::Progress(fraction),
                                    DownloadRuntimeState::Running {
                                        process,
                                        output_path,
                                    },
                                ));
                            }
                        }

                        match process.finish().await {
                            Ok(()) => {
                                if output_path.exists() {
                                    if let Err(e) = touch_file(&output_path) {
                                        warn!(path = %output_path.display(), error = %e, "could not update file times");
                                    }
                                } else {
                                    warn!(path = %output_path.display(), "expected output file not found");
                                }
                                Some((
                                    DownloadEvent::Completed(output_path),
                                    DownloadRuntimeState::Finished,
                                ))
                            }
                            Err(e) => Some((
                                DownloadEvent::Failed(AppError::Download(e.to_string())),
                                DownloadRuntimeState::Finished,
                            )),
                        }
                    }
                    DownloadRuntimeState::Finished => None,
                }
            },
        )
        .boxed()
    }
}

enum DownloadRuntimeState {
    Start {
        client: YtDlpClient,
        args: Vec<String>,
        url: String,
        output_path: PathBuf,
    },
    Running {
        process: DownloadProcess,
        output_path: PathBuf,
    },
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ytdlp::FormatCandidate;

    fn coordinator() -> DownloadCoordinator {
        let config = AppConfig {
            ytdlp_path: "yt-dlp".to_string(),
            ffmpeg_path: "/opt/ffmpeg/bin/ffmpeg".to_string(),
            downloads_dir: PathBuf::from("/home/user/Downloads"),
            log_dir: PathBuf::from("/tmp/log"),
            icon_path: None,
        };
        DownloadCoordinator::new(&config)
    }

    fn metadata_with_bitrates(bitrates: &[f64]) -> VideoMetadata {
        VideoMetadata {
            title: "My Song".to_string(),
            formats: bitrates
                .iter()
                .enumerate()
                .map(|(i, &abr)| FormatCandidate {
                    format_id: format!("f{}", i),
                    abr: Some(abr),
                    height: None,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn empty_url_fails_before_any_selection() {
        let request = DownloadRequest {
            url: "   ".to_string(),
            media_type: MediaType::Audio,
        };
        let err = coordinator().prepare(&request).await.unwrap_err();
        assert!(matches!(err, AppError::MissingUrl));
    }

    #[tokio::test]
    async fn non_youtube_url_is_rejected() {
        let request = DownloadRequest {
            url: "https://example.com/watch?v=x".to_string(),
            media_type: MediaType::Video,
        };
        let err = coordinator().prepare(&request).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidUrl(_)));
    }

    #[test]
    fn audio_resolution_picks_max_bitrate_entry() {
        let metadata = metadata_with_bitrates(&[128.0, 256.0, 192.0]);
        let selection = DownloadCoordinator::resolve_audio(&metadata).unwrap();
        assert_eq!(selection.format_id, "f1");
        assert_eq!(selection.title, "My Song");
        assert!(selection.resolution.is_none());
    }

    #[test]
    fn audio_output_is_mp3_named_after_title() {
        let metadata = metadata_with_bitrates(&[128.0, 256.0, 192.0]);
        let selection = DownloadCoordinator::resolve_audio(&metadata).unwrap();
        let path = coordinator().output_path(&selection, MediaType::Audio);
        assert_eq!(path, PathBuf::from("/home/user/Downloads/My Song.mp3"));
    }

    #[test]
    fn audio_args_request_mp3_192_44100() {
        let metadata = metadata_with_bitrates(&[160.0]);
        let selection = DownloadCoordinator::resolve_audio(&metadata).unwrap();
        let args = coordinator().build_download_args(MediaType::Audio, &selection);

        assert!(args.contains(&"-x".to_string()));
        let codec_pos = args.iter().position(|a| a == "--audio-format").unwrap();
        assert_eq!(args[codec_pos + 1], "mp3");
        let quality_pos = args.iter().position(|a| a == "--audio-quality").unwrap();
        assert_eq!(args[quality_pos + 1], "192");
        let pp_pos = args.iter().position(|a| a == "--postprocessor-args").unwrap();
        assert_eq!(args[pp_pos + 1], "-loglevel quiet -acodec libmp3lame -ar 44100");
        assert!(args.contains(&"--force-overwrites".to_string()));
    }

    #[test]
    fn video_args_skip_postprocessing_and_disable_playlists() {
        let metadata = VideoMetadata {
            title: "Clip".to_string(),
            formats: vec![FormatCandidate {
                format_id: "137".to_string(),
                abr: None,
                height: Some(1080),
            }],
        };
        let selection =
            DownloadCoordinator::resolve_video(&metadata, VideoResolution::P1080).unwrap();
        let args = coordinator().build_download_args(MediaType::Video, &selection);

        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(!args.contains(&"-x".to_string()));
        assert!(!args.contains(&"--postprocessor-args".to_string()));
        let f_pos = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[f_pos + 1], "137");
    }

    #[test]
    fn video_output_carries_resolution_tag() {
        let metadata = VideoMetadata {
            title: "A/B Test: Results?".to_string(),
            formats: vec![FormatCandidate {
                format_id: "136".to_string(),
                abr: None,
                height: Some(720),
            }],
        };
        let selection =
            DownloadCoordinator::resolve_video(&metadata, VideoResolution::P720).unwrap();
        let path = coordinator().output_path(&selection, MediaType::Video);
        assert_eq!(
            path,
            PathBuf::from("/home/user/Downloads/A_B Test_ Results_ - 720p.mp4")
        );
    }

    #[test]
    fn output_template_uses_ext_placeholder() {
        let metadata = metadata_with_bitrates(&[96.0]);
        let selection = DownloadCoordinator::resolve_audio(&metadata).unwrap();
        let args = coordinator().build_download_args(MediaType::Audio, &selection);
        let o_pos = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(args[o_pos + 1], "/home/user/Downloads/My Song.%(ext)s");
    }
}
