use futures::StreamExt;
use iced::Task;
use tracing::{error, info};

use crate::application::{DownloadCoordinator, DownloadEvent};
use crate::config::AppConfig;
use crate::domain::{
    selector, AppError, DownloadPhase, DownloadRequest, MediaType, PendingVideoChoice,
    ResolvedSelection,
};
use crate::ui::{DownloadMessage, DownloadView};
use crate::ytdlp::VideoMetadata;

pub struct DownloadApp {
    view: DownloadView,
    coordinator: DownloadCoordinator,
    // Metadata parked between the fetch and the user's resolution choice
    pending_video: Option<PendingVideoChoice>,
}

impl Default for DownloadApp {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl DownloadApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            view: DownloadView::default(),
            coordinator: DownloadCoordinator::new(&config),
            pending_video: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    /// Result of the metadata fetch, with the request that produced it
    MetadataFetched(Result<(DownloadRequest, VideoMetadata), AppError>),
    /// Events streamed from the running download
    Download(DownloadEvent),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::DownloadPressed if !app.view.is_busy() => {
                    let request = DownloadRequest {
                        url: app.view.youtube_url.trim().to_string(),
                        media_type: app.view.media_type,
                    };

                    app.view.error_message = None;
                    app.view.phase = DownloadPhase::FetchingMetadata;
                    app.view.status_message = "Fetching video info...".to_string();

                    let coordinator = app.coordinator.clone();
                    return Task::perform(
                        async move {
                            let metadata = coordinator.prepare(&request).await?;
                            Ok((request, metadata))
                        },
                        Message::MetadataFetched,
                    );
                }
                DownloadMessage::ResolutionChosen(resolution) => {
                    if let Some(pending) = app.pending_video.take() {
                        match DownloadCoordinator::resolve_video(&pending.metadata, resolution) {
                            Ok(selection) => {
                                return start_download(app, pending.request, selection);
                            }
                            Err(e) => fail(app, e),
                        }
                    }
                }
                DownloadMessage::ResolutionCancelled => {
                    app.pending_video = None;
                    app.view.reset_to_idle();
                    app.view.status_message = "Download cancelled".to_string();
                }
                DownloadMessage::ErrorDismissed => {
                    app.view.error_message = None;
                }
                _ => {}
            }
        }
        Message::MetadataFetched(result) => match result {
            Ok((request, metadata)) => match request.media_type {
                MediaType::Audio => match DownloadCoordinator::resolve_audio(&metadata) {
                    Ok(selection) => return start_download(app, request, selection),
                    Err(e) => fail(app, e),
                },
                MediaType::Video => {
                    if metadata.formats.is_empty() {
                        fail(app, AppError::NoFormats);
                    } else {
                        let choices = selector::available_resolutions(&metadata.formats);
                        if choices.is_empty() {
                            fail(app, AppError::NoAcceptableFormat);
                        } else {
                            app.view.resolution_choices = choices;
                            app.view.phase = DownloadPhase::ChoosingResolution;
                            app.view.status_message = "Waiting for resolution choice...".to_string();
                            app.pending_video = Some(PendingVideoChoice { request, metadata });
                        }
                    }
                }
            },
            Err(e) => fail(app, e),
        },
        Message::Download(event) => match event {
            DownloadEvent::Progress(progress) => {
                app.view.download_progress = progress;
                if progress >= 1.0 {
                    app.view.status_message = "Download complete, finalizing...".to_string();
                } else {
                    app.view.status_message =
                        format!("Download in progress... {:.1}%", progress * 100.0);
                }
            }
            DownloadEvent::Completed(path) => {
                info!(path = %path.display(), "download finished");
                app.view.phase = DownloadPhase::Completed;
                app.view.download_progress = 0.0;
                app.view.resolution_choices.clear();
                app.view.status_message = format!("Saved: {}", path.display());
            }
            DownloadEvent::Failed(e) => fail(app, e),
        },
    }
    Task::none()
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}

fn start_download(
    app: &mut DownloadApp,
    request: DownloadRequest,
    selection: ResolvedSelection,
) -> Task<Message> {
    app.view.phase = DownloadPhase::Downloading;
    app.view.download_progress = 0.0;
    app.view.status_message = "Download in progress... please wait.".to_string();

    let stream = app.coordinator.download_stream(request, selection);
    Task::stream(stream.map(Message::Download))
}

/// Uniform failure path: log it, show the modal, return the UI to idle.
fn fail(app: &mut DownloadApp, e: AppError) {
    error!("{e}");
    app.pending_video = None;
    app.view.reset_to_idle();
    app.view.phase = DownloadPhase::Failed;
    app.view.error_message = Some(e.to_string());
}
