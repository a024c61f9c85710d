use iced::{
    widget::{
        button, center, column, container, mouse_area, opaque, progress_bar, radio, row,
        scrollable, stack, text, text_input, Space,
    },
    Element, Length,
};

use crate::domain::{DownloadPhase, MediaType, VideoResolution};

/// Main view state
pub struct DownloadView {
    pub youtube_url: String,
    pub media_type: MediaType,
    pub status_message: String,
    pub phase: DownloadPhase,
    pub download_progress: f32,
    pub error_message: Option<String>,
    pub resolution_choices: Vec<VideoResolution>,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            youtube_url: String::new(),
            media_type: MediaType::Audio,
            status_message: "Paste a YouTube link to download".to_string(),
            phase: DownloadPhase::Idle,
            download_progress: 0.0,
            error_message: None,
            resolution_choices: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    MediaTypePicked(MediaType),
    DownloadPressed,
    ResolutionChosen(VideoResolution),
    ResolutionCancelled,
    ErrorDismissed,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => {
                self.youtube_url = url;
            }
            DownloadMessage::MediaTypePicked(media_type) => {
                self.media_type = media_type;
            }
            // The remaining messages drive the request lifecycle and are
            // handled by the app.
            DownloadMessage::DownloadPressed
            | DownloadMessage::ResolutionChosen(_)
            | DownloadMessage::ResolutionCancelled
            | DownloadMessage::ErrorDismissed => {}
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            DownloadPhase::FetchingMetadata
                | DownloadPhase::ChoosingResolution
                | DownloadPhase::Downloading
        )
    }

    /// Return the UI to its idle state after a finished or failed request.
    pub fn reset_to_idle(&mut self) {
        self.phase = DownloadPhase::Idle;
        self.download_progress = 0.0;
        self.status_message.clear();
        self.resolution_choices.clear();
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let mut download_button = button("Download").padding([10, 20]);
        if !self.is_busy() {
            download_button = download_button.on_press(DownloadMessage::DownloadPressed);
        }

        let mut content = column![
            text("YouTube Downloader").size(32),
            Space::new().height(Length::Fixed(20.0)),
            text("YouTube video link:").size(16),
            text_input("https://www.youtube.com/watch?v=...", &self.youtube_url)
                .on_input(DownloadMessage::UrlChanged)
                .padding(10),
            Space::new().height(Length::Fixed(10.0)),
            radio(
                "Download as MP3",
                MediaType::Audio,
                Some(self.media_type),
                DownloadMessage::MediaTypePicked,
            ),
            radio(
                "Download as MP4",
                MediaType::Video,
                Some(self.media_type),
                DownloadMessage::MediaTypePicked,
            ),
            Space::new().height(Length::Fixed(20.0)),
            download_button,
            Space::new().height(Length::Fixed(10.0)),
            text(&self.status_message).size(14),
        ]
        .padding(20)
        .spacing(10);

        if self.phase == DownloadPhase::Downloading {
            content = content.push(progress_bar(0.0..=1.0, self.download_progress));
        }

        let base: Element<'_, DownloadMessage> = content.into();

        if let Some(message) = &self.error_message {
            return modal(base, self.error_card(message), DownloadMessage::ErrorDismissed);
        }

        if self.phase == DownloadPhase::ChoosingResolution {
            return modal(
                base,
                self.resolution_card(),
                DownloadMessage::ResolutionCancelled,
            );
        }

        base
    }

    /// Modal error card: title, scrollable read-only message, close button.
    fn error_card<'a>(&'a self, message: &'a str) -> Element<'a, DownloadMessage> {
        container(
            column![
                text("An error occurred").size(20),
                scrollable(text(message).size(14)).height(Length::Fixed(150.0)),
                button("Close")
                    .on_press(DownloadMessage::ErrorDismissed)
                    .padding([8, 16]),
            ]
            .spacing(15),
        )
        .width(Length::Fixed(400.0))
        .padding(20)
        .style(container::rounded_box)
        .into()
    }

    /// Modal prompt for the 1080p/720p choice in video mode.
    fn resolution_card(&self) -> Element<'_, DownloadMessage> {
        let mut choices = row![].spacing(10);
        for resolution in &self.resolution_choices {
            choices = choices.push(
                button(text(resolution.label()))
                    .on_press(DownloadMessage::ResolutionChosen(*resolution))
                    .padding([8, 16]),
            );
        }

        container(
            column![
                text("Choose resolution").size(20),
                text("Which quality do you want to download?").size(14),
                choices,
                button("Cancel")
                    .on_press(DownloadMessage::ResolutionCancelled)
                    .padding([8, 16]),
            ]
            .spacing(15),
        )
        .width(Length::Fixed(320.0))
        .padding(20)
        .style(container::rounded_box)
        .into()
    }
}

/// Overlay `content` on top of `base`; clicking outside emits `on_blur`.
fn modal<'a, Message: Clone + 'a>(
    base: Element<'a, Message>,
    content: Element<'a, Message>,
    on_blur: Message,
) -> Element<'a, Message> {
    stack![
        base,
        opaque(mouse_area(center(opaque(content))).on_press(on_blur))
    ]
    .into()
}
