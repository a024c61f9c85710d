mod app;
mod application;
mod config;
mod domain;
mod logging;
mod ui;
mod utils;
mod ytdlp;

use iced::window;

use crate::config::AppConfig;

fn main() -> iced::Result {
    let config = AppConfig::default();
    logging::init_tracing(&config.log_dir);

    let icon = config.icon_path.as_deref().and_then(|path| {
        let img = image::open(path).ok()?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        window::icon::from_rgba(rgba.into_raw(), width, height).ok()
    });

    iced::application(
        move || app::DownloadApp::new(config.clone()),
        app::update,
        app::view,
    )
    .title("YouTube Downloader")
    .window(window::Settings {
        icon,
        ..Default::default()
    })
    .run()
}
