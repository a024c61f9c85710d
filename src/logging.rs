use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "yt_downloader.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Route tracing output to a plain-text file under `log_dir`, creating the
/// directory on demand. Falls back to stderr if the directory is unusable.
pub fn init_tracing(log_dir: &Path) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "simple_youtube_downloader=debug".into());

    if let Err(err) = std::fs::create_dir_all(log_dir) {
        eprintln!("Failed to create log directory {}: {err}", log_dir.display());
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        return;
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .try_init();
}
