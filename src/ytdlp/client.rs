use std::process::Stdio;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::models::VideoMetadata;
use crate::domain::MediaType;

const METADATA_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum YtDlpError {
    #[error("Failed to start {tool}: {source_msg}")]
    Spawn { tool: String, source_msg: String },

    #[error("yt-dlp exited with an error: {0}")]
    Tool(String),

    #[error("Invalid metadata payload: {0}")]
    InvalidPayload(String),

    #[error("Timed out after {0}s waiting for yt-dlp")]
    Timeout(u64),
}

pub type Result<T> = std::result::Result<T, YtDlpError>;

/// Thin wrapper around the `yt-dlp` binary. Cheap to clone; each call spawns
/// a fresh child process.
#[derive(Debug, Clone)]
pub struct YtDlpClient {
    ytdlp_path: String,
    ffmpeg_path: String,
}

impl YtDlpClient {
    pub fn new(ytdlp_path: String, ffmpeg_path: String) -> Self {
        Self {
            ytdlp_path,
            ffmpeg_path,
        }
    }

    /// Fetch the structured description of a video without downloading it.
    pub async fn fetch_metadata(&self, url: &str, media_type: MediaType) -> Result<VideoMetadata> {
        let args = [
            "--dump-json",
            "--no-playlist",
            "--quiet",
            "--no-warnings",
            "-f",
            media_type.format_hint(),
            "--ffmpeg-location",
            &self.ffmpeg_path,
            url,
        ];
        debug!(url, ?media_type, "fetching metadata via yt-dlp");

        let child = Command::new(&self.ytdlp_path)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| YtDlpError::Spawn {
                tool: self.ytdlp_path.clone(),
                source_msg: e.to_string(),
            })?;

        let output = timeout(
            Duration::from_secs(METADATA_TIMEOUT_SECS),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| YtDlpError::Timeout(METADATA_TIMEOUT_SECS))?
        .map_err(|e| YtDlpError::Tool(e.to_string()))?;

        if !output.status.success() {
            return Err(YtDlpError::Tool(stderr_tail(&output.stderr)));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| YtDlpError::InvalidPayload(e.to_string()))
    }

    /// Start a download and hand back the running process. The caller drains
    /// progress lines and then waits for the exit status.
    pub fn start_download(&self, mut args: Vec<String>, url: &str) -> Result<DownloadProcess> {
        args.push("--ffmpeg-location".to_string());
        args.push(self.ffmpeg_path.clone());
        args.push(url.to_string());
        debug!(tool = %self.ytdlp_path, ?args, "spawning yt-dlp download");

        let mut child = Command::new(&self.ytdlp_path)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| YtDlpError::Spawn {
                tool: self.ytdlp_path.clone(),
                source_msg: e.to_string(),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| YtDlpError::Tool(
            "Failed to capture yt-dlp stdout".to_string(),
        ))?;
        let mut stderr = child.stderr.take().ok_or_else(|| YtDlpError::Tool(
            "Failed to capture yt-dlp stderr".to_string(),
        ))?;

        // Drain stderr concurrently so the child never blocks on a full pipe.
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            buf
        });

        Ok(DownloadProcess {
            child,
            lines: BufReader::new(stdout).lines(),
            stderr_task,
        })
    }
}

/// A running yt-dlp download: line-oriented stdout plus the exit status.
pub struct DownloadProcess {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    stderr_task: JoinHandle<Vec<u8>>,
}

impl DownloadProcess {
    /// Next stdout line, or `None` once the process closes its pipe.
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.next_line().await.ok().flatten()
    }

    /// Wait for the child to exit; a non-zero status turns into an error
    /// carrying the tail of stderr.
    pub async fn finish(mut self) -> Result<()> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| YtDlpError::Tool(e.to_string()))?;
        let stderr = self.stderr_task.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(YtDlpError::Tool(stderr_tail(&stderr)))
        }
    }
}

/// Last few stderr lines, which is where yt-dlp puts the actual ERROR.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return "yt-dlp reported no error output".to_string();
    }
    lines[lines.len().saturating_sub(5)..].join("\n")
}

/// Parse a `--newline` progress line like
/// `[download]  42.1% of 12.34MiB at 1.20MiB/s ETA 00:07`
/// into a 0.0..=1.0 fraction.
pub fn parse_progress(line: &str) -> Option<f32> {
    static PROGRESS_RE: OnceLock<Regex> = OnceLock::new();
    let re = PROGRESS_RE
        .get_or_init(|| Regex::new(r"\[download\]\s+(\d+\.?\d*)%").expect("valid progress regex"));

    let caps = re.captures(line)?;
    let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
    Some((percent / 100.0).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progress_line() {
        let line = "[download]  42.1% of 12.34MiB at 1.20MiB/s ETA 00:07";
        let fraction = parse_progress(line).unwrap();
        assert!((fraction - 0.421).abs() < 1e-4);
    }

    #[test]
    fn test_parse_progress_complete() {
        let line = "[download] 100% of 12.34MiB in 00:10";
        assert_eq!(parse_progress(line), Some(1.0));
    }

    #[test]
    fn test_parse_progress_ignores_other_lines() {
        assert_eq!(parse_progress("[ExtractAudio] Destination: song.mp3"), None);
        assert_eq!(parse_progress("[download] Destination: song.webm"), None);
    }

    #[test]
    fn test_stderr_tail_takes_last_lines() {
        let stderr = b"line1\nline2\nline3\nline4\nline5\nline6\nERROR: boom\n";
        let tail = stderr_tail(stderr);
        assert!(tail.contains("ERROR: boom"));
        assert!(!tail.contains("line1"));
    }

    #[test]
    fn test_stderr_tail_empty() {
        assert_eq!(stderr_tail(b""), "yt-dlp reported no error output");
    }
}
