use std::fs::{File, FileTimes};
use std::path::Path;
use std::time::SystemTime;

use url::Url;

const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "youtu.be", "music.youtube.com"];

/// Whether the input parses as an http(s) URL on a YouTube host.
pub fn is_youtube_url(input: &str) -> bool {
    let Ok(url) = Url::parse(input) else {
        return false;
    };
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }
    match url.host_str() {
        Some(host) => {
            let host = host.to_lowercase();
            YOUTUBE_HOSTS
                .iter()
                .any(|d| host == *d || host.ends_with(&format!(".{}", d)))
        }
        None => false,
    }
}

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Set the file's modification and access times to now, marking when the
/// download actually finished rather than when yt-dlp wrote the last byte.
pub fn touch_file(path: &Path) -> std::io::Result<()> {
    let now = SystemTime::now();
    let file = File::options().write(true).open(path)?;
    file.set_times(FileTimes::new().set_accessed(now).set_modified(now))
}
