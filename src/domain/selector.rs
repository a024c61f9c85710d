//! Picks one format out of the list yt-dlp reports for a video.
//!
//! Audio mode wants the highest average bitrate; video mode is restricted to
//! 720p/1080p and lets the user pick between the two.

use crate::domain::{AppError, VideoResolution};
use crate::ytdlp::FormatCandidate;

/// Best audio candidate: maximum `abr`, a missing bitrate compares as zero.
/// Ties keep the first entry in list order.
pub fn select_audio(formats: &[FormatCandidate]) -> Result<&FormatCandidate, AppError> {
    if formats.is_empty() {
        return Err(AppError::NoFormats);
    }

    let mut best = &formats[0];
    for candidate in &formats[1..] {
        if candidate.abr.unwrap_or(0.0) > best.abr.unwrap_or(0.0) {
            best = candidate;
        }
    }
    Ok(best)
}

/// The subset of heights the video path offers, in the order we present them.
pub fn available_resolutions(formats: &[FormatCandidate]) -> Vec<VideoResolution> {
    [VideoResolution::P1080, VideoResolution::P720]
        .into_iter()
        .filter(|res| formats.iter().any(|f| f.height == Some(res.height())))
        .collect()
}

/// Video candidate matching the resolution the user chose.
///
/// An empty format list and "nothing at 720/1080" are distinct failures; the
/// chosen height having no candidate also counts as "no acceptable format".
pub fn select_video(
    formats: &[FormatCandidate],
    chosen: VideoResolution,
) -> Result<&FormatCandidate, AppError> {
    if formats.is_empty() {
        return Err(AppError::NoFormats);
    }

    let acceptable: Vec<&FormatCandidate> = formats
        .iter()
        .filter(|f| matches!(f.height, Some(720) | Some(1080)))
        .collect();
    if acceptable.is_empty() {
        return Err(AppError::NoAcceptableFormat);
    }

    acceptable
        .into_iter()
        .find(|f| f.height == Some(chosen.height()))
        .ok_or(AppError::NoAcceptableFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(id: &str, abr: Option<f64>) -> FormatCandidate {
        FormatCandidate {
            format_id: id.to_string(),
            abr,
            height: None,
        }
    }

    fn video(id: &str, height: Option<u32>) -> FormatCandidate {
        FormatCandidate {
            format_id: id.to_string(),
            abr: None,
            height,
        }
    }

    #[test]
    fn audio_picks_max_bitrate() {
        let formats = vec![
            audio("a", Some(128.0)),
            audio("b", Some(256.0)),
            audio("c", Some(192.0)),
        ];
        assert_eq!(select_audio(&formats).unwrap().format_id, "b");
    }

    #[test]
    fn audio_tie_keeps_first_in_list_order() {
        let formats = vec![audio("first", Some(160.0)), audio("second", Some(160.0))];
        assert_eq!(select_audio(&formats).unwrap().format_id, "first");
    }

    #[test]
    fn audio_missing_bitrate_counts_as_zero() {
        let formats = vec![audio("unknown", None), audio("known", Some(96.0))];
        assert_eq!(select_audio(&formats).unwrap().format_id, "known");
    }

    #[test]
    fn audio_all_unknown_bitrates_returns_first() {
        let formats = vec![audio("x", None), audio("y", None)];
        assert_eq!(select_audio(&formats).unwrap().format_id, "x");
    }

    #[test]
    fn audio_empty_list_is_no_formats() {
        assert!(matches!(select_audio(&[]), Err(AppError::NoFormats)));
    }

    #[test]
    fn video_empty_list_distinct_from_no_acceptable() {
        assert!(matches!(
            select_video(&[], VideoResolution::P720),
            Err(AppError::NoFormats)
        ));
        let formats = vec![video("v", Some(480)), video("w", Some(360))];
        assert!(matches!(
            select_video(&formats, VideoResolution::P720),
            Err(AppError::NoAcceptableFormat)
        ));
    }

    #[test]
    fn video_choice_returns_exactly_that_height() {
        let formats = vec![
            video("sd", Some(480)),
            video("hd", Some(720)),
            video("fhd", Some(1080)),
        ];
        assert_eq!(
            select_video(&formats, VideoResolution::P1080)
                .unwrap()
                .format_id,
            "fhd"
        );
        assert_eq!(
            select_video(&formats, VideoResolution::P720)
                .unwrap()
                .format_id,
            "hd"
        );
    }

    #[test]
    fn video_chosen_height_absent_is_no_acceptable() {
        let formats = vec![video("hd", Some(720))];
        assert!(matches!(
            select_video(&formats, VideoResolution::P1080),
            Err(AppError::NoAcceptableFormat)
        ));
    }

    #[test]
    fn available_resolutions_orders_1080_first() {
        let formats = vec![
            video("hd", Some(720)),
            video("fhd", Some(1080)),
            video("sd", Some(480)),
        ];
        assert_eq!(
            available_resolutions(&formats),
            vec![VideoResolution::P1080, VideoResolution::P720]
        );
        assert!(available_resolutions(&[video("sd", Some(360))]).is_empty());
    }
}
