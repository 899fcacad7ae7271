use url::Url;

use crate::TranscriptError;

/// Characters replaced when a video title becomes a file name
const FILENAME_RESERVED: &[char] = &['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

/// Longest title prefix kept in an exported file name
const MAX_TITLE_CHARS: usize = 50;

/// Check that `url` points at a watch page and pull out its `v` parameter.
///
/// No network access happens here, so callers can reject bad input before
/// loading anything.
pub fn video_id_from_url(url: &str) -> Result<String, TranscriptError> {
    if !url.contains("youtube.com/watch") {
        return Err(TranscriptError::NotAVideoPage);
    }

    let parsed = Url::parse(url).map_err(|_| TranscriptError::VideoIdMissing)?;

    parsed
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
        .ok_or(TranscriptError::VideoIdMissing)
}

/// Join caption fragments with single spaces and trim the result.
///
/// Empty fragments are skipped so a missing node never doubles a separator.
pub fn join_segments<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for segment in segments {
        let segment = segment.as_ref();
        if segment.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push(' ');
        }
        joined.push_str(segment);
    }
    joined.trim().to_string()
}

/// Turn a video title into a safe file name stem
pub fn sanitize_filename(title: &str) -> String {
    title
        .trim()
        .chars()
        .map(|c| if FILENAME_RESERVED.contains(&c) { '-' } else { c })
        .take(MAX_TITLE_CHARS)
        .collect()
}

/// File name used when exporting a summary
pub fn summary_filename(title: Option<&str>) -> String {
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => format!("{}-summary.txt", sanitize_filename(title)),
        None => "youtube-summary.txt".to_string(),
    }
}

/// Render an ISO-8601 duration such as `PT1H2M3S` the way the player does
pub fn format_iso8601_duration(value: &str) -> Option<String> {
    let rest = value.strip_prefix("PT")?;
    let (mut hours, mut minutes, mut seconds) = (0u64, 0u64, 0u64);
    let mut number = String::new();

    for c in rest.chars() {
        match c {
            '0'..='9' => number.push(c),
            'H' | 'M' | 'S' => {
                let parsed = number.parse::<u64>().ok()?;
                number.clear();
                match c {
                    'H' => hours = parsed,
                    'M' => minutes = parsed,
                    _ => seconds = parsed,
                }
            }
            _ => return None,
        }
    }

    if !number.is_empty() {
        return None;
    }

    // the watch page reports e.g. PT75M12S for long videos
    let total = hours * 3600 + minutes * 60 + seconds;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);

    if h > 0 {
        Some(format!("{}:{:02}:{:02}", h, m, s))
    } else {
        Some(format!("{}:{:02}", m, s))
    }
}

/// Hide all but the last four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let visible: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), visible)
}
