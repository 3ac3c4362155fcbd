//! Library layout: filesystem-safe names and the `category/channel/title` hierarchy

use crate::extractor::VideoInfo;
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};

/// Used when a segment has nothing left after sanitization
pub const PLACEHOLDER_SEGMENT: &str = "unnamed";

/// Maximum characters kept per path segment
pub const MAX_SEGMENT_LEN: usize = 200;

// Characters invalid on Windows/macOS/Linux filesystems
const INVALID_CHARS: [char; 9] = ['<', '>', ':', '"', '|', '?', '*', '/', '\\'];

const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

fn is_trimmed(c: char) -> bool {
    c.is_whitespace() || c == '.'
}

/// Sanitizes a single path segment.
///
/// # Security
/// - Replaces separators, so a segment never adds directory levels
/// - Removes leading/trailing dots (no hidden files, no `.`/`..`)
/// - Replaces invalid filesystem and control characters with `_`
/// - Avoids Windows device names
/// - Limits length to 200 characters
///
/// The result is never empty and sanitizing it again returns it unchanged.
///
/// # Examples
/// ```
/// use vodloader::utils::organizer::sanitize_segment;
/// assert_eq!(sanitize_segment("Finals_2014-08-01T18:30"), "Finals_2014-08-01T18_30");
/// assert_eq!(sanitize_segment("../../etc/passwd"), "_.._etc_passwd");
/// assert_eq!(sanitize_segment("..."), "unnamed");
/// ```
pub fn sanitize_segment(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if INVALID_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_matches(is_trimmed);
    let mut sanitized: String = if trimmed.chars().count() > MAX_SEGMENT_LEN {
        trimmed
            .chars()
            .take(MAX_SEGMENT_LEN)
            .collect::<String>()
            .trim_end_matches(is_trimmed)
            .to_string()
    } else {
        trimmed.to_string()
    };

    if sanitized.is_empty() {
        return PLACEHOLDER_SEGMENT.to_string();
    }

    let stem_len = sanitized.split('.').next().unwrap_or_default().len();
    if RESERVED_NAMES
        .iter()
        .any(|r| r.eq_ignore_ascii_case(&sanitized[..stem_len]))
    {
        sanitized.insert(stem_len, '_');
        if sanitized.chars().count() > MAX_SEGMENT_LEN {
            sanitized.pop();
            sanitized = sanitized.trim_end_matches(is_trimmed).to_string();
        }
    }

    sanitized
}

/// Sanitizes a relative path whose `/` or `\` separators are intended.
///
/// Segments that are empty in the input (`a//b`, leading `/`) are dropped, so the
/// result is always relative. Every other segment goes through [`sanitize_segment`]
/// and the segments are rejoined with the platform separator.
pub fn sanitize_path(path: &str) -> String {
    let segments: Vec<String> = path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .map(sanitize_segment)
        .collect();

    if segments.is_empty() {
        return PLACEHOLDER_SEGMENT.to_string();
    }
    segments.join(MAIN_SEPARATOR_STR)
}

/// `download_folder/<category>/<channel>/<title>_<start_time>`, without extension
pub fn destination_path(download_folder: &Path, info: &VideoInfo) -> PathBuf {
    download_folder
        .join(sanitize_segment(info.category()))
        .join(sanitize_segment(&info.channel_name))
        .join(sanitize_segment(&format!(
            "{}_{}",
            info.title, info.start_time
        )))
}
