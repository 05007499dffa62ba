//! Lightweight manifest inspection.
//!
//! Only what resolution needs: deciding whether a response is a playlist and
//! walking its URI reference lines. Variant selection and segment enumeration
//! are left to the playback client.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::utils::UrlUtils;

/// Content types treated as a playlist. `text/plain` is deliberately broad:
/// manifest servers often mislabel M3U bodies, at the cost of occasionally
/// treating an ordinary text asset as a manifest.
static PLAYLIST_CONTENT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)mpegurl|m3u|text/plain").expect("static playlist content-type regex")
});

pub fn is_playlist_content_type(content_type: &str) -> bool {
    PLAYLIST_CONTENT_TYPE.is_match(content_type)
}

/// A response is a playlist if either its final URL or its declared content
/// type says so.
pub fn is_playlist_response(final_url: &Url, content_type: Option<&str>) -> bool {
    UrlUtils::has_playlist_extension(final_url)
        || content_type.is_some_and(is_playlist_content_type)
}

/// Non-blank, non-directive lines of a manifest body, trimmed, in document order.
/// A leading byte order mark is ignored.
pub fn reference_lines(body: &str) -> impl Iterator<Item = &str> {
    body.strip_prefix('\u{feff}')
        .unwrap_or(body)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}
