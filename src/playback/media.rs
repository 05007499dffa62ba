//! Narrow view of the media element and the container it lives in.

use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

use crate::errors::PlayRejected;
use crate::utils::UrlUtils;

/// Answer of a native MIME-type support query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanPlay {
    No,
    Maybe,
    Probably,
}

impl CanPlay {
    /// Parse the DOM-style answer (`""`, `"maybe"`, `"probably"`).
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_ascii_lowercase().as_str() {
            "probably" => CanPlay::Probably,
            "maybe" => CanPlay::Maybe,
            _ => CanPlay::No,
        }
    }

    pub fn is_supported(self) -> bool {
        !matches!(self, CanPlay::No)
    }
}

/// An audio-capable media element.
#[async_trait]
pub trait MediaElement: Send + Sync {
    /// Source currently selected for playback
    fn current_src(&self) -> Option<String>;

    /// Configured `src` attribute
    fn src_attribute(&self) -> Option<String>;

    /// `src` of a nested source sub-element
    fn source_child_src(&self) -> Option<String>;

    fn can_play_type(&self, mime_type: &str) -> CanPlay;

    fn set_src(&self, url: &str);

    async fn play(&self) -> Result<(), PlayRejected>;
}

/// Container holding at most one preview audio element.
pub trait MediaContainer: Send + Sync {
    fn preview_audio(&self) -> Option<Arc<dyn MediaElement>>;
}

/// Looks containers up by their fixed identifier.
pub trait MediaHost: Send + Sync {
    fn container(&self, id: &str) -> Option<Arc<dyn MediaContainer>>;
}

/// The element's playing source: current source, then the `src` attribute,
/// then a nested source element. Blank values count as absent.
pub fn current_source(element: &dyn MediaElement) -> Option<String> {
    [
        element.current_src(),
        element.src_attribute(),
        element.source_child_src(),
    ]
    .into_iter()
    .flatten()
    .find(|src| !src.trim().is_empty())
}

/// Classification of a media source URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Hls,
    Other,
}

impl SourceKind {
    /// `Hls` when the URL path ends in `.m3u8`/`.m3u`. Unparsable URLs fall
    /// back to a substring check.
    pub fn classify(src: &str) -> Self {
        let is_hls = match Url::parse(src) {
            Ok(url) => UrlUtils::has_playlist_extension(&url),
            Err(_) => UrlUtils::mentions_playlist_extension(src),
        };
        if is_hls {
            SourceKind::Hls
        } else {
            SourceKind::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Sources(Option<&'static str>, Option<&'static str>, Option<&'static str>);

    #[async_trait]
    impl MediaElement for Sources {
        fn current_src(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
        fn src_attribute(&self) -> Option<String> {
            self.1.map(str::to_string)
        }
        fn source_child_src(&self) -> Option<String> {
            self.2.map(str::to_string)
        }
        fn can_play_type(&self, _mime_type: &str) -> CanPlay {
            CanPlay::No
        }
        fn set_src(&self, _url: &str) {}
        async fn play(&self) -> Result<(), PlayRejected> {
            Ok(())
        }
    }

    #[test]
    fn current_source_prefers_resolved_source() {
        let element = Sources(Some("https://a/1.m3u8"), Some("https://a/2.mp3"), None);
        assert_eq!(current_source(&element).as_deref(), Some("https://a/1.m3u8"));
    }

    #[test]
    fn current_source_falls_back_in_order() {
        let element = Sources(Some(""), None, Some("https://a/child.m3u8"));
        assert_eq!(current_source(&element).as_deref(), Some("https://a/child.m3u8"));

        let element = Sources(None, Some("https://a/attr.mp3"), Some("https://a/child.m3u8"));
        assert_eq!(current_source(&element).as_deref(), Some("https://a/attr.mp3"));

        assert_eq!(current_source(&Sources(None, None, None)), None);
    }

    #[rstest]
    #[case("https://cdn.example/live.m3u8", SourceKind::Hls)]
    #[case("https://cdn.example/LIVE.M3U8?token=x", SourceKind::Hls)]
    #[case("https://cdn.example/radio.m3u", SourceKind::Hls)]
    #[case("https://cdn.example/track.mp3", SourceKind::Other)]
    #[case("https://cdn.example/get?f=live.m3u8", SourceKind::Other)]
    #[case("relative/live.m3u8", SourceKind::Hls)]
    #[case("relative/track.ogg", SourceKind::Other)]
    fn classify_sources(#[case] src: &str, #[case] expected: SourceKind) {
        assert_eq!(SourceKind::classify(src), expected);
    }

    #[test]
    fn can_play_answers() {
        assert_eq!(CanPlay::from_answer(""), CanPlay::No);
        assert_eq!(CanPlay::from_answer("maybe"), CanPlay::Maybe);
        assert!(CanPlay::from_answer("probably").is_supported());
        assert!(!CanPlay::from_answer("no").is_supported());
    }
}
