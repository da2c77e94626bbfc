use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static YOUTUBE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/)([^&\n?#]+)").unwrap(),
        Regex::new(r"youtube\.com/embed/([^&\n?#]+)").unwrap(),
        Regex::new(r"youtube\.com/v/([^&\n?#]+)").unwrap(),
    ]
});

static VIMEO_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"vimeo\.com/([0-9]+)").unwrap());

/// Hosting service a video link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoProvider {
    YouTube,
    Vimeo,
    Unknown,
}

/// A link resolved to its provider and provider-specific id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoReference {
    pub provider: VideoProvider,
    pub id: String,
}

impl VideoReference {
    /// `None` when the provider is unknown or no id could be extracted.
    pub fn resolve(url: &str) -> Option<Self> {
        let provider = detect_provider(url);
        let id = match provider {
            VideoProvider::YouTube => extract_youtube_id(url)?,
            VideoProvider::Vimeo => extract_vimeo_id(url)?,
            VideoProvider::Unknown => return None,
        };

        Some(Self {
            provider,
            id: id.to_owned(),
        })
    }

    pub fn embed_url(&self) -> String {
        match self.provider {
            VideoProvider::YouTube => {
                format!("https://www.youtube.com/embed/{}?enablejsapi=1", self.id)
            }
            VideoProvider::Vimeo => format!("https://player.vimeo.com/video/{}", self.id),
            // `resolve` never builds an unknown reference
            VideoProvider::Unknown => String::new(),
        }
    }

    /// Only YouTube has a static thumbnail URL.
    pub fn thumbnail_url(&self) -> Option<String> {
        match self.provider {
            VideoProvider::YouTube => Some(format!(
                "https://img.youtube.com/vi/{}/maxresdefault.jpg",
                self.id
            )),
            VideoProvider::Vimeo | VideoProvider::Unknown => None,
        }
    }
}

pub fn detect_provider(url: &str) -> VideoProvider {
    if url.contains("youtube.com") || url.contains("youtu.be") {
        VideoProvider::YouTube
    } else if url.contains("vimeo.com") {
        VideoProvider::Vimeo
    } else {
        VideoProvider::Unknown
    }
}

pub fn extract_youtube_id(url: &str) -> Option<&str> {
    YOUTUBE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

pub fn extract_vimeo_id(url: &str) -> Option<&str> {
    VIMEO_PATTERN
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

pub fn embed_url(url: &str) -> Option<String> {
    VideoReference::resolve(url).map(|reference| reference.embed_url())
}

pub fn is_valid_video_url(url: &str) -> bool {
    VideoReference::resolve(url).is_some()
}

pub fn thumbnail_url(url: &str) -> Option<String> {
    VideoReference::resolve(url).and_then(|reference| reference.thumbnail_url())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_providers_by_host() {
        assert_eq!(
            detect_provider("https://www.youtube.com/watch?v=abc"),
            VideoProvider::YouTube
        );
        assert_eq!(detect_provider("https://youtu.be/abc"), VideoProvider::YouTube);
        assert_eq!(detect_provider("https://vimeo.com/42"), VideoProvider::Vimeo);
        assert_eq!(detect_provider("https://example.com/x"), VideoProvider::Unknown);
    }

    #[test]
    fn extracts_youtube_ids_from_every_url_shape() {
        assert_eq!(
            extract_youtube_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(extract_youtube_id("https://youtu.be/abc123?si=x"), Some("abc123"));
        assert_eq!(
            extract_youtube_id("https://www.youtube.com/embed/xyz#frag"),
            Some("xyz")
        );
        assert_eq!(extract_youtube_id("https://www.youtube.com/v/legacy"), Some("legacy"));
        assert_eq!(extract_youtube_id("https://www.youtube.com/channel/foo"), None);
    }

    #[test]
    fn vimeo_ids_must_be_numeric() {
        assert_eq!(extract_vimeo_id("https://vimeo.com/123456"), Some("123456"));
        assert_eq!(extract_vimeo_id("https://vimeo.com/channels/staff"), None);
    }

    #[test]
    fn validates_video_urls() {
        assert!(is_valid_video_url("https://youtu.be/abc123"));
        assert!(is_valid_video_url("https://vimeo.com/123456"));
        assert!(!is_valid_video_url("https://example.com/x"));
        assert!(!is_valid_video_url("https://vimeo.com/about"));
    }

    #[test]
    fn builds_embed_urls() {
        assert_eq!(
            embed_url("https://youtu.be/abc123").as_deref(),
            Some("https://www.youtube.com/embed/abc123?enablejsapi=1")
        );
        assert_eq!(
            embed_url("https://vimeo.com/123456").as_deref(),
            Some("https://player.vimeo.com/video/123456")
        );
        assert_eq!(embed_url("https://example.com/x"), None);
    }

    #[test]
    fn thumbnails_only_for_youtube() {
        assert_eq!(
            thumbnail_url("https://www.youtube.com/watch?v=abc").as_deref(),
            Some("https://img.youtube.com/vi/abc/maxresdefault.jpg")
        );
        assert_eq!(thumbnail_url("https://vimeo.com/123456"), None);
        assert_eq!(thumbnail_url("https://example.com/x"), None);
    }
}
