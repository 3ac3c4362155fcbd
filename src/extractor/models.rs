//! Data structures for broadcast information

use serde::Deserialize;

/// Category used when the API reports no game for a broadcast
pub const NO_META_GAME: &str = "no_meta_game";

/// Broadcast information structure
#[derive(Debug, Clone, Default)]
pub struct VideoInfo {
    pub broadcast_id: String,
    pub title: String,
    pub channel_name: String,
    pub meta_game: Option<String>,
    pub start_time: String,
    pub renditions: Vec<Rendition>,
}

impl VideoInfo {
    /// Category folder name, never empty
    pub fn category(&self) -> &str {
        match self.meta_game.as_deref() {
            Some(game) if !game.trim().is_empty() => game,
            _ => NO_META_GAME,
        }
    }

    /// Quality labels in the order the API listed them
    pub fn quality_labels(&self) -> Vec<String> {
        self.renditions.iter().map(|r| r.quality.clone()).collect()
    }
}

/// One quality variant of a broadcast
#[derive(Debug, Clone, PartialEq)]
pub struct Rendition {
    pub quality: String,
    pub chunks: Vec<Chunk>,
}

impl Rendition {
    /// Total length in seconds, when the API reported lengths for every chunk
    pub fn duration(&self) -> Option<u64> {
        self.chunks.iter().map(|c| c.length).sum()
    }
}

/// A sequential piece of a rendition's media
/// Deserialized straight from the API's chunk table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Chunk {
    pub url: String,
    #[serde(default)]
    pub length: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_substitutes_missing_game() {
        let mut info = VideoInfo::default();
        assert_eq!(info.category(), "no_meta_game");

        info.meta_game = Some("  ".to_string());
        assert_eq!(info.category(), "no_meta_game");

        info.meta_game = Some("StarCraft II".to_string());
        assert_eq!(info.category(), "StarCraft II");
    }

    #[test]
    fn test_rendition_duration() {
        let chunk = |length| Chunk {
            url: "http://example.com/a.flv".to_string(),
            length,
        };
        let full = Rendition {
            quality: "source".to_string(),
            chunks: vec![chunk(Some(1800)), chunk(Some(600))],
        };
        assert_eq!(full.duration(), Some(2400));

        let partial = Rendition {
            quality: "source".to_string(),
            chunks: vec![chunk(Some(1800)), chunk(None)],
        };
        assert_eq!(partial.duration(), None);
    }
}
