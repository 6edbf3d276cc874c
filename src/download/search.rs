//! Track search across the YouTube and SoundCloud indexes.
//!
//! The searcher issues a fixed, ordered set of query variants against the
//! extractor and accumulates results up to a limit. The variant order is a
//! best-effort diversity heuristic, not a correctness guarantee.

use crate::core::config;
use crate::extractor::{Extractor, RawEntry};
use std::sync::Arc;

/// Where a search result came from, classified by its canonical URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePlatform {
    YouTube,
    SoundCloud,
}

impl SourcePlatform {
    /// SoundCloud when the canonical URL carries the SoundCloud domain,
    /// YouTube otherwise.
    pub fn classify(url: &str) -> Self {
        if url.contains("soundcloud.com") {
            SourcePlatform::SoundCloud
        } else {
            SourcePlatform::YouTube
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourcePlatform::YouTube => "YouTube",
            SourcePlatform::SoundCloud => "SoundCloud",
        }
    }
}

/// One candidate track from a search.
///
/// Immutable once built; lives only as long as the chat session that
/// displays the result list.
#[derive(Debug, Clone)]
pub struct Track {
    pub title: String,
    pub uploader: String,
    /// Seconds; 0.0 = unknown
    pub duration_secs: f64,
    /// Canonical page URL, used for the later download
    pub url: String,
    pub id: String,
    pub thumbnail: String,
    pub source: SourcePlatform,
}

impl Track {
    /// Maps an extractor entry into a track, defaulting missing fields.
    fn from_entry(entry: RawEntry) -> Self {
        let url = entry.webpage_url.unwrap_or_default();
        Self {
            title: entry.title.unwrap_or_else(|| "Unknown".to_string()),
            uploader: entry.uploader.unwrap_or_else(|| "Unknown".to_string()),
            duration_secs: entry.duration.unwrap_or(0.0),
            id: entry.id.unwrap_or_default(),
            thumbnail: entry.thumbnail.unwrap_or_default(),
            source: SourcePlatform::classify(&url),
            url,
        }
    }
}

/// Search tuning passed in at construction.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Result cap when the caller does not pass one
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: config::search::DEFAULT_LIMIT,
        }
    }
}

/// Issues query variants against the extractor and merges the results.
pub struct TrackSearcher {
    extractor: Arc<dyn Extractor>,
    config: SearchConfig,
}

impl TrackSearcher {
    pub fn new(extractor: Arc<dyn Extractor>, config: SearchConfig) -> Self {
        Self { extractor, config }
    }

    pub fn default_limit(&self) -> usize {
        self.config.default_limit
    }

    /// Ordered query variants: general index, audio-platform index, then the
    /// "music" / "remix" flavored repeats.
    fn query_variants(query: &str, limit: usize) -> [String; 4] {
        [
            format!("ytsearch{limit}:{query}"),
            format!("scsearch{limit}:{query}"),
            format!("ytsearch{limit}:{query} music"),
            format!("scsearch{limit}:{query} remix"),
        ]
    }

    /// Searches YouTube and SoundCloud for `query`, returning at most
    /// `limit` tracks.
    ///
    /// Variants run strictly in order; no further variant is issued once
    /// `limit` results have accumulated. A failed variant is logged and
    /// skipped, and when every variant fails the result is an empty list,
    /// not an error. Entries the extractor marks unavailable are dropped.
    /// Duplicates across variants are kept as-is.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<Track> {
        let mut tracks: Vec<Track> = Vec::new();

        for variant in Self::query_variants(query, limit) {
            if tracks.len() >= limit {
                break;
            }

            log::info!("Searching with query: {}", variant);
            let entries = match self.extractor.extract(&variant).await {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("Search variant '{}' failed: {}", variant, e);
                    continue;
                }
            };

            for entry in entries {
                if tracks.len() >= limit {
                    break;
                }
                if entry.is_unavailable() {
                    continue;
                }

                let track = Track::from_entry(entry);
                log::info!(
                    "Found track: {} by {} ({})",
                    track.title,
                    track.uploader,
                    track.source.as_str()
                );
                tracks.push(track);
            }
        }

        log::info!("Search for {:?} produced {} track(s)", query, tracks.len());
        tracks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_variant_order() {
        let variants = TrackSearcher::query_variants("lo-fi beats", 5);
        assert_eq!(
            variants,
            [
                "ytsearch5:lo-fi beats",
                "scsearch5:lo-fi beats",
                "ytsearch5:lo-fi beats music",
                "scsearch5:lo-fi beats remix",
            ]
        );
    }

    #[test]
    fn test_classify_platform() {
        assert_eq!(
            SourcePlatform::classify("https://soundcloud.com/artist/track"),
            SourcePlatform::SoundCloud
        );
        assert_eq!(
            SourcePlatform::classify("https://www.youtube.com/watch?v=abc"),
            SourcePlatform::YouTube
        );
        // неизвестный хост считается YouTube
        assert_eq!(SourcePlatform::classify(""), SourcePlatform::YouTube);
    }

    #[test]
    fn test_track_from_entry_defaults() {
        let track = Track::from_entry(RawEntry::default());
        assert_eq!(track.title, "Unknown");
        assert_eq!(track.uploader, "Unknown");
        assert_eq!(track.duration_secs, 0.0);
        assert_eq!(track.url, "");
        assert_eq!(track.id, "");
        assert_eq!(track.thumbnail, "");
        assert_eq!(track.source, SourcePlatform::YouTube);
    }
}
