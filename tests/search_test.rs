//! TrackSearcher behavior against a scripted extractor.

mod common;

use common::{entries, entry, StubExtractor};
use muzka::download::search::SourcePlatform;
use muzka::download::{SearchConfig, TrackSearcher};
use muzka::extractor::RawEntry;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn searcher(stub: Arc<StubExtractor>) -> TrackSearcher {
    TrackSearcher::new(stub, SearchConfig { default_limit: 5 })
}

#[tokio::test]
async fn first_variant_filling_the_limit_stops_the_search() {
    let stub = Arc::new(StubExtractor::with_responses(vec![Ok(entries(5))]));
    let searcher = searcher(Arc::clone(&stub));

    let tracks = searcher.search("query", 5).await;

    assert_eq!(tracks.len(), 5);
    // остальные варианты не запускались
    assert_eq!(stub.extract_calls(), 1);
}

#[tokio::test]
async fn all_variants_failing_yields_empty_list() {
    let stub = Arc::new(StubExtractor::with_responses(vec![
        Err("variant 1 down".to_string()),
        Err("variant 2 down".to_string()),
        Err("variant 3 down".to_string()),
        Err("variant 4 down".to_string()),
    ]));
    let searcher = searcher(Arc::clone(&stub));

    let tracks = searcher.search("query", 5).await;

    assert!(tracks.is_empty());
    assert_eq!(stub.extract_calls(), 4);
}

#[tokio::test]
async fn failed_variant_is_skipped_not_fatal() {
    let stub = Arc::new(StubExtractor::with_responses(vec![
        Err("general index down".to_string()),
        Ok(entries(2)),
    ]));
    let searcher = searcher(Arc::clone(&stub));

    let tracks = searcher.search("query", 5).await;

    assert_eq!(tracks.len(), 2);
    // после неудачного варианта поиск продолжился
    assert!(stub.extract_calls() >= 2);
}

#[tokio::test]
async fn results_accumulate_across_variants_up_to_limit() {
    let stub = Arc::new(StubExtractor::with_responses(vec![
        Ok(entries(2)),
        Ok(entries(2)),
        Ok(entries(2)),
        Ok(entries(2)),
    ]));
    let searcher = searcher(Arc::clone(&stub));

    let tracks = searcher.search("query", 5).await;

    assert_eq!(tracks.len(), 5);
    // четвёртый вариант уже не понадобился
    assert_eq!(stub.extract_calls(), 3);
}

#[tokio::test]
async fn unavailable_entries_are_excluded() {
    let mut list = entries(2);
    list[0].availability = Some("unavailable".to_string());
    let stub = Arc::new(StubExtractor::with_responses(vec![Ok(list)]));
    let searcher = searcher(stub);

    let tracks = searcher.search("query", 5).await;

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].title, "Track 1");
}

#[tokio::test]
async fn platform_is_classified_from_canonical_url() {
    let list = vec![
        entry("sc track", "https://soundcloud.com/artist/track"),
        entry("yt track", "https://www.youtube.com/watch?v=abc"),
    ];
    let stub = Arc::new(StubExtractor::with_responses(vec![Ok(list)]));
    let searcher = searcher(stub);

    let tracks = searcher.search("query", 5).await;

    assert_eq!(tracks[0].source, SourcePlatform::SoundCloud);
    assert_eq!(tracks[1].source, SourcePlatform::YouTube);
}

#[tokio::test]
async fn missing_fields_get_defaults() {
    let bare = RawEntry {
        webpage_url: Some("https://www.youtube.com/watch?v=abc".to_string()),
        ..Default::default()
    };
    let stub = Arc::new(StubExtractor::with_responses(vec![Ok(vec![bare])]));
    let searcher = searcher(stub);

    let tracks = searcher.search("query", 5).await;

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].title, "Unknown");
    assert_eq!(tracks[0].uploader, "Unknown");
    assert_eq!(tracks[0].duration_secs, 0.0);
    assert_eq!(tracks[0].id, "");
    assert_eq!(tracks[0].thumbnail, "");
}

#[tokio::test]
async fn duplicates_across_variants_are_kept() {
    let same = entry("dup", "https://www.youtube.com/watch?v=same");
    let stub = Arc::new(StubExtractor::with_responses(vec![
        Ok(vec![same.clone()]),
        Ok(vec![same]),
    ]));
    let searcher = searcher(stub);

    let tracks = searcher.search("query", 5).await;

    // дедупликации нет намеренно
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].title, tracks[1].title);
}

#[tokio::test]
async fn variant_results_are_truncated_to_limit() {
    let stub = Arc::new(StubExtractor::with_responses(vec![Ok(entries(10))]));
    let searcher = searcher(stub);

    let tracks = searcher.search("query", 3).await;

    assert_eq!(tracks.len(), 3);
}
