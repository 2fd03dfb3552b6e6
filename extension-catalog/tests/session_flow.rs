//! End-to-end session flow, fully offline: records are injected instead of
//! fetched, then the filter engine, the derived vocabularies and the URL
//! codec are exercised together.

use extension_catalog::{
    Badge, CapabilitySet, CatalogSession, ContentRating, ExtensionMetadata, ExtensionRecord,
    RepositorySource, CLOUDFLARE_BYPASS, CONTENT_PROVIDING, CONTENT_SERVICE, PROGRESS_TRACKING,
};

fn metadata(
    id: &str,
    rating: ContentRating,
    capabilities: u32,
    language: &str,
    badges: &[&str],
) -> ExtensionMetadata {
    ExtensionMetadata {
        id: id.to_string(),
        name: format!("{id} reader"),
        description: format!("Extension for {id}"),
        version: "1.2.0".to_string(),
        icon: "icon.png".to_string(),
        language: Some(language.to_string()),
        content_rating: rating,
        badges: badges
            .iter()
            .map(|label| Badge {
                label: (*label).to_string(),
                text_color: "#fff".to_string(),
                background_color: "#000".to_string(),
            })
            .collect(),
        capabilities: CapabilitySet::Mask(capabilities),
        developers: Vec::new(),
    }
}

fn seeded_session() -> CatalogSession {
    let inkdex = RepositorySource::new("inkdex", "extensions", "master");
    let custom = RepositorySource::new("someone", "extensions", "gh-pages");

    let records = vec![
        ExtensionRecord::from_metadata(
            &inkdex,
            metadata(
                "alpha",
                ContentRating::Safe,
                CONTENT_PROVIDING,
                "en",
                &["Popular"],
            ),
        ),
        ExtensionRecord::from_metadata(
            &inkdex,
            metadata(
                "bravo",
                ContentRating::Mature,
                CONTENT_PROVIDING | CLOUDFLARE_BYPASS,
                "ja",
                &["Popular", "Fast"],
            ),
        ),
        ExtensionRecord::from_metadata(
            &custom,
            metadata(
                "charlie",
                ContentRating::Adult,
                CONTENT_PROVIDING | PROGRESS_TRACKING,
                "multi",
                &[],
            ),
        ),
    ];

    let mut session = CatalogSession::in_memory();
    session.inject_records(records);
    session
}

#[test]
fn vocabularies_derive_from_injected_records() {
    let session = seeded_session();

    // "multi" sorts ahead of concrete tags.
    assert_eq!(session.available_languages(), ["multi", "en", "ja"]);
    assert_eq!(session.available_labels(), ["Fast", "Popular"]);
}

#[test]
fn restore_filters_and_reencodes() {
    let mut session = seeded_session();

    session.restore_from_query("cr=safe,mature&nl=ja&bm=or");
    let view = session.filtered();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].id, "alpha");

    // Re-encoding drops the mode parameter because no label is selected.
    // Axis values serialize in set order, so "mature" precedes "safe".
    let query = session.sync_url().expect("state changed relative to raw query");
    assert_eq!(query, "cr=mature%2Csafe&nl=ja");
}

#[test]
fn foreign_vocabulary_entries_are_dropped() {
    let mut session = seeded_session();

    session.restore_from_query("l=en,xx&b=Popular%2CNope");
    let state = session.engine().state();
    assert_eq!(state.languages.included().len(), 1);
    assert!(state.languages.included().contains("en"));
    assert_eq!(state.labels.included().len(), 1);
    assert!(state.labels.included().contains("Popular"));
}

#[test]
fn service_axis_and_selection_interact() {
    let mut session = seeded_session();

    session.engine_mut().toggle_service(CONTENT_SERVICE);
    assert_eq!(session.filtered().len(), 3);

    session.engine_mut().toggle_selected("inkdex-extensions-bravo");
    session.engine_mut().set_show_only_selected(true);
    let view = session.filtered();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].source_id, "inkdex-extensions");
    assert_eq!(view[0].id, "bravo");
}

#[tokio::test(start_paused = true)]
async fn search_debounce_settles_before_filtering() {
    let mut session = seeded_session();

    session.engine_mut().set_search("CHARLIE");
    // Still the previous (empty) settled query.
    assert_eq!(session.filtered().len(), 3);

    session.engine_mut().settle_search().await;
    let view = session.filtered();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].id, "charlie");
}

#[tokio::test]
async fn repository_lifecycle_is_idempotent() {
    let mut session = CatalogSession::in_memory();

    assert!(session
        .add_repository("definitely not a repository")
        .await
        .is_err());

    assert!(!session.remove_repository("someone-extensions").await);
}
