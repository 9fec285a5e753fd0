//! Session readiness gating and catalog expansion through entry dispatch.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use common::stubs::{self, StubCatalog};
use sdm_core::catalog::CatalogService;
use sdm_core::config::SdmConfig;
use sdm_core::pipeline::Workspace;
use sdm_core::session::{Readiness, Session};
use tempfile::tempdir;
use tokio::sync::Notify;

fn workspace_in(dir: &tempfile::TempDir) -> Workspace {
    Workspace::new(dir.path().to_path_buf(), &SdmConfig::default())
}

#[tokio::test]
async fn dispatch_waits_out_loading_and_proceeds_once_ready() {
    let out = tempdir().unwrap();
    let set = stubs::stub_services(HashSet::new(), None);

    let gate = Arc::new(Notify::new());
    let mut catalog = StubCatalog::new();
    catalog.auth_gate = Some(Arc::clone(&gate));
    catalog
        .tracks
        .insert("t1".to_string(), stubs::track_record("X", "Y", "Z"));
    let catalog = Arc::new(catalog);

    let session = Session::start(
        Arc::clone(&catalog) as Arc<dyn CatalogService>,
        set.services.clone(),
        workspace_in(&out),
        1,
        None,
    );
    let dispatch = tokio::spawn(async move {
        session
            .download("https://open.spotify.com/track/t1", false)
            .await
    });

    // Credential exchange still pending: nothing may run yet.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(catalog.call_count(), 0);
    assert!(set.recorder.queries().is_empty());

    gate.notify_one();
    let report = dispatch.await.unwrap().unwrap();
    assert_eq!(report.attempted, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(catalog.call_count(), 1);
    assert_eq!(set.recorder.queries(), vec!["Y - X"]);
    assert!(out.path().join("Y - X.mp3").exists());
}

#[tokio::test]
async fn failed_authorization_drops_requests_without_any_pipeline_run() {
    let out = tempdir().unwrap();
    let set = stubs::stub_services(HashSet::new(), None);

    let mut catalog = StubCatalog::new();
    catalog.fail_auth = true;
    catalog
        .tracks
        .insert("t1".to_string(), stubs::track_record("X", "Y", "Z"));
    let catalog = Arc::new(catalog);

    let session = Session::start(
        Arc::clone(&catalog) as Arc<dyn CatalogService>,
        set.services.clone(),
        workspace_in(&out),
        1,
        None,
    );
    let report = session
        .download("https://open.spotify.com/track/t1", false)
        .await
        .unwrap();

    assert_eq!(report.attempted, 0);
    assert_eq!(session.readiness(), Readiness::Error);
    assert_eq!(catalog.call_count(), 0, "no catalog lookup may happen");
    assert!(set.recorder.queries().is_empty(), "no pipeline may run");
}

#[tokio::test]
async fn unrecognized_references_are_ignored_without_error() {
    let out = tempdir().unwrap();
    let set = stubs::stub_services(HashSet::new(), None);
    let catalog = Arc::new(StubCatalog::new());

    let session = Session::start(
        Arc::clone(&catalog) as Arc<dyn CatalogService>,
        set.services.clone(),
        workspace_in(&out),
        1,
        None,
    );
    for url in [
        "https://open.spotify.com/show/abc",
        "https://example.com/track/abc",
        "not a url",
    ] {
        let report = session.download(url, false).await.unwrap();
        assert_eq!(report.attempted, 0);
    }
    assert_eq!(catalog.call_count(), 0);
}

#[tokio::test]
async fn playlist_downloads_in_playlist_order() {
    let out = tempdir().unwrap();
    let set = stubs::stub_services(HashSet::new(), None);

    let mut catalog = StubCatalog::new();
    catalog.playlists.insert(
        "p1".to_string(),
        vec![
            stubs::track_record("one", "A", "L"),
            stubs::track_record("two", "A", "L"),
            stubs::track_record("three", "A", "L"),
        ],
    );
    let catalog = Arc::new(catalog);

    let session = Session::start(
        Arc::clone(&catalog) as Arc<dyn CatalogService>,
        set.services.clone(),
        workspace_in(&out),
        1,
        None,
    );
    let report = session
        .download("https://open.spotify.com/playlist/p1", false)
        .await
        .unwrap();

    assert_eq!(report.succeeded, 3);
    assert_eq!(
        set.recorder.queries(),
        vec!["A - one", "A - two", "A - three"]
    );
}

#[tokio::test]
async fn artist_expansion_enqueues_every_album_then_drains_once() {
    let out = tempdir().unwrap();
    let set = stubs::stub_services(HashSet::new(), None);

    let mut catalog = StubCatalog::new();
    catalog.artist_albums.insert(
        "ar1".to_string(),
        vec![
            sdm_core::catalog::AlbumRef {
                id: "a1".into(),
                name: "First".into(),
            },
            sdm_core::catalog::AlbumRef {
                id: "a2".into(),
                name: "Second".into(),
            },
        ],
    );
    catalog
        .albums
        .insert("a1".to_string(), stubs::album_record("a1", "First", "A", &["s1", "s2"]));
    catalog
        .albums
        .insert("a2".to_string(), stubs::album_record("a2", "Second", "A", &["s3", "s4"]));
    let catalog = Arc::new(catalog);

    let session = Session::start(
        Arc::clone(&catalog) as Arc<dyn CatalogService>,
        set.services.clone(),
        workspace_in(&out),
        1,
        None,
    );
    let report = session
        .download("https://open.spotify.com/artist/ar1", false)
        .await
        .unwrap();

    // All albums' tracks land in one backlog before draining begins, so the
    // drain order is album order, track order within each.
    assert_eq!(report.attempted, 4);
    assert_eq!(report.succeeded, 4);
    assert_eq!(
        set.recorder.queries(),
        vec!["A - s1", "A - s2", "A - s3", "A - s4"]
    );
    // artist_albums + two album lookups.
    assert_eq!(catalog.call_count(), 3);
}

#[tokio::test]
async fn album_expansion_attaches_the_album_context_to_every_track() {
    let out = tempdir().unwrap();
    let set = stubs::stub_services(HashSet::new(), None);

    let mut catalog = StubCatalog::new();
    catalog
        .albums
        .insert("a1".to_string(), stubs::album_record("a1", "Z", "Y", &["X"]));
    let catalog = Arc::new(catalog);

    let session = Session::start(
        Arc::clone(&catalog) as Arc<dyn CatalogService>,
        set.services.clone(),
        workspace_in(&out),
        1,
        None,
    );
    let report = session
        .download("https://open.spotify.com/album/a1", false)
        .await
        .unwrap();

    assert_eq!(report.succeeded, 1);
    // The synthesized context drives the art cache path and the tag set.
    assert!(out.path().join(".sdm").join("Y - Z.jpg").exists());
    let tags = set.embedder.last_tags.lock().unwrap().clone().unwrap();
    assert_eq!(tags.album, "Z");
    assert_eq!(tags.album_artist, "Y");
}
