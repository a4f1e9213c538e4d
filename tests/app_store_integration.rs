//! Integration tests for the bookmark app store
//!
//! Tests the complete workflow of adding, reordering, merging, and
//! deleting bookmarks, including persistence across store instances and
//! live status probing against a mock upstream.

use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use labdash::apps::{AppPatch, AppStore, BookmarkApp, Position};
use labdash::probe::Prober;

fn store_at(dir: &TempDir) -> AppStore {
    AppStore::new(
        dir.path().join("apps.json"),
        Prober::new(reqwest::Client::new()),
    )
}

#[tokio::test]
async fn test_add_survives_reopening_the_store() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let store = store_at(&dir);
    store.add("NAS", "192.168.1.5", "nas.png").await.unwrap();
    store.add("Router", "http://192.168.1.1", "").await.unwrap();
    drop(store);

    let reopened = store_at(&dir);
    let apps = reopened.list();
    assert_eq!(apps.len(), 2);
    assert_eq!(apps[0].name, "NAS");
    // Bare host gets a scheme on the way in.
    assert_eq!(apps[0].url, "http://192.168.1.5");
    assert_eq!(apps[1].url, "http://192.168.1.1");
}

#[tokio::test]
async fn test_full_reorder_and_drag_move_workflow() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = store_at(&dir);
    for name in ["a", "b", "c", "d"] {
        store.add(name, &format!("http://{name}"), "").await.unwrap();
    }

    assert!(store.apply_order(&["c".into(), "a".into()]).await.unwrap());
    let names: Vec<_> = store.list().into_iter().map(|a| a.name).collect();
    // Omitted entries keep their relative order at the end.
    assert_eq!(names, ["c", "a", "b", "d"]);

    assert!(store.reorder("d", "c", Position::Before).await.unwrap());
    let names: Vec<_> = store.list().into_iter().map(|a| a.name).collect();
    assert_eq!(names, ["d", "c", "a", "b"]);

    // Unknown names leave the order untouched.
    assert!(!store.reorder("ghost", "c", Position::After).await.unwrap());
    let names: Vec<_> = store.list().into_iter().map(|a| a.name).collect();
    assert_eq!(names, ["d", "c", "a", "b"]);
}

#[tokio::test]
async fn test_update_rejects_name_collision_without_partial_write() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = store_at(&dir);
    store.add("NAS", "http://nas", "").await.unwrap();
    store.add("Router", "http://router", "").await.unwrap();

    let patch = AppPatch {
        name: Some("NAS".into()),
        url: Some("http://elsewhere".into()),
        icon: None,
    };
    assert!(!store.update("Router", patch).await.unwrap());

    let router = store.get("Router").expect("Router must still exist");
    assert_eq!(router.url, "http://router");
}

#[tokio::test]
async fn test_merge_skips_duplicates_by_url_and_name() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = store_at(&dir);
    store.add("Plex", "192.168.1.20:32400", "").await.unwrap();

    let imported = store
        .merge(vec![
            BookmarkApp {
                // Same URL after normalization.
                name: "Media".into(),
                url: "http://192.168.1.20:32400".into(),
                icon: String::new(),
            },
            BookmarkApp {
                // Same name, case-insensitive.
                name: "PLEX".into(),
                url: "http://10.0.0.9".into(),
                icon: String::new(),
            },
            BookmarkApp {
                name: "Grafana".into(),
                url: "http://192.168.1.30:3000".into(),
                icon: String::new(),
            },
        ])
        .await
        .unwrap();

    assert_eq!(imported, 1);
    assert_eq!(store.list().len(), 2);
    assert!(store.get("Grafana").is_some());
}

#[tokio::test]
async fn test_status_probes_reachable_and_unreachable_apps() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = store_at(&dir);
    store.add("up", &server.uri(), "").await.unwrap();
    // TEST-NET address, never routable.
    store.add("down", "http://192.0.2.1:9", "").await.unwrap();

    let statuses = store.list_with_status().await;
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0].app.name, "up");
    assert!(statuses[0].online);
    assert!(!statuses[1].online);
}

#[tokio::test]
async fn test_delete_all_leaves_an_empty_persisted_list() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = store_at(&dir);
    store.add("a", "http://a", "").await.unwrap();
    store.add("b", "http://b", "").await.unwrap();

    store.delete_all().await.unwrap();
    assert!(store.list().is_empty());

    let reopened = store_at(&dir);
    assert!(reopened.list().is_empty());
}

#[tokio::test]
async fn test_corrupt_store_file_reads_as_empty() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("apps.json"), "{not json").unwrap();

    let store = store_at(&dir);
    assert!(store.list().is_empty());

    // The next write replaces the corrupt file.
    store.add("fresh", "http://fresh", "").await.unwrap();
    assert_eq!(store_at(&dir).list().len(), 1);
}
