//! Integration tests for the dashboard poller against a live collector.

use std::sync::Arc;
use std::time::Duration;

use arpguard_dashboard::collector::{CollectorServer, EventStore};
use arpguard_dashboard::config::CollectorConfig;
use arpguard_dashboard::dashboard::{
    DashboardError, DashboardPoller, Document, FetchError, HttpBackend, MemoryDocument, PageDocument,
    EVENTS_LIST, ORG_STATS_CONTAINER, STAT_MATCH, STAT_NEW, STAT_SPOOFING, STAT_TOTAL,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

async fn spawn_collector() -> (String, EventStore, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let address = listener.local_addr().expect("No local address");
    let server = CollectorServer::new(CollectorConfig::default());
    let store = server.store();
    let cancel = server.cancellation_token();
    tokio::spawn(server.serve(listener));
    (format!("http://{address}"), store, cancel)
}

fn poller_for(base: &str) -> (DashboardPoller, Arc<MemoryDocument>) {
    let backend = HttpBackend::new(base, Some(Duration::from_secs(5))).unwrap();
    let document = Arc::new(MemoryDocument::dashboard());
    (
        DashboardPoller::new(Arc::new(backend), document.clone()),
        document,
    )
}

/// Address with nothing listening on it.
fn dead_backend() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{address}")
}

#[tokio::test]
async fn test_empty_collector_renders_placeholders() {
    let (base, _store, cancel) = spawn_collector().await;
    let (poller, document) = poller_for(&base);

    poller.load_events().await;

    assert!(document
        .inner_html(EVENTS_LIST)
        .unwrap()
        .contains("No events yet. Waiting for ARP traffic..."));
    assert!(document
        .inner_html(ORG_STATS_CONTAINER)
        .unwrap()
        .contains("No data yet..."));
    assert_eq!(document.inner_html(STAT_TOTAL).unwrap(), "0");

    cancel.cancel();
}

#[tokio::test]
async fn test_cycle_renders_collected_events() {
    let (base, store, cancel) = spawn_collector().await;
    store
        .record(json!({
            "eventType": "new",
            "timestamp": "2024-03-01T10:00:00Z",
            "ipAddress": "192.168.1.20",
            "macAddress": "00:11:22:33:44:55",
            "recordedBy": "Org1MSP",
            "hostname": "laptop.lan",
            "message": "New device joined"
        }))
        .await
        .unwrap();
    store
        .record(json!({
            "eventType": "spoofing",
            "timestamp": 1_700_000_000_000_u64,
            "ipAddress": "192.168.1.1",
            "macAddress": "66:77:88:99:aa:bb",
            "previousMAC": "AA:BB:CC:DD:EE:FF",
            "recordedBy": "ACME",
            "message": "Gateway MAC changed"
        }))
        .await
        .unwrap();

    let (poller, document) = poller_for(&base);
    poller.load_events().await;

    let events = document.inner_html(EVENTS_LIST).unwrap();
    let spoof_at = events.find("Gateway MAC changed").unwrap();
    let new_at = events.find("New device joined").unwrap();
    assert!(spoof_at < new_at, "server order must be kept");
    assert!(events.contains("<strong>Previous MAC:</strong> AA:BB:CC:DD:EE:FF"));
    assert!(events.contains("<strong>Hostname:</strong> laptop.lan"));
    assert_eq!(events.matches("Previous MAC").count(), 1);

    assert_eq!(document.inner_html(STAT_TOTAL).unwrap(), "2");
    assert_eq!(document.inner_html(STAT_SPOOFING).unwrap(), "1");
    assert_eq!(document.inner_html(STAT_NEW).unwrap(), "1");
    assert_eq!(document.inner_html(STAT_MATCH).unwrap(), "0");

    let orgs = document.inner_html(ORG_STATS_CONTAINER).unwrap();
    assert!(orgs.contains("org-acme"));
    assert!(orgs.contains("1 reports"));

    cancel.cancel();
}

#[tokio::test]
async fn test_loosely_shaped_events_still_render() {
    let (base, store, cancel) = spawn_collector().await;
    store
        .record(json!({"eventType": "spoofing", "ipAddress": "10.0.0.9", "message": "good"}))
        .await
        .unwrap();
    store.record(json!({"message": "no type"})).await.unwrap();
    store
        .record(json!({"eventType": "new", "ipAddress": null, "timestamp": {"at": "noon"}}))
        .await
        .unwrap();

    let (poller, document) = poller_for(&base);
    assert_eq!(poller.try_load_events().await.unwrap(), 3);

    let events = document.inner_html(EVENTS_LIST).unwrap();
    assert_eq!(events.matches("class=\"event-header\"").count(), 3);
    assert!(events.contains("good"));
    assert!(events.contains("no type"));
    assert!(events.contains("Invalid Date"));
    assert_eq!(document.inner_html(STAT_TOTAL).unwrap(), "3");

    cancel.cancel();
}

#[tokio::test]
async fn test_unreachable_backend_keeps_previous_values() {
    let (base, store, cancel) = spawn_collector().await;
    store
        .record(json!({"eventType": "match", "ipAddress": "10.0.0.1", "recordedBy": "Org1MSP"}))
        .await
        .unwrap();

    let (poller, document) = poller_for(&base);
    poller.load_events().await;
    let before = document.snapshot();
    assert_eq!(before[STAT_TOTAL], "1");

    // Same document, backend gone.
    let backend = HttpBackend::new(&dead_backend(), Some(Duration::from_secs(5))).unwrap();
    let offline = DashboardPoller::new(Arc::new(backend), document.clone());
    offline.load_events().await;
    offline.load_stats().await;

    assert_eq!(document.snapshot(), before);
    assert!(matches!(
        offline.try_load_stats().await,
        Err(DashboardError::Fetch(FetchError::Transport { .. }))
    ));

    cancel.cancel();
}

/// Backend whose stats endpoint returns HTML and org-stats endpoint fails.
async fn spawn_broken_backend() -> String {
    use axum::http::StatusCode;
    use axum::routing::get;

    let app = axum::Router::new()
        .route("/api/stats", get(|| async { "<html>maintenance</html>" }))
        .route(
            "/api/org-stats",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    format!("http://{address}")
}

#[tokio::test]
async fn test_bad_responses_are_contained() {
    let base = spawn_broken_backend().await;
    let (poller, document) = poller_for(&base);
    document.set_text(STAT_TOTAL, "5").unwrap();

    assert!(matches!(
        poller.try_load_stats().await,
        Err(DashboardError::Fetch(FetchError::Parse { .. }))
    ));
    assert!(matches!(
        poller.try_load_org_stats().await,
        Err(DashboardError::Fetch(FetchError::Status { status: 500, .. }))
    ));

    // Events endpoint is missing entirely; the cycle still completes.
    poller.load_events().await;
    assert_eq!(document.inner_html(STAT_TOTAL).unwrap(), "5");
    assert_eq!(document.inner_html(ORG_STATS_CONTAINER).unwrap(), "");
    assert_eq!(document.inner_html(EVENTS_LIST).unwrap(), "");
}

#[tokio::test]
async fn test_started_poller_picks_up_new_events() {
    let (base, store, cancel) = spawn_collector().await;
    let (poller, document) = poller_for(&base);

    let handle = poller.start(Duration::from_millis(25));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(document.inner_html(STAT_TOTAL).unwrap(), "0");

    store
        .record(json!({"eventType": "spoofing", "ipAddress": "10.0.0.7", "recordedBy": "Org2MSP"}))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.stop().await;

    assert_eq!(document.inner_html(STAT_TOTAL).unwrap(), "1");
    assert!(document.inner_html(EVENTS_LIST).unwrap().contains("10.0.0.7"));

    cancel.cancel();
}

#[tokio::test]
async fn test_page_document_written_by_poller() {
    let (base, store, cancel) = spawn_collector().await;
    store
        .record(json!({"eventType": "new", "ipAddress": "172.16.0.4", "recordedBy": "Org1MSP"}))
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dashboard.html");
    let document = Arc::new(PageDocument::create(&path, 2).unwrap());
    let backend = HttpBackend::new(&base, None).unwrap();
    DashboardPoller::new(Arc::new(backend), document)
        .load_events()
        .await;

    let page = std::fs::read_to_string(&path).unwrap();
    assert!(page.contains("<strong>IP:</strong> 172.16.0.4"));
    assert!(page.contains("<div class=\"stat-value\" id=\"stat-new\">1</div>"));
    assert!(page.contains("<meta http-equiv=\"refresh\" content=\"2\">"));

    cancel.cancel();
}
