use axum::{http::StatusCode, routing::get, Router};
use member_admin::api_client::MembersClient;
use member_admin::data::record::RecordId;
use member_admin::services::data_loader_service::{DataLoaderService, DataSource};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

fn fixture_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("data");
    path.push("members.json");
    path
}

/// Serve the fixture on a random local port from a background runtime
fn spawn_server() -> String {
    let body = std::fs::read_to_string(fixture_path()).expect("fixture missing");
    let (tx, rx) = mpsc::channel::<SocketAddr>();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let app = Router::new()
                .route(
                    "/members.json",
                    get(move || {
                        let body = body.clone();
                        async move { ([("content-type", "application/json")], body) }
                    }),
                )
                .route(
                    "/broken",
                    get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
                )
                .route("/html", get(|| async { "<html>maintenance</html>" }))
                .route(
                    "/slow",
                    get(|| async {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        "[]"
                    }),
                );

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    let addr = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    format!("http://{}", addr)
}

#[test]
fn test_fetch_members() {
    let base = spawn_server();
    let client = MembersClient::new(&format!("{}/members.json", base));
    let members = client.fetch_members().unwrap();

    assert_eq!(members.len(), 15);
    assert_eq!(members[0].id, RecordId(1));
    assert_eq!(members[0].name(), "Aaron Miles");
    assert_eq!(members[1].role(), "admin");
}

#[test]
fn test_error_status_is_reported() {
    let base = spawn_server();
    let err = MembersClient::new(&format!("{}/broken", base))
        .fetch_members()
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("500"), "{}", message);
    assert!(message.contains("upstream exploded"), "{}", message);
}

#[test]
fn test_non_json_body_fails() {
    let base = spawn_server();
    let result = MembersClient::new(&format!("{}/html", base)).fetch_members();
    assert!(result.is_err());
}

#[test]
fn test_timeout_applies() {
    let base = spawn_server();
    let client =
        MembersClient::with_timeout(&format!("{}/slow", base), Duration::from_millis(200)).unwrap();
    assert!(client.fetch_members().is_err());
}

#[test]
fn test_background_load_delivers_once() {
    let base = spawn_server();
    let source = DataSource::Url(format!("{}/members.json", base));
    let rx = DataLoaderService::new(None).spawn_load(source.clone());

    let result = rx.recv_timeout(Duration::from_secs(10)).unwrap().unwrap();
    assert_eq!(result.records.len(), 15);
    assert_eq!(result.source, source);

    // the worker sends one result and hangs up
    assert!(rx.recv_timeout(Duration::from_secs(1)).is_err());
}

#[test]
fn test_load_fixture_file() {
    let result = DataLoaderService::new(None)
        .load(&DataSource::File(fixture_path()))
        .unwrap();
    assert_eq!(result.records.len(), 15);
}
