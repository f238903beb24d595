//! HttpSourceFetcher against a local axum server

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use jobtrack_common::config::HttpConfig;
use jobtrack_common::Error;
use jobtrack_engine::{HttpSourceFetcher, JoinKeySpec, SourceFetcher, SourceSpec};

/// Serve fixed payloads on an ephemeral port; returns the base URL
async fn spawn_server() -> String {
    let app = Router::new()
        .route(
            "/orders/",
            get(|| async {
                (
                    [("content-type", "application/json")],
                    r#"[{"jobno_oms":"H100","pono":"PO-1"},{"jobno_oms":"J050","pono":"PO-2"}]"#,
                )
            }),
        )
        .route(
            "/single/",
            get(|| async { r#"{"orderno":"H100","knitted":480}"# }),
        )
        .route("/broken/", get(|| async { "<html>maintenance</html>" }))
        .route(
            "/down/",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "try later") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn source(base: &str, path: &str) -> SourceSpec {
    SourceSpec {
        name: path.to_string(),
        url: format!("{}/{}/", base, path),
        join_key: JoinKeySpec::new("jobno_oms"),
    }
}

fn fetcher() -> HttpSourceFetcher {
    HttpSourceFetcher::new(&HttpConfig {
        timeout_secs: 5,
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_fetch_record_list() {
    let base = spawn_server().await;
    let records = fetcher().fetch(&source(&base, "orders")).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["jobno_oms"], "H100");
    assert_eq!(records[1]["pono"], "PO-2");
}

#[tokio::test]
async fn test_fetch_bare_object() {
    let base = spawn_server().await;
    let records = fetcher().fetch(&source(&base, "single")).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["knitted"], 480);
}

#[tokio::test]
async fn test_non_success_status_is_fetch_error() {
    let base = spawn_server().await;
    let err = fetcher().fetch(&source(&base, "down")).await.unwrap_err();

    match err {
        Error::SourceFetch { source_name, message } => {
            assert_eq!(source_name, "down");
            assert!(message.contains("503"), "{message}");
        }
        other => panic!("expected fetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_json_is_parse_error() {
    let base = spawn_server().await;
    let err = fetcher().fetch(&source(&base, "broken")).await.unwrap_err();

    assert!(matches!(err, Error::SourceParse { .. }), "{err:?}");
    assert_eq!(err.source_name(), Some("broken"));
}

#[tokio::test]
async fn test_connection_refused_is_fetch_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let spec = SourceSpec {
        name: "Fabst".to_string(),
        url: format!("http://{}/Fabst/", addr),
        join_key: JoinKeySpec::new("jobno_fabric_status"),
    };
    let err = fetcher().fetch(&spec).await.unwrap_err();
    assert!(matches!(err, Error::SourceFetch { .. }), "{err:?}");
}
