// ═══════════════════════════════════════════════════════════════════
// Provider Tests: HttpChangeSource against a local one-shot server
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use holding_watch_core::errors::CoreError;
use holding_watch_core::models::event::ChangeKind;
use holding_watch_core::models::query::{ChangeQuery, SortOrder};
use holding_watch_core::models::settings::ApiConfig;
use holding_watch_core::providers::http::HttpChangeSource;
use holding_watch_core::providers::traits::{ChangeSource, Notifier};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Test Helpers: local server, recording notifier
// ═══════════════════════════════════════════════════════════════════

/// Accept one connection, answer it with `status` and `body`, and hand back
/// the raw request head.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 16 * 1024];
        let n = socket.read(&mut buf).await.unwrap();
        let request = String::from_utf8_lossy(&buf[..n]).to_string();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (format!("http://{addr}"), handle)
}

/// Accept one connection and never answer.
async fn serve_silence() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });
    format!("http://{addr}")
}

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

fn source_for(base_url: &str) -> (HttpChangeSource, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let config = ApiConfig::default().with_base_url(base_url);
    let source = HttpChangeSource::new(&config)
        .unwrap()
        .with_notifier(notifier.clone());
    (source, notifier)
}

fn request_line(request: &str) -> &str {
    request.lines().next().unwrap_or_default()
}

const CHART_BODY: &str = r#"{
    "priceData": [
        {"trackTime": "2024-01-01T09:30", "currentPrice": 10.0},
        {"trackTime": "2024-01-01T14:00", "currentPrice": 10.5},
        {"trackTime": "2024-01-02T09:30", "currentPrice": 11.0}
    ],
    "marks": [
        {"price": 10.6, "tradeDate": "2024-01-01", "stockCode": "600000",
         "stockName": "浦发银行", "changeType": "增持", "totalPrice": 5000000,
         "changerName": "张三", "changerPosition": "董事"}
    ]
}"#;

// ═══════════════════════════════════════════════════════════════════
// URL building
// ═══════════════════════════════════════════════════════════════════

mod urls {
    use super::*;

    #[test]
    fn chart_url_embeds_code() {
        let (source, _) = source_for("http://127.0.0.1:9");
        assert_eq!(
            source.chart_url("600000").unwrap().as_str(),
            "http://127.0.0.1:9/api/stocks/600000/chart"
        );
    }

    #[test]
    fn chart_url_escapes_path_characters() {
        let (source, _) = source_for("http://127.0.0.1:9");
        let url = source.chart_url("a/b c").unwrap();
        assert_eq!(url.path(), "/api/stocks/a%2Fb%20c/chart");
    }

    #[test]
    fn endpoint_url_appends_query() {
        let (source, _) = source_for("http://127.0.0.1:9/");
        let url = source
            .endpoint_url("/data/api/detail/chart", &[("code", "600000".into()), ("name", String::new())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9/data/api/detail/chart?code=600000&name="
        );
    }

    #[test]
    fn path_prefix_on_base_is_kept_for_every_endpoint() {
        let (source, _) = source_for("http://127.0.0.1:9/backend/");
        assert_eq!(source.base_url().as_str(), "http://127.0.0.1:9/backend");

        let changes = source
            .endpoint_url("/api/stocks/changes", &[("start", "2024-01-01".into())])
            .unwrap();
        assert_eq!(
            changes.as_str(),
            "http://127.0.0.1:9/backend/api/stocks/changes?start=2024-01-01"
        );

        let history = source.endpoint_url("/data/api/detail/chart", &[]).unwrap();
        assert_eq!(history.path(), "/backend/data/api/detail/chart");

        let chart = source.chart_url("600000").unwrap();
        assert_eq!(chart.path(), "/backend/api/stocks/600000/chart");
    }

    #[tokio::test]
    async fn requests_go_through_the_path_prefix() {
        let (base, server) = serve_once("200 OK", "[]").await;
        let (source, _) = source_for(&format!("{base}/backend"));

        let query = ChangeQuery::new(d(2024, 1, 1), d(2024, 1, 31));
        source.fetch_changes(&query).await.unwrap();

        let request = server.await.unwrap();
        assert!(
            request_line(&request).starts_with("GET /backend/api/stocks/changes?"),
            "{request}"
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ApiConfig::default().with_base_url("not a url");
        assert!(matches!(
            HttpChangeSource::new(&config),
            Err(CoreError::Config(_))
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Successful requests
// ═══════════════════════════════════════════════════════════════════

mod requests {
    use super::*;

    #[tokio::test]
    async fn fetch_changes_sends_filters_and_decodes_rows() {
        let body = r#"[
            {"totalIncrease": 2500000, "totalDecrease": 0, "tradeDate": "2024-01-03",
             "stockCode": "600000", "stockName": "浦发银行",
             "changerName": "张三", "changerPosition": "董事"},
            {"totalIncrease": 0, "totalDecrease": 900000, "tradeDate": "2024-01-04",
             "stockCode": "000001", "stockName": "平安银行",
             "changerName": "李四", "changerPosition": "监事"}
        ]"#;
        let (base, server) = serve_once("200 OK", body).await;
        let (source, notifier) = source_for(&base);

        let query = ChangeQuery::new(d(2024, 1, 1), d(2024, 1, 31))
            .with_change_type(Some(ChangeKind::Increase))
            .with_sort(Some(SortOrder::Asc));
        let rows = source.fetch_changes(&query).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].stock_code, "600000");
        assert_eq!(rows[1].total_decrease, 900_000.0);

        let request = server.await.unwrap();
        let line = request_line(&request);
        assert!(line.starts_with("GET /api/stocks/changes?"), "{line}");
        assert!(line.contains("start=2024-01-01&end=2024-01-31"), "{line}");
        // 增持, percent-encoded
        assert!(line.contains("changeType=%E5%A2%9E%E6%8C%81"), "{line}");
        assert!(line.contains("changeSort=asc"), "{line}");
        assert!(line.contains("totalPrice=100000"), "{line}");
        assert!(notifier.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_chart_decodes_detail() {
        let (base, server) = serve_once("200 OK", CHART_BODY).await;
        let (source, _) = source_for(&base);

        let detail = source.fetch_chart("600000").await.unwrap();
        assert_eq!(detail.price_data.len(), 3);
        assert_eq!(detail.marks[0].change_type, ChangeKind::Increase);

        let request = server.await.unwrap();
        assert!(request_line(&request).starts_with("GET /api/stocks/600000/chart "));
    }

    #[tokio::test]
    async fn fetch_history_detail_sends_code_and_name() {
        let (base, server) = serve_once("200 OK", CHART_BODY).await;
        let (source, _) = source_for(&base);

        let detail = source
            .fetch_history_detail("600000", Some("Zhang San"))
            .await
            .unwrap();
        assert_eq!(detail.marks.len(), 1);

        let request = server.await.unwrap();
        assert!(request_line(&request)
            .starts_with("GET /data/api/detail/chart?code=600000&name=Zhang+San "));
    }

    #[tokio::test]
    async fn fetch_history_detail_without_name_sends_empty_name() {
        let (base, server) = serve_once("200 OK", CHART_BODY).await;
        let (source, _) = source_for(&base);

        source.fetch_history_detail("600000", None).await.unwrap();
        let request = server.await.unwrap();
        assert!(request_line(&request).starts_with("GET /data/api/detail/chart?code=600000&name= "));
    }

    #[tokio::test]
    async fn invalid_query_is_rejected_before_sending() {
        let (source, notifier) = source_for("http://127.0.0.1:9");
        let query = ChangeQuery::new(d(2024, 2, 1), d(2024, 1, 1));
        let err = source.fetch_changes(&query).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        assert!(notifier.messages.lock().unwrap().is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Failures → typed errors + user notifications
// ═══════════════════════════════════════════════════════════════════

mod failures {
    use super::*;

    async fn chart_error(status: &'static str) -> (CoreError, Vec<String>) {
        let (base, _server) = serve_once(status, "{}").await;
        let (source, notifier) = source_for(&base);
        let err = source.fetch_chart("600000").await.unwrap_err();
        let messages = notifier.messages.lock().unwrap().clone();
        (err, messages)
    }

    #[tokio::test]
    async fn not_found() {
        let (err, messages) = chart_error("404 Not Found").await;
        assert!(matches!(err, CoreError::Http { status: 404 }));
        assert_eq!(messages, vec!["resource not found"]);
    }

    #[tokio::test]
    async fn internal_server_error() {
        let (err, messages) = chart_error("500 Internal Server Error").await;
        assert!(matches!(err, CoreError::Http { status: 500 }));
        assert_eq!(messages, vec!["internal server error"]);
    }

    #[tokio::test]
    async fn service_unavailable() {
        let (err, messages) = chart_error("503 Service Unavailable").await;
        assert!(matches!(err, CoreError::Http { status: 503 }));
        assert_eq!(messages, vec!["service unavailable"]);
    }

    #[tokio::test]
    async fn other_status() {
        let (err, messages) = chart_error("429 Too Many Requests").await;
        assert!(matches!(err, CoreError::Http { status: 429 }));
        assert_eq!(messages, vec!["request failed (429)"]);
    }

    #[tokio::test]
    async fn malformed_body() {
        let (base, _server) = serve_once("200 OK", r#"{"priceData": "nope"}"#).await;
        let (source, notifier) = source_for(&base);
        let err = source.fetch_chart("600000").await.unwrap_err();
        assert!(matches!(err, CoreError::Deserialization(_)));
        assert_eq!(notifier.messages.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn timeout() {
        let base = serve_silence().await;
        let notifier = Arc::new(RecordingNotifier::default());
        let config = ApiConfig::default()
            .with_base_url(base)
            .with_timeout_ms(200);
        let source = HttpChangeSource::new(&config)
            .unwrap()
            .with_notifier(notifier.clone());

        let err = source.fetch_chart("600000").await.unwrap_err();
        assert!(matches!(err, CoreError::Timeout), "{err:?}");
        assert_eq!(*notifier.messages.lock().unwrap(), vec!["request timed out"]);
    }

    #[tokio::test]
    async fn connection_refused() {
        // Grab a free port, then close it again
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (source, notifier) = source_for(&format!("http://{addr}"));
        let err = source.fetch_chart("600000").await.unwrap_err();
        assert!(matches!(err, CoreError::Network(_)), "{err:?}");
        assert_eq!(*notifier.messages.lock().unwrap(), vec!["network error"]);
    }
}
