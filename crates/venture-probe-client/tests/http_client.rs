//! End-to-end tests for the reqwest transport against a scripted TCP server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use venture_probe_client::{
    ApiRequest, ClientConfig, DelaySchedule, HttpClient, RetryPolicy, Transport,
};

/// Serves one canned `(status, body)` response per connection, in order,
/// and records the raw request text it received.
struct ScriptedServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedServer {
    async fn start(responses: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let raw = read_request(&mut stream).await;
                seen.lock().unwrap().push(raw);
                let response = format!(
                    "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        ScriptedServer {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, index: usize) -> String {
        self.requests.lock().unwrap()[index].to_lowercase()
    }
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn client(base_url: &str, attempts: u32) -> HttpClient {
    HttpClient::new(
        ClientConfig::new(base_url).with_timeout(Duration::from_secs(5)),
        RetryPolicy::new(attempts, DelaySchedule::Fixed(5)),
    )
    .expect("client")
}

/// Test: parsed JSON error responses are returned without retrying
#[tokio::test]
async fn test_parsed_error_status_is_not_retried() {
    let server = ScriptedServer::start(vec![(500, r#"{"error":"boom"}"#)]).await;
    let client = client(&server.base_url, 3);

    let result = client
        .call(&ApiRequest::post("/analysis/swot", json!({"a": 1})))
        .await;

    assert_eq!(result.status, Some(500));
    assert_eq!(result.attempts, 1);
    assert!(result.error.is_none());
    assert_eq!(result.body["error"], "boom");
    assert_eq!(server.request_count(), 1);
}

/// Test: a non-JSON body is retried and a later JSON body is accepted
#[tokio::test]
async fn test_non_json_body_is_retried() {
    let server = ScriptedServer::start(vec![
        (200, "<html>warming up</html>"),
        (200, r#"{"ok":true}"#),
    ])
    .await;
    let client = client(&server.base_url, 3);

    let result = client.call(&ApiRequest::get("/news")).await;

    assert!(result.is_success());
    assert_eq!(result.attempts, 2);
    assert_eq!(result.body, json!({"ok": true}));
}

/// Test: exhausted parse retries surface the raw text
#[tokio::test]
async fn test_exhausted_parse_retries_keep_raw_text() {
    let server = ScriptedServer::start(vec![(200, "oops"), (200, "oops")]).await;
    let client = client(&server.base_url, 2);

    let result = client.call(&ApiRequest::get("/news")).await;

    assert_eq!(result.status, Some(200));
    assert_eq!(result.attempts, 2);
    assert!(result.error.is_some());
    assert_eq!(result.raw_response(), Some("oops"));
    assert!(!result.is_success());
}

/// Test: bearer token and content type are attached
#[tokio::test]
async fn test_headers_and_body_are_sent() {
    let server = ScriptedServer::start(vec![(200, r#"{"reply":"hello"}"#)]).await;
    let client = client(&server.base_url, 1);

    let result = client
        .call(&ApiRequest::post("/chat", json!({"message": "ping"})).with_token("tok-123"))
        .await;

    assert!(result.is_success());
    let raw = server.request(0);
    assert!(raw.starts_with("post /chat "));
    assert!(raw.contains("authorization: bearer tok-123"));
    assert!(raw.contains("content-type: application/json"));
    assert!(raw.contains(r#""message":"ping""#));
}

/// Test: empty success bodies parse as null without retrying
#[tokio::test]
async fn test_empty_body_is_null() {
    let server = ScriptedServer::start(vec![(204, "")]).await;
    let client = client(&server.base_url, 3);

    let result = client
        .call(&ApiRequest::post("/questionnaire/save", json!({})))
        .await;

    assert_eq!(result.status, Some(204));
    assert_eq!(result.attempts, 1);
    assert!(result.body.is_null());
    assert!(result.is_success());
}

/// Test: connection refused is retried up to the budget
#[tokio::test]
async fn test_connection_refused_exhausts_budget() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(&format!("http://{}", addr), 2);
    let result = client.call(&ApiRequest::get("/news")).await;

    assert!(result.status.is_none());
    assert_eq!(result.attempts, 2);
    assert!(result.error.is_some());
    assert!(result.body.is_null());
}

/// Test: the status predicate opts specific statuses into retries
#[tokio::test]
async fn test_status_predicate_retries_selected_status() {
    let server = ScriptedServer::start(vec![
        (503, r#"{"error":"busy"}"#),
        (200, r#"{"ok":true}"#),
    ])
    .await;
    let client = HttpClient::new(
        ClientConfig::new(&server.base_url),
        RetryPolicy::new(3, DelaySchedule::Fixed(5)).with_status_predicate(|s| s == 503),
    )
    .expect("client");

    let result = client.call(&ApiRequest::get("/news")).await;

    assert_eq!(result.status, Some(200));
    assert_eq!(result.attempts, 2);
    assert_eq!(server.request_count(), 2);
}

/// Test: latency spans failed attempts and the delays between them
#[tokio::test]
async fn test_latency_covers_every_attempt() {
    let server = ScriptedServer::start(vec![
        (200, "not json"),
        (200, "still not json"),
        (200, r#"{"ok":true}"#),
    ])
    .await;
    let client = HttpClient::new(
        ClientConfig::new(&server.base_url).with_timeout(Duration::from_secs(5)),
        RetryPolicy::new(3, DelaySchedule::Fixed(50)),
    )
    .expect("client");

    let result = client.call(&ApiRequest::get("/news")).await;

    assert!(result.is_success());
    assert_eq!(result.attempts, 3);
    assert_eq!(server.request_count(), 3);
    assert!(result.latency_ms >= 100, "latency {}ms", result.latency_ms);
}
