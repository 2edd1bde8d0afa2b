//! Shared helpers for infra integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use incognia_domain::ClientConfig;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";

/// Install a tracing subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn config_for(base_url: &str, max_retries: u32) -> ClientConfig {
    ClientConfig::new(CLIENT_ID, CLIENT_SECRET)
        .with_base_url(base_url)
        .with_max_retries(max_retries)
        .with_retry_delay_ms(5)
        .with_timeout_ms(2_000)
}

pub fn token_body(token: &str, expires_in: i64) -> serde_json::Value {
    json!({"access_token": token, "token_type": "Bearer", "expires_in": expires_in})
}

/// Mount a token endpoint that grants `token` and expects `calls` requests.
pub async fn mount_token(server: &MockServer, token: &str, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token, 1200)))
        .expect(calls)
        .mount(server)
        .await;
}

pub async fn requests_to(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == route)
        .count()
}

/// Minimal HTTP/1.1 server whose resource endpoint drops the first
/// `failures` connections without answering, then replies with `body`.
///
/// Token requests are always answered so only resource attempts are
/// counted.
pub struct FlakyServer {
    pub base_url: String,
    resource_attempts: Arc<AtomicUsize>,
}

impl FlakyServer {
    pub async fn start(failures: usize, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let resource_attempts = Arc::new(AtomicUsize::new(0));
        let attempts = resource_attempts.clone();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let attempts = attempts.clone();
                tokio::spawn(async move {
                    handle_connection(stream, attempts, failures, body).await;
                });
            }
        });

        Self { base_url: format!("http://{addr}"), resource_attempts }
    }

    pub fn resource_attempts(&self) -> usize {
        self.resource_attempts.load(Ordering::SeqCst)
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    attempts: Arc<AtomicUsize>,
    failures: usize,
    body: &'static str,
) {
    let Some(head) = read_request(&mut stream).await else {
        return;
    };

    let response_body = if head.contains(" /v2/token ") {
        token_body("tok", 1200).to_string()
    } else {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < failures {
            // Close without a response: the client sees a broken connection.
            return;
        }
        body.to_string()
    };

    let response = format!(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        response_body.len(),
        response_body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Read the request head and any `content-length` body; returns the head.
async fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];

    let header_end = loop {
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    Some(head)
}
