use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get, post},
    Router,
};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::discord::Notifier;
use crate::github::{EventKind, Payload, DELIVERY_HEADER, EVENT_HEADER};
use crate::translate::translate;

const BANNER: &str = "GitHub Webhook Discord Bridge";
/// GitHub caps webhook deliveries at 25 MB.
const MAX_PAYLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Shared, read-only per-process state.
#[derive(Clone)]
pub struct AppState {
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", any(root))
        .route("/health", get(health))
        .route(
            "/webhook",
            post(handle_webhook).fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(MAX_PAYLOAD_BYTES))
        .fallback(not_found)
        .with_state(state)
}

/// Serve until Ctrl-C or SIGTERM.
pub async fn run(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Server starting on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

async fn root() -> &'static str {
    BANNER
}

async fn health() -> &'static str {
    "OK"
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "404 page not found")
}

async fn method_not_allowed(method: Method) -> (StatusCode, &'static str) {
    warn!("Method not allowed: {}", method);
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let event = header(&headers, EVENT_HEADER);
    let delivery = header(&headers, DELIVERY_HEADER);
    info!("Received event: {}, delivery: {}", event, delivery);

    if event.is_empty() {
        warn!("Missing {} header", EVENT_HEADER);
        return (StatusCode::BAD_REQUEST, "Bad request");
    }

    let kind = EventKind::parse(event);
    if kind == EventKind::Ping {
        info!("Ping event received");
        return (StatusCode::OK, "pong");
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => {
            warn!("Payload for {} is not a JSON object", kind);
            return (StatusCode::BAD_REQUEST, "Bad request");
        }
        Err(e) => {
            warn!(
                "Error parsing JSON: {}, body: {}",
                e,
                String::from_utf8_lossy(&body)
            );
            return (StatusCode::BAD_REQUEST, "Bad request");
        }
    };

    let message = translate(&kind, Payload::new(&payload));

    // Delivery failures stay server-side so GitHub does not redeliver.
    match state.notifier.deliver(&message).await {
        Ok(()) => info!("Event {} processed successfully", kind),
        Err(e) => error!("Error sending to Discord: {}", e),
    }

    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiscordConfig;
    use crate::discord::{DeliveryError, DiscordClient, OutboundMessage};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every message instead of sending it.
    #[derive(Default)]
    struct RecordingNotifier {
        calls: AtomicUsize,
        messages: Mutex<Vec<OutboundMessage>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.messages.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    async fn spawn_app(notifier: Arc<dyn Notifier>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(AppState::new(notifier)))
                .await
                .unwrap();
        });
        format!("http://{addr}")
    }

    async fn post_event(
        base: &str,
        event: Option<&str>,
        body: impl Into<reqwest::Body>,
    ) -> (reqwest::StatusCode, String) {
        let mut request = reqwest::Client::new()
            .post(format!("{base}/webhook"))
            .header(DELIVERY_HEADER, "72d3162e-cc78-11e3-81ab-4c9367dc0958")
            .body(body);
        if let Some(event) = event {
            request = request.header(EVENT_HEADER, event);
        }
        let response = request.send().await.unwrap();
        let status = response.status();
        (status, response.text().await.unwrap())
    }

    #[tokio::test]
    async fn test_ping_short_circuits() {
        let notifier = Arc::new(RecordingNotifier::default());
        let base = spawn_app(notifier.clone()).await;

        let (status, body) = post_event(&base, Some("ping"), "not even json").await;
        assert_eq!(status, 200);
        assert_eq!(body, "pong");
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_event_is_translated_and_delivered() {
        let notifier = Arc::new(RecordingNotifier::default());
        let base = spawn_app(notifier.clone()).await;

        let (status, body) = post_event(
            &base,
            Some("star"),
            r#"{"action":"created","repository":{"full_name":"octo/repo"}}"#,
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body, "OK");
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);

        let messages = notifier.messages.lock().unwrap();
        assert_eq!(messages[0].embeds[0].title, "[octo/repo] New star");
    }

    #[tokio::test]
    async fn test_large_push_is_accepted() {
        let notifier = Arc::new(RecordingNotifier::default());
        let base = spawn_app(notifier.clone()).await;

        let commits: Vec<serde_json::Value> = (0..3000)
            .map(|i| {
                serde_json::json!({
                    "id": format!("{i:040}"),
                    "message": "x".repeat(1000),
                    "author": {"name": "bob"},
                })
            })
            .collect();
        let body = serde_json::json!({
            "ref": "refs/heads/main",
            "repository": {"full_name": "octo/repo"},
            "commits": commits,
        })
        .to_string();
        assert!(body.len() > 2 * 1024 * 1024);

        let (status, reply) = post_event(&base, Some("push"), body).await;
        assert_eq!(status, 200);
        assert_eq!(reply, "OK");
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);

        let messages = notifier.messages.lock().unwrap();
        assert_eq!(messages[0].embeds[0].title, "[octo/repo:main] 3000 new commits");
    }

    #[tokio::test]
    async fn test_client_errors() {
        let notifier = Arc::new(RecordingNotifier::default());
        let base = spawn_app(notifier.clone()).await;

        let (status, _) = post_event(&base, None, "{}").await;
        assert_eq!(status, 400);

        let (status, _) = post_event(&base, Some(""), "{}").await;
        assert_eq!(status, 400);

        let (status, _) = post_event(&base, Some("push"), "{not json").await;
        assert_eq!(status, 400);

        let (status, _) = post_event(&base, Some("push"), "[1, 2]").await;
        assert_eq!(status, 400);

        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_post_webhook_rejected() {
        let base = spawn_app(Arc::new(RecordingNotifier::default())).await;

        let response = reqwest::get(format!("{base}/webhook")).await.unwrap();
        assert_eq!(response.status(), 405);

        let response = reqwest::Client::new()
            .put(format!("{base}/webhook"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 405);
    }

    #[tokio::test]
    async fn test_static_routes() {
        let base = spawn_app(Arc::new(RecordingNotifier::default())).await;

        let response = reqwest::get(format!("{base}/")).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), BANNER);

        let response = reqwest::Client::new()
            .post(format!("{base}/"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), BANNER);

        let response = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), "OK");

        let response = reqwest::get(format!("{base}/nope")).await.unwrap();
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_delivery_failure_still_acknowledged() {
        // Chat endpoint that rejects everything.
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let discord = Router::new().route(
            "/hook",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::BAD_REQUEST, "bad embed")
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let discord_addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, discord).await.unwrap();
        });

        let client = DiscordClient::new(DiscordConfig {
            webhook_url: format!("http://{discord_addr}/hook"),
            timeout_secs: 5,
            username: None,
            avatar_url: None,
        })
        .unwrap();
        let base = spawn_app(Arc::new(client)).await;

        let (status, body) = post_event(&base, Some("issues"), r#"{"action":"opened"}"#).await;
        assert_eq!(status, 200);
        assert_eq!(body, "OK");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
