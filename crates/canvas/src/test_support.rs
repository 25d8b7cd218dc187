//! In-process mock Canvas server used by this crate's tests.

use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex};

use axum::Router;
use studyguide_config::CanvasConfig;

/// Shared state a mock route can record into.
#[derive(Clone, Default)]
pub struct MockCanvas {
    pub hits: Arc<AtomicUsize>,
    base: Arc<Mutex<String>>,
    queries: Arc<Mutex<Vec<Option<String>>>>,
}

impl MockCanvas {
    pub fn base(&self) -> String {
        self.base.lock().unwrap().clone()
    }

    pub fn record(&self, query: Option<String>) {
        self.queries.lock().unwrap().push(query);
    }

    pub fn queries(&self) -> Vec<Option<String>> {
        self.queries.lock().unwrap().clone()
    }
}

/// Serve `router` on an ephemeral port and return its base URL.
pub async fn spawn(router: Router, mock: &MockCanvas) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    *mock.base.lock().unwrap() = base.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    base
}

pub fn canvas_config(base_url: &str, max_retries: u32) -> CanvasConfig {
    CanvasConfig {
        base_url: base_url.to_string(),
        token: Some("test-token".into()),
        max_retries,
        backoff_ms: 0,
        timeout_secs: 5,
    }
}
