//! Fixtures for this crate's tests: a mock Canvas server and an in-memory store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde_json::{Map, Value, json};
use studyguide_canvas::{CanvasApi, CanvasClient};
use studyguide_config::CanvasConfig;
use studyguide_core::{ArtifactStore, PromptMaterials, StorageError};

fn canvas_router() -> Router {
    Router::new()
        .route(
            "/api/v1/courses",
            get(|| async {
                axum::Json(json!([
                    {"id": "1", "name": "Intro to Algorithms", "course_code": "CSC373"},
                    {"id": "2", "name": "Databases", "course_code": "CSC343"},
                ]))
            }),
        )
        .route(
            "/api/v1/courses/{id}/modules",
            get(|| async { axum::Json(json!([{"id": "10", "name": "Week 1", "items": []}])) }),
        )
        .route(
            "/api/v1/courses/{id}/assignments",
            get(|| async { axum::Json(json!([{"id": "30", "name": "Project 1"}])) }),
        )
        .route(
            "/api/v1/courses/{id}/pages/{page}",
            get(|Path((_, page)): Path<(String, String)>| async move {
                if page == "welcome" {
                    axum::Json(json!({"url": "welcome", "body": "<p>Hello</p>"})).into_response()
                } else {
                    StatusCode::NOT_FOUND.into_response()
                }
            }),
        )
        .route(
            "/api/v1/files/{id}",
            get(|| async {
                axum::Json(json!({
                    "id": "5",
                    "display_name": "syllabus.md",
                    "content-type": "text/markdown",
                    "url": "/files/5/download",
                }))
            }),
        )
        .route("/files/5/download", get(|| async { "# Syllabus" }))
}

/// A `CanvasApi` pointed at a freshly spawned mock server.
pub async fn mock_api() -> Arc<CanvasApi> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, canvas_router()).await.unwrap();
    });
    let config = CanvasConfig {
        base_url: base,
        token: Some("test-token".into()),
        max_retries: 0,
        backoff_ms: 0,
        timeout_secs: 5,
    };
    Arc::new(CanvasApi::new(CanvasClient::new(&config).unwrap()))
}

#[derive(Debug, Clone)]
pub struct ArtifactWrite {
    pub course_id: String,
    pub slug: String,
    pub content: String,
    pub meta: Map<String, Value>,
}

/// Records artifact writes; rejects keys containing `..`.
#[derive(Default)]
pub struct MemoryStore {
    writes: Mutex<Vec<ArtifactWrite>>,
}

impl MemoryStore {
    pub fn writes(&self) -> Vec<ArtifactWrite> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn read_config(&self) -> Result<PromptMaterials, StorageError> {
        Ok(PromptMaterials::default())
    }

    async fn write_artifact(
        &self,
        course_id: &str,
        slug: &str,
        content: &str,
        meta: &Map<String, Value>,
    ) -> Result<String, StorageError> {
        if course_id.contains("..") {
            return Err(StorageError::InvalidKey(course_id.to_string()));
        }
        self.writes.lock().unwrap().push(ArtifactWrite {
            course_id: course_id.to_string(),
            slug: slug.to_string(),
            content: content.to_string(),
            meta: meta.clone(),
        });
        let name = if slug.is_empty() { "study-guide" } else { slug };
        Ok(format!("memory/{course_id}/{name}.md"))
    }

    async fn write_run_record(
        &self,
        run_id: &str,
        _summary: &Map<String, Value>,
    ) -> Result<String, StorageError> {
        Ok(format!("memory/runs/{run_id}.json"))
    }
}
