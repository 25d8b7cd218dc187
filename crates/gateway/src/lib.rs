//! HTTP tool-dispatch gateway.
//!
//! Lets a hosted agent call the Canvas toolset over HTTP:
//!
//! - `GET /health`
//! - `GET /mcp/tools`: registered tool names, sorted
//! - `POST /mcp/tools`: `{tool, arguments}` ⇒ `{ok: true, result}`, or
//!   `400 {ok: false, error}` when the request or the tool fails

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use studyguide_canvas::{CanvasApi, CanvasClient};
use studyguide_config::AppConfig;
use studyguide_storage::create_storage;
use studyguide_tools::{ToolDispatcher, canvas_registry};
use tracing::{info, warn};

type SharedState = Arc<ToolDispatcher>;

/// Build the router over an existing dispatcher.
pub fn build_router(dispatcher: ToolDispatcher) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/mcp/tools", get(list_tools_handler).post(dispatch_handler))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(Arc::new(dispatcher))
}

/// Build the toolset from `config` and serve it until the process stops.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let api = Arc::new(CanvasApi::new(CanvasClient::new(&config.canvas)?));
    let storage = create_storage(&config.storage_provider, &config.storage)?;
    let registry = canvas_registry(api, storage, config.course_filter.clone());
    let dispatcher = ToolDispatcher::new(Arc::new(registry));

    info!(addr = %addr, tools = dispatcher.registry().len(), "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, build_router(dispatcher)).await?;
    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct ToolListResponse {
    tools: Vec<String>,
    count: usize,
}

async fn list_tools_handler(State(dispatcher): State<SharedState>) -> Json<ToolListResponse> {
    let tools = dispatcher.list_tools();
    Json(ToolListResponse {
        count: tools.len(),
        tools,
    })
}

#[derive(Deserialize)]
struct ToolRequest {
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    arguments: Value,
}

fn failure(error: impl std::fmt::Display) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"ok": false, "error": error.to_string()})),
    )
}

async fn dispatch_handler(
    State(dispatcher): State<SharedState>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let request: ToolRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return failure(format!("Invalid request body: {e}")),
    };
    let Some(tool) = request.tool.filter(|t| !t.is_empty()) else {
        return failure("Missing 'tool' in payload");
    };

    match dispatcher.dispatch(&tool, request.arguments).await {
        Ok(result) => (StatusCode::OK, Json(json!({"ok": true, "result": result}))),
        Err(e) => {
            warn!(tool = %tool, error = %e, "Tool dispatch failed");
            failure(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use studyguide_core::{Tool, ToolError, ToolRegistry, ToolResult};
    use tower::ServiceExt;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "list_modules"
        }
        fn description(&self) -> &str {
            "echo"
        }
        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {"course_id": {"type": "string"}}})
        }
        async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
            match arguments.get("course_id") {
                Some(id) => Ok(ToolResult::Json(json!([{"course_id": id}]))),
                None => Err(ToolError::InvalidArguments("course_id is required".into())),
            }
        }
    }

    struct CoursesTool;

    #[async_trait]
    impl Tool for CoursesTool {
        fn name(&self) -> &str {
            "list_my_courses"
        }
        fn description(&self) -> &str {
            "courses"
        }
        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn execute(&self, _arguments: Value) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::Json(json!([{"id": "1"}])))
        }
    }

    fn app() -> Router {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        registry.register(Box::new(CoursesTool));
        build_router(ToolDispatcher::new(Arc::new(registry)))
    }

    async fn post(body: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri("/mcp/tools")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_endpoint() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn lists_tools_sorted() {
        let req = Request::builder().uri("/mcp/tools").body(Body::empty()).unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["tools"], json!(["list_modules", "list_my_courses"]));
        assert_eq!(json["count"], 2);
    }

    #[tokio::test]
    async fn dispatches_tool_with_arguments() {
        let (status, json) =
            post(r#"{"tool": "list_modules", "arguments": {"course_id": "7"}}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"ok": true, "result": [{"course_id": "7"}]}));
    }

    #[tokio::test]
    async fn missing_arguments_mean_empty_object() {
        let (status, json) = post(r#"{"tool": "list_my_courses"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["result"], json!([{"id": "1"}]));
    }

    #[tokio::test]
    async fn missing_tool_is_rejected() {
        let (status, json) = post(r#"{"arguments": {}}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "Missing 'tool' in payload");
    }

    #[tokio::test]
    async fn unknown_tool_and_tool_errors_are_reported() {
        let (status, json) = post(r#"{"tool": "drop_tables"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Tool not found: drop_tables");

        let (status, json) = post(r#"{"tool": "list_modules", "arguments": {}}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("course_id is required"));
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let (status, json) = post("{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["ok"], false);
    }
}
