//! HTTP surface: JSON endpoints over the pipelines and the session store.
//!
//! Every error body is `{"error": "<message>"}`. Validation failures carry
//! their message; provider and schema failures are logged with their stage and
//! answered with a generic message.

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use intelliclaim_core::{BatchResult, DocumentContext, HistoryEntry, QueryResult, UploadedDocument};
use intelliclaim_engine::batch::QUERIES_REQUIRED;
use intelliclaim_engine::ingest::NO_FILE;
use intelliclaim_engine::{IncomingFile, PipelineError};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Body that is not JSON or does not match the request shape.
pub const INVALID_BODY: &str = "Invalid request body";
pub const DOCUMENT_NOT_FOUND: &str = "Document not found";

pub fn router(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        .route("/process-query", post(process_query))
        .route("/batch-process", post(batch_process))
        .route("/upload-document", post(upload_document))
        .route("/history", get(history).delete(clear_session))
        .route("/history/export", get(export_history))
        .route("/documents", get(documents))
        .route("/documents/:id", get(document))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(Extension(state))
}

// ── Errors ──

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// 4xx errors keep their message; 5xx errors are logged and replaced by `generic`.
    fn from_pipeline(err: PipelineError, generic: &str) -> Self {
        let status = StatusCode::from_u16(err.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match err.client_message() {
            Some(message) if status.is_client_error() => Self {
                status,
                message: message.to_string(),
            },
            _ => {
                error!(stage = err.stage(), kind = err.kind().as_str(), error = %err, "{generic}");
                Self::internal(generic)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

// ── Queries ──

#[derive(Debug, Deserialize)]
pub struct ProcessQueryRequest {
    #[serde(default)]
    pub query: Option<String>,
    /// Defaults to the documents uploaded in this session.
    #[serde(default)]
    pub documents: Option<Vec<DocumentContext>>,
}

async fn process_query(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ProcessQueryRequest>, JsonRejection>,
) -> Result<Json<QueryResult>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        debug!(error = %rejection, "query body rejected");
        ApiError::bad_request(INVALID_BODY)
    })?;
    // A missing or blank query is rejected by the pipeline.
    let query = req.query.unwrap_or_default();
    let documents = match req.documents {
        Some(docs) => docs,
        None => state.session.document_contexts(),
    };

    let result = state
        .query
        .run(&query, &documents)
        .await
        .map_err(|e| ApiError::from_pipeline(e, "Failed to process query"))?;
    state.session.record_result(&result);
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub queries: Option<Vec<String>>,
}

async fn batch_process(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResult>, ApiError> {
    let Ok(Json(BatchRequest { queries: Some(queries) })) = payload else {
        return Err(ApiError::bad_request(QUERIES_REQUIRED));
    };

    let batch = state
        .batch
        .run(&queries)
        .await
        .map_err(|e| ApiError::from_pipeline(e, "Failed to process batch queries"))?;
    state.session.record_batch(&batch);
    Ok(Json(batch))
}

// ── Documents ──

async fn upload_document(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadedDocument>, ApiError> {
    let file = match multipart {
        Ok(multipart) => read_file_field(multipart).await?,
        Err(_) => None,
    };
    if file.is_none() {
        return Err(ApiError::bad_request(NO_FILE));
    }

    let document = state
        .ingestor
        .ingest(file)
        .await
        .map_err(|e| ApiError::from_pipeline(e, "Failed to process document"))?;
    state.session.add_document(document.clone());
    Ok(Json(document))
}

/// The first multipart field named `file`, if any.
async fn read_file_field(mut multipart: Multipart) -> Result<Option<IncomingFile>, ApiError> {
    let malformed = |e: axum::extract::multipart::MultipartError| ApiError {
        status: e.status(),
        message: e.body_text(),
    };

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(malformed)?;
        return Ok(Some(IncomingFile {
            name,
            mime_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

/// Newest upload first.
async fn documents(Extension(state): Extension<Arc<AppState>>) -> Json<Vec<UploadedDocument>> {
    Json(state.session.documents())
}

async fn document(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<UploadedDocument>, ApiError> {
    state
        .session
        .document(id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(DOCUMENT_NOT_FOUND))
}

// ── History ──

async fn history(Extension(state): Extension<Arc<AppState>>) -> Json<Vec<HistoryEntry>> {
    Json(state.session.history())
}

async fn export_history(Extension(state): Extension<Arc<AppState>>) -> Result<Response, ApiError> {
    let csv = state.session.export_csv().map_err(|e| {
        error!(error = %e, "history export failed");
        ApiError::internal("Failed to export history")
    })?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"claim-decisions.csv\""),
        ],
        csv,
    )
        .into_response())
}

async fn clear_session(Extension(state): Extension<Arc<AppState>>) -> StatusCode {
    let removed = state.session.clear();
    info!(removed, "session cleared");
    StatusCode::NO_CONTENT
}

async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "status": "ok", "backend": state.backend }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use clap::Parser;
    use http_body_util::BodyExt;
    use intelliclaim_ai::MockProvider;
    use tower::ServiceExt;

    use crate::config::Config;

    const BOUNDARY: &str = "intelliclaim-test-boundary";

    fn app_with(lm: Arc<MockProvider>, args: &[&str]) -> Router {
        let mut argv = vec!["intelliclaim", "--backend", "mock", "--seed", "1"];
        argv.extend_from_slice(args);
        let config = Config::parse_from(argv);
        let state = Arc::new(AppState::new(lm, &config));
        router(state, config.upload_limit)
    }

    fn app(lm: Arc<MockProvider>) -> Router {
        app_with(lm, &[])
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart(field: &str, filename: &str, mime: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: {mime}\r\n\
             \r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::post("/upload-document")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = send(app, req).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_backend() {
        let app = app(Arc::new(MockProvider::new()));
        let req = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send_json(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok", "backend": "mock" }));
    }

    #[tokio::test]
    async fn blank_or_missing_query_is_400() {
        let lm = Arc::new(MockProvider::new());
        let app = app(lm.clone());
        for body in [r#"{"query": "   "}"#, r#"{}"#, r#"{"documents": []}"#] {
            let (status, json) = send_json(&app, post_json("/process-query", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json, json!({ "error": "Query is required" }));
        }
        assert_eq!(lm.call_count(), 0);
    }

    #[tokio::test]
    async fn malformed_query_body_is_invalid_not_missing() {
        let lm = Arc::new(MockProvider::new());
        let app = app(lm.clone());
        for body in [
            r#"{"query": 42}"#,
            "not json",
            r#"{"query": "knee surgery", "documents": "bad"}"#,
            r#"{"query": "knee surgery", "documents": [{"name": 1}]}"#,
        ] {
            let (status, json) = send_json(&app, post_json("/process-query", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json, json!({ "error": "Invalid request body" }));
        }
        assert_eq!(lm.call_count(), 0);
    }

    #[tokio::test]
    async fn process_query_returns_flat_result_and_records_history() {
        let app = app(Arc::new(MockProvider::new()));
        let (status, body) = send_json(
            &app,
            post_json("/process-query", r#"{"query": "46M, knee surgery, Pune, 3-month policy"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["decision"], "approved");
        assert!(body["confidence"].as_f64().unwrap() <= 1.0);
        assert_eq!(body["parsedQuery"]["location"], "Pune");
        assert_eq!(body["relevantClauses"].as_array().unwrap().len(), 3);
        assert_eq!(body["documentsSearched"], 0);

        let req = Request::get("/history").body(Body::empty()).unwrap();
        let (_, history) = send_json(&app, req).await;
        assert_eq!(history.as_array().unwrap().len(), 1);
        assert_eq!(history[0]["query"], "46M, knee surgery, Pune, 3-month policy");
    }

    #[tokio::test]
    async fn provider_failure_is_generic_500() {
        let lm = Arc::new(MockProvider::new());
        lm.push_failure("upstream exploded with secret details");
        let app = app(lm);
        let (status, body) =
            send_json(&app, post_json("/process-query", r#"{"query": "knee surgery"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to process query" }));
    }

    #[tokio::test]
    async fn empty_or_malformed_batch_is_400() {
        let lm = Arc::new(MockProvider::new());
        let app = app(lm.clone());

        let (status, _) = send_json(&app, post_json("/batch-process", r#"{"queries": []}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        for body in [r#"{}"#, r#"{"queries": "knee"}"#, r#"{"queries": [1, 2]}"#] {
            let (status, json) = send_json(&app, post_json("/batch-process", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json, json!({ "error": "Queries array is required" }));
        }
        assert_eq!(lm.call_count(), 0);
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let app = app(Arc::new(MockProvider::new()));
        let (status, body) = send_json(
            &app,
            post_json("/batch-process", r#"{"queries": ["knee surgery", "cataract", "dental"]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalQueries"], 3);
        let queries: Vec<_> = body["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["query"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(queries, ["knee surgery", "cataract", "dental"]);
        assert_eq!(body["summary"]["pending"], 3);
    }

    #[tokio::test]
    async fn upload_without_file_is_400() {
        let lm = Arc::new(MockProvider::new());
        let app = app(lm.clone());

        let (status, body) = send_json(&app, multipart("attachment", "a.txt", "text/plain", "hi")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No file provided" }));

        let (status, body) = send_json(&app, post_json("/upload-document", "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No file provided" }));
        assert_eq!(lm.call_count(), 0);
    }

    #[tokio::test]
    async fn upload_rejects_disallowed_extension() {
        let app = app(Arc::new(MockProvider::new()));
        let (status, body) =
            send_json(&app, multipart("file", "run.sh", "text/x-sh", "echo hi")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains(".sh"));
    }

    #[tokio::test]
    async fn uploaded_documents_feed_later_queries() {
        let app = app_with(Arc::new(MockProvider::new()), &["--clause-source", "documents"]);
        let text = "Section 2: Waiting Periods\nKnee surgery needs a six month waiting period in Pune.";
        let (status, doc) = send_json(&app, multipart("file", "policy.txt", "text/plain", text)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(doc["name"], "policy.txt");
        assert_eq!(doc["type"], "text/plain");
        assert_eq!(doc["status"], "processed");

        let req = Request::get("/documents").body(Body::empty()).unwrap();
        let (_, docs) = send_json(&app, req).await;
        assert_eq!(docs.as_array().unwrap().len(), 1);

        let uri = format!("/documents/{}", doc["id"]);
        let (status, found) = send_json(&app, Request::get(uri).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["name"], "policy.txt");
        assert_eq!(found["extractedText"], doc["extractedText"]);

        let (_, result) =
            send_json(&app, post_json("/process-query", r#"{"query": "knee surgery in Pune"}"#)).await;
        assert_eq!(result["documentsSearched"], 1);
        assert_eq!(result["relevantClauses"][0]["document"], "policy.txt");
    }

    #[tokio::test]
    async fn documents_list_newest_first() {
        let app = app(Arc::new(MockProvider::new()));
        for name in ["first.txt", "second.txt"] {
            let (status, _) = send_json(&app, multipart("file", name, "text/plain", "cover")).await;
            assert_eq!(status, StatusCode::OK);
        }

        let req = Request::get("/documents").body(Body::empty()).unwrap();
        let (_, docs) = send_json(&app, req).await;
        let names: Vec<_> = docs
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["second.txt", "first.txt"]);
    }

    #[tokio::test]
    async fn unknown_document_is_404() {
        let app = app(Arc::new(MockProvider::new()));
        let req = Request::get("/documents/12345").body(Body::empty()).unwrap();
        let (status, body) = send_json(&app, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Document not found" }));
    }

    #[tokio::test]
    async fn export_and_clear_history() {
        let app = app(Arc::new(MockProvider::new()));
        send_json(&app, post_json("/batch-process", r#"{"queries": ["a, with comma", "b"]}"#)).await;

        let resp = app
            .clone()
            .oneshot(Request::get("/history/export").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(
            resp.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/csv")
        );
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let csv = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.contains("\"a, with comma\",\"pending\""));

        let req = Request::delete("/history").body(Body::empty()).unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let req = Request::get("/history").body(Body::empty()).unwrap();
        let (_, history) = send_json(&app, req).await;
        assert_eq!(history, json!([]));
    }
}
