use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::keyword::KeywordError;
use crate::orchestrator::{AnalyzeError, AnalyzeOutcome, Orchestrator};
use crate::store::{DynReportStore, StoreError};

pub const DEFAULT_LIST_LIMIT: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub store: DynReportStore,
    pub list_limit: usize,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        let store = orchestrator.store().clone();
        Self {
            orchestrator,
            store,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }

    pub fn with_list_limit(mut self, limit: usize) -> Self {
        self.list_limit = limit.max(1);
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/analyze", post(analyze))
        .route("/api/reports", get(list_reports))
        .route("/api/reports/{id}", get(get_report).delete(delete_report))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Client-facing error: status plus a short fixed message. Details stay in logs.
struct ApiError(StatusCode, &'static str);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

impl From<AnalyzeError> for ApiError {
    fn from(e: AnalyzeError) -> Self {
        match e {
            AnalyzeError::Validation(KeywordError::Missing) => {
                ApiError(StatusCode::BAD_REQUEST, "Keyword is required")
            }
            AnalyzeError::Validation(KeywordError::NotAString) => {
                ApiError(StatusCode::BAD_REQUEST, "Keyword must be a string")
            }
            AnalyzeError::Validation(KeywordError::Length { .. }) => {
                ApiError(StatusCode::BAD_REQUEST, "Keyword must be 2-50 characters")
            }
            AnalyzeError::Synthesis(_) => {
                ApiError(StatusCode::INTERNAL_SERVER_ERROR, "AI analysis failed")
            }
        }
    }
}

async fn analyze(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError(StatusCode::BAD_REQUEST, "Invalid JSON body"))?;

    match state.orchestrator.analyze(payload.get("keyword")).await? {
        AnalyzeOutcome::Done { report_id } => Ok(Json(json!({
            "reportId": report_id,
            "status": "completed",
        }))),
        AnalyzeOutcome::Degraded { analysis } => Ok(Json(json!({
            "reportId": null,
            "analysis": analysis,
            "status": "completed",
            "message": "Analysis completed but could not be saved",
        }))),
    }
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<usize>,
}

async fn list_reports(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(q) = query.map_err(|e| {
        tracing::debug!(error = %e, "rejected list query");
        ApiError(StatusCode::BAD_REQUEST, "Invalid query parameters")
    })?;
    let limit = q.limit.unwrap_or(state.list_limit).min(state.list_limit);
    let reports = state.store.list(limit).await.map_err(|e| {
        tracing::error!(target: "store", error = %e, "listing reports failed");
        ApiError(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch reports")
    })?;
    Ok(Json(json!({ "reports": reports })))
}

// Ids that are not UUIDs cannot name a report.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError(StatusCode::NOT_FOUND, "Report not found"))
}

async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    match state.store.get(id).await {
        Ok(report) => Ok(Json(report).into_response()),
        Err(StoreError::NotFound) => Err(ApiError(StatusCode::NOT_FOUND, "Report not found")),
        Err(e) => {
            tracing::error!(target: "store", %id, error = %e, "fetching report failed");
            Err(ApiError(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch report"))
        }
    }
}

async fn delete_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    state.store.delete(id).await.map_err(|e| {
        tracing::error!(target: "store", %id, error = %e, "deleting report failed");
        ApiError(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete report")
    })?;
    Ok(Json(json!({ "success": true })))
}
