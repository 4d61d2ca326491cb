//! Report endpoints (moderation queue).

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use trackdrop_common::{AppError, AppResult};
use trackdrop_core::ReportOutcome;
use trackdrop_db::entities::report::{self, ReportStatus};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Report response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: String,
    pub song_id: String,
    pub reporter_id: String,
    pub reason: String,
    pub detail: String,
    pub status: ReportStatus,
    pub processed_by: Option<String>,
    pub processed_at: Option<String>,
    pub created_at: String,
}

impl From<report::Model> for ReportResponse {
    fn from(report: report::Model) -> Self {
        Self {
            id: report.id,
            song_id: report.song_id,
            reporter_id: report.reporter_id,
            reason: report.reason,
            detail: report.detail,
            status: report.status,
            processed_by: report.processed_by,
            processed_at: report.processed_at.map(|dt| dt.to_rfc3339()),
            created_at: report.created_at.to_rfc3339(),
        }
    }
}

/// File report request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReportRequest {
    pub song_id: String,
    pub reason: String,
    #[serde(default)]
    pub detail: String,
}

/// Resolve request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveReportRequest {
    pub outcome: ReportOutcome,
}

/// List reports query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsQuery {
    pub status: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    20
}

fn parse_status(raw: &str) -> AppResult<ReportStatus> {
    match raw {
        "pending" => Ok(ReportStatus::Pending),
        "resolved" => Ok(ReportStatus::Resolved),
        "rejected" => Ok(ReportStatus::Rejected),
        other => Err(AppError::Validation(format!(
            "Unknown report status: {other}"
        ))),
    }
}

/// File a report against a song.
async fn file(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FileReportRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let report = state
        .report_service
        .file(&user.id, &req.song_id, &req.reason, &req.detail)
        .await?;
    Ok(ApiResponse::ok(report.into()))
}

/// Resolve or reject a report.
async fn resolve(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ResolveReportRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let report = state.report_service.resolve(&user, &id, req.outcome).await?;
    Ok(ApiResponse::ok(report.into()))
}

/// List reports (moderator view).
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListReportsQuery>,
) -> AppResult<ApiResponse<Vec<ReportResponse>>> {
    if !user.is_admin {
        return Err(AppError::Forbidden(
            "Listing reports requires a moderator".to_string(),
        ));
    }

    let status = query.status.as_deref().map(parse_status).transpose()?;
    let reports = state
        .report_service
        .list(status, query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(
        reports.into_iter().map(Into::into).collect(),
    ))
}

/// Pending queue depth (moderator view).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCountResponse {
    pub pending: u64,
}

async fn pending_count(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<PendingCountResponse>> {
    if !user.is_admin {
        return Err(AppError::Forbidden(
            "Listing reports requires a moderator".to_string(),
        ));
    }

    let pending = state.report_service.count_pending().await?;
    Ok(ApiResponse::ok(PendingCountResponse { pending }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(file).get(list))
        .route("/count", get(pending_count))
        .route("/{id}/resolve", post(resolve))
}
