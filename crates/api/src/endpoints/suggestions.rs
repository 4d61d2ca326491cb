//! Edit suggestion endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use trackdrop_common::{AppError, AppResult};
use trackdrop_db::entities::edit_suggestion::{self, SuggestionStatus};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Edit suggestion response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub id: String,
    pub song_id: String,
    pub submitted_by: String,
    pub changes: serde_json::Value,
    pub notes: String,
    pub status: SuggestionStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<String>,
    pub review_notes: Option<String>,
    pub created_at: String,
}

impl From<edit_suggestion::Model> for SuggestionResponse {
    fn from(suggestion: edit_suggestion::Model) -> Self {
        Self {
            id: suggestion.id,
            song_id: suggestion.song_id,
            submitted_by: suggestion.submitted_by,
            changes: suggestion.changes,
            notes: suggestion.notes,
            status: suggestion.status,
            reviewed_by: suggestion.reviewed_by,
            reviewed_at: suggestion.reviewed_at.map(|dt| dt.to_rfc3339()),
            review_notes: suggestion.review_notes,
            created_at: suggestion.created_at.to_rfc3339(),
        }
    }
}

/// Propose request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeSuggestionRequest {
    pub song_id: String,
    pub changes: serde_json::Value,
    #[serde(default)]
    pub notes: String,
}

/// Review request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSuggestionRequest {
    pub approve: bool,
    pub notes: Option<String>,
}

/// List suggestions query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSuggestionsQuery {
    pub status: Option<String>,
    pub song_id: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

fn parse_status(raw: &str) -> AppResult<SuggestionStatus> {
    match raw {
        "pending" => Ok(SuggestionStatus::Pending),
        "approved" => Ok(SuggestionStatus::Approved),
        "rejected" => Ok(SuggestionStatus::Rejected),
        other => Err(AppError::Validation(format!(
            "Unknown suggestion status: {other}"
        ))),
    }
}

/// Propose a metadata edit for a song.
async fn propose(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ProposeSuggestionRequest>,
) -> AppResult<ApiResponse<SuggestionResponse>> {
    let suggestion = state
        .suggestion_service
        .propose(&user.id, &req.song_id, req.changes, &req.notes)
        .await?;
    Ok(ApiResponse::ok(suggestion.into()))
}

/// Review a suggestion (approve or reject).
async fn review(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReviewSuggestionRequest>,
) -> AppResult<ApiResponse<SuggestionResponse>> {
    let suggestion = state
        .suggestion_service
        .review(&user, &id, req.approve, req.notes.as_deref())
        .await?;
    Ok(ApiResponse::ok(suggestion.into()))
}

/// List suggestions.
async fn list(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListSuggestionsQuery>,
) -> AppResult<ApiResponse<Vec<SuggestionResponse>>> {
    let suggestions = if let Some(song_id) = query.song_id.as_deref() {
        state
            .suggestion_service
            .list_for_song(song_id, query.limit)
            .await?
    } else {
        let status = query.status.as_deref().map(parse_status).transpose()?;
        state
            .suggestion_service
            .list(status, query.limit, query.until_id.as_deref())
            .await?
    };

    Ok(ApiResponse::ok(
        suggestions.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(propose).get(list))
        .route("/{id}/review", post(review))
}
