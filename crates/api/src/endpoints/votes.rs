//! Vote endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use trackdrop_common::AppResult;
use trackdrop_core::VoteOutcome;
use trackdrop_db::entities::vote::VoteDirection;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Vote request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub song_id: String,
    pub direction: VoteDirection,
}

/// Cast, flip, or retract a vote.
async fn cast(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<VoteRequest>,
) -> AppResult<ApiResponse<VoteOutcome>> {
    let outcome = state
        .vote_service
        .cast(&user.id, &req.song_id, req.direction)
        .await?;
    Ok(ApiResponse::ok(outcome))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(cast))
}
