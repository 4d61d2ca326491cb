//! Auth endpoints (identity provider boundary).

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use trackdrop_common::AppResult;
use trackdrop_core::RegisterInput;

use crate::{middleware::AppState, response::ApiResponse};

/// Register request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub display_name: Option<String>,
}

/// Register response. The token is returned exactly once.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub id: String,
    pub username: String,
    pub token: String,
}

/// Register a new account and mint its bearer token.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<ApiResponse<RegisterResponse>> {
    let user = state
        .user_service
        .register(RegisterInput {
            username: req.username,
            display_name: req.display_name,
        })
        .await?;

    Ok(ApiResponse::ok(RegisterResponse {
        id: user.id,
        username: user.username,
        token: user.token.unwrap_or_default(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/register", post(register))
}
