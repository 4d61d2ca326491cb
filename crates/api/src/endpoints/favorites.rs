//! Favorite endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use trackdrop_common::AppResult;
use trackdrop_core::FavoriteOutcome;

use super::songs::SongResponse;
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Toggle request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFavoriteRequest {
    pub song_id: String,
}

/// List favorites query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFavoritesQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

/// Favorited song response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritedSongResponse {
    pub id: String,
    pub created_at: String,
    pub song: SongResponse,
}

/// Toggle a favorite on a song.
async fn toggle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ToggleFavoriteRequest>,
) -> AppResult<ApiResponse<FavoriteOutcome>> {
    let outcome = state
        .favorite_service
        .toggle(&user.id, &req.song_id)
        .await?;
    Ok(ApiResponse::ok(outcome))
}

/// List the caller's favorites, newest first.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListFavoritesQuery>,
) -> AppResult<ApiResponse<Vec<FavoritedSongResponse>>> {
    let favorites = state
        .favorite_service
        .get_favorites(&user.id, query.limit, query.until_id.as_deref())
        .await?;

    // Favorites for songs deleted in the meantime are skipped.
    let mut results = Vec::new();
    for fav in favorites {
        if let Ok(song) = state.song_service.get(&fav.song_id).await {
            results.push(FavoritedSongResponse {
                id: fav.id,
                created_at: fav.created_at.to_rfc3339(),
                song: SongResponse::from_model(song, &state.media.allowed_hosts),
            });
        }
    }

    Ok(ApiResponse::ok(results))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(toggle))
        .route("/", get(list))
}
