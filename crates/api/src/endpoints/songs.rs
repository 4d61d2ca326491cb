//! Song endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use trackdrop_common::{AppError, AppResult, embed_url};
use trackdrop_core::CreateSongInput;
use trackdrop_db::entities::{song, song::VerificationStatus, vote::VoteDirection};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// Song response.
#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SongResponse {
    pub id: String,
    pub title: String,
    pub artists: serde_json::Value,
    pub genre: String,
    pub release_date: Option<String>,
    /// Derived from the release date, never stored.
    pub is_released: bool,
    pub soundcloud_url: Option<String>,
    /// Player URL for allowed hosts; absent means no preview available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,
    pub artwork_url: Option<String>,
    pub uploader_id: String,
    pub status: VerificationStatus,
    pub verified_at: Option<String>,
    pub net_score: i64,
    pub up_count: i32,
    pub down_count: i32,
    pub favorite_count: i32,
    pub report_count: i32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_reason: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
    /// The caller's active vote, when authenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_vote: Option<VoteDirection>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_favorited: bool,
}

impl SongResponse {
    /// Build a response view of a song row.
    #[must_use]
    pub fn from_model(song: song::Model, allowed_hosts: &[String]) -> Self {
        let is_released = song.is_released(Utc::now().into());
        let embed = embed_url(song.soundcloud_url.as_deref(), allowed_hosts);
        Self {
            id: song.id,
            title: song.title,
            artists: song.artists,
            genre: song.genre,
            release_date: song.release_date.map(|dt| dt.to_rfc3339()),
            is_released,
            soundcloud_url: song.soundcloud_url,
            embed_url: embed,
            artwork_url: song.artwork_url,
            uploader_id: song.uploader_id,
            status: song.verification_status,
            verified_at: song.verified_at.map(|dt| dt.to_rfc3339()),
            net_score: i64::from(song.up_count) - i64::from(song.down_count),
            up_count: song.up_count,
            down_count: song.down_count,
            favorite_count: song.favorite_count,
            report_count: song.report_count,
            is_archived: song.is_archived,
            archive_reason: song.archive_reason,
            created_at: song.created_at.to_rfc3339(),
            updated_at: song.updated_at.map(|dt| dt.to_rfc3339()),
            user_vote: None,
            is_favorited: false,
        }
    }
}

/// Upload request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSongRequest {
    pub title: String,
    pub artists: Vec<String>,
    pub genre: String,
    pub release_date: Option<String>,
    pub soundcloud_url: Option<String>,
    pub artwork_url: Option<String>,
}

/// List songs query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSongsQuery {
    pub status: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

/// Archive request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveSongRequest {
    pub reason: String,
}

fn parse_status(raw: &str) -> AppResult<VerificationStatus> {
    match raw {
        "pending" => Ok(VerificationStatus::Pending),
        "community_verified" => Ok(VerificationStatus::CommunityVerified),
        "artist_verified" => Ok(VerificationStatus::ArtistVerified),
        other => Err(AppError::Validation(format!(
            "Unknown verification status: {other}"
        ))),
    }
}

fn parse_release_date(raw: &str) -> AppResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .map_err(|_| AppError::Validation(format!("Invalid release date: {raw}")))
}

/// Upload a song.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateSongRequest>,
) -> AppResult<ApiResponse<SongResponse>> {
    let release_date = req
        .release_date
        .as_deref()
        .map(parse_release_date)
        .transpose()?;

    let input = CreateSongInput {
        title: req.title,
        artists: req.artists,
        genre: req.genre,
        release_date,
        soundcloud_url: req.soundcloud_url,
        artwork_url: req.artwork_url,
    };

    let song = state.song_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(SongResponse::from_model(
        song,
        &state.media.allowed_hosts,
    )))
}

/// Get a song.
async fn show(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SongResponse>> {
    let song = state.song_service.get(&id).await?;
    let mut resp = SongResponse::from_model(song, &state.media.allowed_hosts);

    if let Some(user) = user {
        resp.user_vote = state
            .vote_service
            .get_user_vote(&user.id, &id)
            .await?
            .map(|v| v.direction);
        resp.is_favorited = state.favorite_service.is_favorited(&user.id, &id).await?;
    }

    Ok(ApiResponse::ok(resp))
}

/// List songs.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListSongsQuery>,
) -> AppResult<ApiResponse<Vec<SongResponse>>> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let songs = state
        .song_service
        .list(status, query.limit, query.until_id.as_deref())
        .await?;

    let results = songs
        .into_iter()
        .map(|s| SongResponse::from_model(s, &state.media.allowed_hosts))
        .collect();
    Ok(ApiResponse::ok(results))
}

/// Mark a song artist-verified.
async fn verify(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SongResponse>> {
    let song = state.song_service.artist_verify(&user, &id).await?;
    Ok(ApiResponse::ok(SongResponse::from_model(
        song,
        &state.media.allowed_hosts,
    )))
}

/// Archive a song.
async fn archive(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ArchiveSongRequest>,
) -> AppResult<ApiResponse<SongResponse>> {
    let song = state.song_service.archive(&user, &id, &req.reason).await?;
    Ok(ApiResponse::ok(SongResponse::from_model(
        song,
        &state.media.allowed_hosts,
    )))
}

/// Delete a song.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.song_service.delete(&user, &id).await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/{id}", get(show).delete(delete))
        .route("/{id}/verify", post(verify))
        .route("/{id}/archive", post(archive))
}
