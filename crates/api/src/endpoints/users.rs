//! User endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use trackdrop_common::AppResult;
use trackdrop_core::{Role, UpdateUserInput};
use trackdrop_db::entities::{following, point_award, user};

use super::songs::SongResponse;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// User profile response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_public: bool,
    pub points: i64,
    /// Derived from points and stored admin flags.
    pub role: String,
    pub followers_count: i32,
    pub following_count: i32,
    pub upload_count: i32,
    pub created_at: String,
    /// Whether the caller follows this user; absent when unauthenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_following: Option<bool>,
}

impl UserResponse {
    fn from_model(user: user::Model, role: Role) -> Self {
        Self {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            bio: user.bio,
            avatar_url: user.avatar_url,
            is_public: user.is_public,
            points: user.points,
            role: role.as_str().to_string(),
            followers_count: user.followers_count,
            following_count: user.following_count,
            upload_count: user.upload_count,
            created_at: user.created_at.to_rfc3339(),
            is_following: None,
        }
    }
}

/// Keyset pagination query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

/// A follow relation edge.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowingResponse {
    pub id: String,
    pub follower_id: String,
    pub followee_id: String,
    pub created_at: String,
}

impl From<following::Model> for FollowingResponse {
    fn from(f: following::Model) -> Self {
        Self {
            id: f.id,
            follower_id: f.follower_id,
            followee_id: f.followee_id,
            created_at: f.created_at.to_rfc3339(),
        }
    }
}

/// One entry in the caller's points history.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointAwardResponse {
    pub kind: String,
    pub amount: i64,
    pub created_at: String,
}

impl From<point_award::Model> for PointAwardResponse {
    fn from(a: point_award::Model) -> Self {
        Self {
            kind: a.kind,
            amount: a.amount,
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

/// Update profile request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_public: Option<bool>,
}

/// Get a user's profile.
async fn show(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get(&id).await?;
    let role = state.points_service.role_for(&user);
    let mut resp = UserResponse::from_model(user, role);

    if let Some(caller) = caller
        && caller.id != resp.id
    {
        resp.is_following = Some(
            state
                .following_service
                .is_following(&caller.id, &resp.id)
                .await?,
        );
    }

    Ok(ApiResponse::ok(resp))
}

/// Get the caller's own profile.
async fn me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserResponse>> {
    let role = state.points_service.role_for(&user);
    Ok(ApiResponse::ok(UserResponse::from_model(user, role)))
}

/// Update the caller's profile.
async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let input = UpdateUserInput {
        display_name: req.display_name,
        bio: req.bio,
        avatar_url: req.avatar_url,
        is_public: req.is_public,
    };
    let updated = state.user_service.update_profile(&user.id, input).await?;
    let role = state.points_service.role_for(&updated);
    Ok(ApiResponse::ok(UserResponse::from_model(updated, role)))
}

/// Follow a user.
async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.following_service.follow(&user.id, &id).await?;
    Ok(ApiResponse::ok(()))
}

/// Unfollow a user.
async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.following_service.unfollow(&user.id, &id).await?;
    Ok(ApiResponse::ok(()))
}

/// Look up a profile by username.
async fn show_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get_by_username(&username).await?;
    let role = state.points_service.role_for(&user);
    Ok(ApiResponse::ok(UserResponse::from_model(user, role)))
}

/// List a user's uploads.
async fn songs(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<SongResponse>>> {
    let songs = state
        .song_service
        .list_by_uploader(&id, query.limit, query.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(
        songs
            .into_iter()
            .map(|s| SongResponse::from_model(s, &state.media.allowed_hosts))
            .collect(),
    ))
}

/// List who follows a user.
async fn followers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<FollowingResponse>>> {
    let relations = state
        .following_service
        .get_followers(&id, query.limit, query.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(
        relations.into_iter().map(Into::into).collect(),
    ))
}

/// List who a user follows.
async fn following(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<FollowingResponse>>> {
    let relations = state
        .following_service
        .get_following(&id, query.limit, query.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(
        relations.into_iter().map(Into::into).collect(),
    ))
}

/// The caller's points history, newest first.
async fn my_points(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<PointAwardResponse>>> {
    let awards = state.points_service.history(&user.id, query.limit).await?;
    Ok(ApiResponse::ok(
        awards.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me).patch(update_me))
        .route("/me/points", get(my_points))
        .route("/users/{id}", get(show))
        .route("/users/by-name/{username}", get(show_by_username))
        .route("/users/{id}/songs", get(songs))
        .route("/users/{id}/followers", get(followers))
        .route("/users/{id}/following", get(following))
        .route("/users/{id}/follow", post(follow))
        .route("/users/{id}/unfollow", post(unfollow))
}
