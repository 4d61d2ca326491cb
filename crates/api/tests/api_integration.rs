//! API integration tests.
//!
//! These tests verify routing, auth, and error mapping over a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware::from_fn_with_state,
};
use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;
use trackdrop_api::{middleware::AppState, middleware::auth_middleware, router as api_router};
use trackdrop_common::{CommunityConfig, MediaConfig};
use trackdrop_core::{
    EditSuggestionService, FavoriteService, FollowingService, PointsService, ReportService,
    SongService, UserService, VoteService,
};
use trackdrop_db::{
    entities::{song, user},
    repositories::{
        EditSuggestionRepository, FavoriteRepository, FollowingRepository, PointAwardRepository,
        ReportRepository, SongRepository, UserRepository, VoteRepository,
    },
};

fn test_user(id: &str, token: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: format!("user_{id}"),
        username_lower: format!("user_{id}"),
        token: Some(token.to_string()),
        display_name: None,
        bio: None,
        avatar_url: None,
        is_public: true,
        points: 0,
        is_admin: false,
        is_super_admin: false,
        followers_count: 0,
        following_count: 0,
        upload_count: 0,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

/// Create test app state over the given connection.
fn create_test_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);
    let community = CommunityConfig::default();
    let media = MediaConfig::default();

    let user_repo = UserRepository::new(Arc::clone(&db));
    let song_repo = SongRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));
    let favorite_repo = FavoriteRepository::new(Arc::clone(&db));
    let report_repo = ReportRepository::new(Arc::clone(&db));
    let suggestion_repo = EditSuggestionRepository::new(Arc::clone(&db));
    let following_repo = FollowingRepository::new(Arc::clone(&db));
    let award_repo = PointAwardRepository::new(Arc::clone(&db));

    let points_service = PointsService::new(award_repo, user_repo.clone(), community.clone());
    let user_service = UserService::new(user_repo.clone());
    let song_service = SongService::new(
        song_repo.clone(),
        user_repo.clone(),
        points_service.clone(),
        community.clone(),
        media.clone(),
    );
    let vote_service = VoteService::new(
        vote_repo,
        song_repo.clone(),
        points_service.clone(),
        community,
    );
    let favorite_service = FavoriteService::new(favorite_repo, song_repo.clone());
    let report_service = ReportService::new(report_repo, song_repo.clone(), points_service.clone());
    let suggestion_service =
        EditSuggestionService::new(suggestion_repo, song_repo, media.clone());
    let following_service = FollowingService::new(following_repo, user_repo);

    AppState {
        user_service,
        song_service,
        vote_service,
        favorite_service,
        report_service,
        suggestion_service,
        following_service,
        points_service,
        media,
    }
}

fn router_with(db: DatabaseConnection) -> Router {
    let state = create_test_state(db);
    api_router()
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = router_with(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vote_without_auth_returns_401() {
    let app = router_with(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/votes")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"songId":"s1","direction":"up"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_without_auth_returns_401() {
    let app = router_with(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/me")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_with_bearer_token_returns_profile() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![test_user("u1", "tok-1")]])
        .into_connection();
    let app = router_with(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/me")
                .method("GET")
                .header("Authorization", "Bearer tok-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_list_songs_returns_ok() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<song::Model>::new()])
        .into_connection();
    let app = router_with(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/songs")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_list_songs_with_unknown_status_returns_400() {
    let app = router_with(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/songs?status=bogus")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_song_returns_404() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<song::Model>::new()])
        .into_connection();
    let app = router_with(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/songs/no-such-song")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_with_invalid_json_returns_error() {
    let app = router_with(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/register")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_archive_without_moderator_returns_403() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![test_user("u1", "tok-1")]])
        .into_connection();
    let app = router_with(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/songs/s1/archive")
                .method("POST")
                .header("Authorization", "Bearer tok-1")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"reason":"duplicate"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_reports_without_moderator_returns_403() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![test_user("u1", "tok-1")]])
        .into_connection();
    let app = router_with(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reports")
                .method("GET")
                .header("Authorization", "Bearer tok-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
