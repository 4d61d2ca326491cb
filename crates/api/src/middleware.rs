//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use trackdrop_common::MediaConfig;
use trackdrop_core::{
    EditSuggestionService, FavoriteService, FollowingService, PointsService, ReportService,
    SongService, UserService, VoteService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub song_service: SongService,
    pub vote_service: VoteService,
    pub favorite_service: FavoriteService,
    pub report_service: ReportService,
    pub suggestion_service: EditSuggestionService,
    pub following_service: FollowingService,
    pub points_service: PointsService,
    pub media: MediaConfig,
}

/// Authentication middleware.
///
/// Resolves a bearer token to a user and stashes it in request extensions;
/// handlers opt in via the `AuthUser` / `MaybeAuthUser` extractors.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
