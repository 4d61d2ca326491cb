//! API endpoints.

mod auth;
mod favorites;
mod reports;
mod songs;
mod suggestions;
mod users;
mod votes;

use axum::Router;

use crate::middleware::AppState;

pub use songs::SongResponse;
pub use users::UserResponse;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/songs", songs::router())
        .nest("/votes", votes::router())
        .nest("/favorites", favorites::router())
        .nest("/reports", reports::router())
        .nest("/suggestions", suggestions::router())
        .merge(users::router())
}
