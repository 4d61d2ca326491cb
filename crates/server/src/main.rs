//! Trackdrop server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trackdrop_api::{middleware::AppState, router as api_router};
use trackdrop_common::Config;
use trackdrop_core::{
    EditSuggestionService, FavoriteService, FollowingService, PointsService, ReportService,
    SongService, UserService, VoteService,
};
use trackdrop_db::repositories::{
    EditSuggestionRepository, FavoriteRepository, FollowingRepository, PointAwardRepository,
    ReportRepository, SongRepository, UserRepository, VoteRepository,
};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trackdrop=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting trackdrop server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = trackdrop_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    trackdrop_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let song_repo = SongRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));
    let favorite_repo = FavoriteRepository::new(Arc::clone(&db));
    let report_repo = ReportRepository::new(Arc::clone(&db));
    let suggestion_repo = EditSuggestionRepository::new(Arc::clone(&db));
    let following_repo = FollowingRepository::new(Arc::clone(&db));
    let award_repo = PointAwardRepository::new(Arc::clone(&db));

    // Initialize services
    let points_service = PointsService::new(
        award_repo,
        user_repo.clone(),
        config.community.clone(),
    );
    let user_service = UserService::new(user_repo.clone());
    let song_service = SongService::new(
        song_repo.clone(),
        user_repo.clone(),
        points_service.clone(),
        config.community.clone(),
        config.media.clone(),
    );
    let vote_service = VoteService::new(
        vote_repo,
        song_repo.clone(),
        points_service.clone(),
        config.community.clone(),
    );
    let favorite_service = FavoriteService::new(favorite_repo, song_repo.clone());
    let report_service = ReportService::new(report_repo, song_repo.clone(), points_service.clone());
    let suggestion_service =
        EditSuggestionService::new(suggestion_repo, song_repo, config.media.clone());
    let following_service = FollowingService::new(following_repo, user_repo);

    let state = AppState {
        user_service,
        song_service,
        vote_service,
        favorite_service,
        report_service,
        suggestion_service,
        following_service,
        points_service,
        media: config.media.clone(),
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            trackdrop_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
