//! Database repositories.

#![allow(missing_docs)]

use sea_orm::DbErr;
use trackdrop_common::AppError;

/// Map a database error onto the application taxonomy.
///
/// Connection-level failures surface as `Unavailable` so a down backing
/// store is distinguishable from a bad query.
pub(crate) fn map_db_err(e: DbErr) -> AppError {
    match e {
        DbErr::Conn(err) => AppError::Unavailable(err.to_string()),
        DbErr::ConnectionAcquire(err) => AppError::Unavailable(err.to_string()),
        other => AppError::Database(other.to_string()),
    }
}

pub mod edit_suggestion;
pub mod favorite;
pub mod following;
pub mod point_award;
pub mod report;
pub mod song;
pub mod user;
pub mod vote;

pub use edit_suggestion::EditSuggestionRepository;
pub use favorite::FavoriteRepository;
pub use following::FollowingRepository;
pub use point_award::PointAwardRepository;
pub use report::ReportRepository;
pub use song::{SongGuardedUpdate, SongRepository};
pub use user::UserRepository;
pub use vote::{VoteRepository, VoteTally};

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnAcquireErr, RuntimeErr};

    #[test]
    fn test_connection_errors_surface_as_unavailable() {
        let err = map_db_err(DbErr::Conn(RuntimeErr::Internal(
            "connection refused".to_string(),
        )));
        assert!(matches!(err, AppError::Unavailable(_)));

        let err = map_db_err(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout));
        assert!(matches!(err, AppError::Unavailable(_)));
    }

    #[test]
    fn test_query_errors_stay_database_errors() {
        let err = map_db_err(DbErr::Query(RuntimeErr::Internal(
            "syntax error".to_string(),
        )));
        assert!(matches!(err, AppError::Database(_)));
    }
}
