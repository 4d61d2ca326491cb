//! Song repository.

use std::sync::Arc;

use crate::entities::{
    Song,
    song::{self, VerificationStatus},
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use trackdrop_common::{AppError, AppResult};

/// Columns written by a version-guarded vote recompute.
///
/// The update is applied with a conditional `UPDATE ... WHERE id = ? AND
/// version = ?`; a zero-row result means another writer won the race.
#[derive(Debug, Clone)]
pub struct SongGuardedUpdate {
    pub up_count: i32,
    pub down_count: i32,
    pub verification_status: VerificationStatus,
    pub verified_at: Option<sea_orm::prelude::DateTimeWithTimeZone>,
    pub is_archived: bool,
    pub archived_at: Option<sea_orm::prelude::DateTimeWithTimeZone>,
    pub archive_reason: Option<String>,
}

/// Song repository for database operations.
#[derive(Clone)]
pub struct SongRepository {
    db: Arc<DatabaseConnection>,
}

impl SongRepository {
    /// Create a new song repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a song by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<song::Model>> {
        Song::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// Get a song by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<song::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::SongNotFound(id.to_string()))
    }

    /// Create a new song.
    pub async fn create(&self, model: song::ActiveModel) -> AppResult<song::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// Update a song.
    pub async fn update(&self, model: song::ActiveModel) -> AppResult<song::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// Delete a song (terminal moderator action).
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Song::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(super::map_db_err)?;
        Ok(())
    }

    /// List songs by verification status (paginated, newest first).
    pub async fn find_by_status(
        &self,
        status: Option<VerificationStatus>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<song::Model>> {
        let mut query = Song::find().order_by_desc(song::Column::Id).limit(limit);

        if let Some(status) = status {
            query = query.filter(song::Column::VerificationStatus.eq(status));
        }
        if let Some(until) = until_id {
            query = query.filter(song::Column::Id.lt(until));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// List songs uploaded by a user (paginated, newest first).
    pub async fn find_by_uploader(
        &self,
        uploader_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<song::Model>> {
        let mut query = Song::find()
            .filter(song::Column::UploaderId.eq(uploader_id))
            .order_by_desc(song::Column::Id)
            .limit(limit);

        if let Some(until) = until_id {
            query = query.filter(song::Column::Id.lt(until));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// Apply a vote-recompute outcome under optimistic concurrency.
    ///
    /// Returns `true` when the conditional update hit the expected version,
    /// `false` when another writer advanced the row first and the caller
    /// should re-read and retry.
    pub async fn apply_guarded(
        &self,
        song_id: &str,
        expected_version: i32,
        update: SongGuardedUpdate,
    ) -> AppResult<bool> {
        let result = Song::update_many()
            .col_expr(song::Column::UpCount, Expr::value(update.up_count))
            .col_expr(song::Column::DownCount, Expr::value(update.down_count))
            .col_expr(
                song::Column::VerificationStatus,
                Expr::value(update.verification_status),
            )
            .col_expr(song::Column::VerifiedAt, Expr::value(update.verified_at))
            .col_expr(song::Column::IsArchived, Expr::value(update.is_archived))
            .col_expr(song::Column::ArchivedAt, Expr::value(update.archived_at))
            .col_expr(
                song::Column::ArchiveReason,
                Expr::value(update.archive_reason),
            )
            .col_expr(
                song::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().fixed_offset()),
            )
            .col_expr(song::Column::Version, Expr::value(expected_version + 1))
            .filter(song::Column::Id.eq(song_id))
            .filter(song::Column::Version.eq(expected_version))
            .exec(self.db.as_ref())
            .await
            .map_err(super::map_db_err)?;

        Ok(result.rows_affected == 1)
    }

    /// Increment favorite count atomically (single UPDATE query, no fetch).
    pub async fn increment_favorite_count(&self, song_id: &str) -> AppResult<()> {
        Song::update_many()
            .col_expr(
                song::Column::FavoriteCount,
                Expr::col(song::Column::FavoriteCount).add(1),
            )
            .filter(song::Column::Id.eq(song_id))
            .exec(self.db.as_ref())
            .await
            .map_err(super::map_db_err)?;
        Ok(())
    }

    /// Decrement favorite count atomically, clamped at zero.
    pub async fn decrement_favorite_count(&self, song_id: &str) -> AppResult<()> {
        Song::update_many()
            .col_expr(
                song::Column::FavoriteCount,
                Expr::cust("GREATEST(favorite_count - 1, 0)"),
            )
            .filter(song::Column::Id.eq(song_id))
            .exec(self.db.as_ref())
            .await
            .map_err(super::map_db_err)?;
        Ok(())
    }

    /// Increment report count atomically (single UPDATE query, no fetch).
    pub async fn increment_report_count(&self, song_id: &str) -> AppResult<()> {
        Song::update_many()
            .col_expr(
                song::Column::ReportCount,
                Expr::col(song::Column::ReportCount).add(1),
            )
            .filter(song::Column::Id.eq(song_id))
            .exec(self.db.as_ref())
            .await
            .map_err(super::map_db_err)?;
        Ok(())
    }
}
