//! Vote repository.

use std::sync::Arc;

use crate::entities::{
    Vote,
    vote::{self, VoteDirection},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use trackdrop_common::AppResult;

/// Up/down tallies derived from the vote ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTally {
    pub up: u64,
    pub down: u64,
}

impl VoteTally {
    /// Net score (#up - #down).
    #[must_use]
    pub const fn net(&self) -> i64 {
        self.up as i64 - self.down as i64
    }
}

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a vote by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<vote::Model>> {
        Vote::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// Find the active vote by user and song. At most one exists.
    pub async fn find_by_user_and_song(
        &self,
        user_id: &str,
        song_id: &str,
    ) -> AppResult<Option<vote::Model>> {
        Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::SongId.eq(song_id))
            .one(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// Create a new vote.
    pub async fn create(&self, model: vote::ActiveModel) -> AppResult<vote::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// Update an existing vote (direction flip).
    pub async fn update(&self, model: vote::ActiveModel) -> AppResult<vote::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// Delete a vote.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let vote = self.find_by_id(id).await?;
        if let Some(v) = vote {
            v.delete(self.db.as_ref())
                .await
                .map_err(super::map_db_err)?;
        }
        Ok(())
    }

    /// Count active votes in one direction on a song.
    pub async fn count_by_direction(
        &self,
        song_id: &str,
        direction: VoteDirection,
    ) -> AppResult<u64> {
        Vote::find()
            .filter(vote::Column::SongId.eq(song_id))
            .filter(vote::Column::Direction.eq(direction))
            .count(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// Recompute the tallies for a song from the ledger.
    pub async fn tally(&self, song_id: &str) -> AppResult<VoteTally> {
        let up = self.count_by_direction(song_id, VoteDirection::Up).await?;
        let down = self.count_by_direction(song_id, VoteDirection::Down).await?;
        Ok(VoteTally { up, down })
    }

    /// Get votes on a song (paginated).
    pub async fn find_by_song(
        &self,
        song_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<vote::Model>> {
        let mut query = Vote::find()
            .filter(vote::Column::SongId.eq(song_id))
            .order_by_desc(vote::Column::Id)
            .limit(limit);

        if let Some(until) = until_id {
            query = query.filter(vote::Column::Id.lt(until));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }
}
