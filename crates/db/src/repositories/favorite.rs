//! Favorite repository.

use std::sync::Arc;

use crate::entities::{Favorite, favorite};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use trackdrop_common::AppResult;

/// Favorite repository for database operations.
#[derive(Clone)]
pub struct FavoriteRepository {
    db: Arc<DatabaseConnection>,
}

impl FavoriteRepository {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a favorite by user and song.
    pub async fn find_by_user_and_song(
        &self,
        user_id: &str,
        song_id: &str,
    ) -> AppResult<Option<favorite::Model>> {
        Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::SongId.eq(song_id))
            .one(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// Check if a song is favorited by user.
    pub async fn is_favorited(&self, user_id: &str, song_id: &str) -> AppResult<bool> {
        Ok(self.find_by_user_and_song(user_id, song_id).await?.is_some())
    }

    /// Create a new favorite.
    pub async fn create(&self, model: favorite::ActiveModel) -> AppResult<favorite::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// Delete a favorite by user and song.
    pub async fn delete_by_user_and_song(&self, user_id: &str, song_id: &str) -> AppResult<()> {
        Favorite::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::SongId.eq(song_id))
            .exec(self.db.as_ref())
            .await
            .map_err(super::map_db_err)?;
        Ok(())
    }

    /// Get favorites by user (paginated, newest first).
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<favorite::Model>> {
        let mut query = Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::Id)
            .limit(limit);

        if let Some(until) = until_id {
            query = query.filter(favorite::Column::Id.lt(until));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

}
