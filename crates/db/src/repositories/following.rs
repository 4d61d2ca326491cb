//! Following repository.

use std::sync::Arc;

use crate::entities::{Following, following};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use trackdrop_common::AppResult;

/// Following repository for database operations.
#[derive(Clone)]
pub struct FollowingRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowingRepository {
    /// Create a new following repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check if a user follows another.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        Ok(Following::find()
            .filter(following::Column::FollowerId.eq(follower_id))
            .filter(following::Column::FolloweeId.eq(followee_id))
            .one(self.db.as_ref())
            .await
            .map_err(super::map_db_err)?
            .is_some())
    }

    /// Create a following relation.
    pub async fn create(&self, model: following::ActiveModel) -> AppResult<following::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// Delete a following relation by pair.
    pub async fn delete_by_pair(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        Following::delete_many()
            .filter(following::Column::FollowerId.eq(follower_id))
            .filter(following::Column::FolloweeId.eq(followee_id))
            .exec(self.db.as_ref())
            .await
            .map_err(super::map_db_err)?;
        Ok(())
    }

    /// List follower relations of a user (paginated).
    pub async fn find_followers(
        &self,
        followee_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<following::Model>> {
        let mut query = Following::find()
            .filter(following::Column::FolloweeId.eq(followee_id))
            .order_by_desc(following::Column::Id)
            .limit(limit);

        if let Some(until) = until_id {
            query = query.filter(following::Column::Id.lt(until));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// List who a user follows (paginated).
    pub async fn find_following(
        &self,
        follower_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<following::Model>> {
        let mut query = Following::find()
            .filter(following::Column::FollowerId.eq(follower_id))
            .order_by_desc(following::Column::Id)
            .limit(limit);

        if let Some(until) = until_id {
            query = query.filter(following::Column::Id.lt(until));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }
}
