//! Point award repository.

use std::sync::Arc;

use crate::entities::{PointAward, point_award};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr,
};
use trackdrop_common::AppResult;

/// Point award repository for database operations.
#[derive(Clone)]
pub struct PointAwardRepository {
    db: Arc<DatabaseConnection>,
}

impl PointAwardRepository {
    /// Create a new point award repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check whether an event has already been credited.
    pub async fn exists(&self, event_id: &str) -> AppResult<bool> {
        Ok(PointAward::find_by_id(event_id)
            .one(self.db.as_ref())
            .await
            .map_err(super::map_db_err)?
            .is_some())
    }

    /// Insert an award row if the event has not been credited yet.
    ///
    /// Returns `true` when the row was inserted, `false` when the event
    /// identity already exists (the primary key is the dedup backstop for
    /// concurrent delivery of the same event).
    pub async fn insert_if_absent(&self, model: point_award::ActiveModel) -> AppResult<bool> {
        match model.insert(self.db.as_ref()).await {
            Ok(_) => Ok(true),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Ok(false),
                _ => Err(super::map_db_err(e)),
            },
        }
    }

    /// List awards credited to a user (newest first).
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<point_award::Model>> {
        PointAward::find()
            .filter(point_award::Column::UserId.eq(user_id))
            .order_by_desc(point_award::Column::EventId)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_award(event_id: &str, user_id: &str) -> point_award::Model {
        point_award::Model {
            event_id: event_id.to_string(),
            user_id: user_id.to_string(),
            kind: "confirm_vote".to_string(),
            amount: 10,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_exists_true() {
        let award = create_test_award("vote:v1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[award.clone()]])
                .into_connection(),
        );

        let repo = PointAwardRepository::new(db);
        assert!(repo.exists("vote:v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<point_award::Model>::new()])
                .into_connection(),
        );

        let repo = PointAwardRepository::new(db);
        assert!(!repo.exists("vote:v1").await.unwrap());
    }
}
