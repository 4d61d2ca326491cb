//! Edit suggestion repository.

use std::sync::Arc;

use crate::entities::{
    EditSuggestion,
    edit_suggestion::{self, SuggestionStatus},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use trackdrop_common::{AppError, AppResult};

/// Edit suggestion repository for database operations.
#[derive(Clone)]
pub struct EditSuggestionRepository {
    db: Arc<DatabaseConnection>,
}

impl EditSuggestionRepository {
    /// Create a new edit suggestion repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a suggestion by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<edit_suggestion::Model>> {
        EditSuggestion::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// Get a suggestion by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<edit_suggestion::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Edit suggestion not found: {id}")))
    }

    /// Create a new suggestion.
    pub async fn create(
        &self,
        model: edit_suggestion::ActiveModel,
    ) -> AppResult<edit_suggestion::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// Update a suggestion.
    pub async fn update(
        &self,
        model: edit_suggestion::ActiveModel,
    ) -> AppResult<edit_suggestion::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// List suggestions, optionally filtered by status (newest first).
    pub async fn find_by_status(
        &self,
        status: Option<SuggestionStatus>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<edit_suggestion::Model>> {
        let mut query = EditSuggestion::find()
            .order_by_desc(edit_suggestion::Column::Id)
            .limit(limit);

        if let Some(status) = status {
            query = query.filter(edit_suggestion::Column::Status.eq(status));
        }
        if let Some(until) = until_id {
            query = query.filter(edit_suggestion::Column::Id.lt(until));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }

    /// List suggestions targeting a song.
    pub async fn find_by_song(
        &self,
        song_id: &str,
        limit: u64,
    ) -> AppResult<Vec<edit_suggestion::Model>> {
        EditSuggestion::find()
            .filter(edit_suggestion::Column::SongId.eq(song_id))
            .order_by_desc(edit_suggestion::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(super::map_db_err)
    }
}
