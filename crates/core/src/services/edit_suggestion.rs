//! Edit suggestion service (community-proposed metadata corrections).

use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde_json::Value;
use trackdrop_common::{
    AppError, AppResult, IdGenerator, MediaConfig, is_allowed_media_url, normalize_media_url,
};
use trackdrop_db::{
    entities::{
        edit_suggestion::{self, SuggestionStatus},
        song, user,
    },
    repositories::{EditSuggestionRepository, SongRepository},
};

/// Song fields a suggestion may touch. Everything else is off limits to
/// community edits (tallies, status, ownership).
const EDITABLE_FIELDS: &[&str] = &[
    "title",
    "artists",
    "genre",
    "release_date",
    "soundcloud_url",
];

/// Edit suggestion service for business logic.
#[derive(Clone)]
pub struct EditSuggestionService {
    suggestion_repo: EditSuggestionRepository,
    song_repo: SongRepository,
    media: MediaConfig,
    id_gen: IdGenerator,
}

impl EditSuggestionService {
    /// Create a new edit suggestion service.
    #[must_use]
    pub const fn new(
        suggestion_repo: EditSuggestionRepository,
        song_repo: SongRepository,
        media: MediaConfig,
    ) -> Self {
        Self {
            suggestion_repo,
            song_repo,
            media,
            id_gen: IdGenerator::new(),
        }
    }

    /// Propose a metadata correction for a song.
    pub async fn propose(
        &self,
        user_id: &str,
        song_id: &str,
        changes: Value,
        notes: &str,
    ) -> AppResult<edit_suggestion::Model> {
        self.song_repo.get_by_id(song_id).await?;

        let Some(map) = changes.as_object() else {
            return Err(AppError::Validation(
                "Changes must be a JSON object".to_string(),
            ));
        };
        if map.is_empty() {
            return Err(AppError::Validation(
                "Changes must not be empty".to_string(),
            ));
        }
        for key in map.keys() {
            if !EDITABLE_FIELDS.contains(&key.as_str()) {
                return Err(AppError::Validation(format!(
                    "Field not editable via suggestion: {key}"
                )));
            }
        }

        let model = edit_suggestion::ActiveModel {
            id: Set(self.id_gen.generate()),
            song_id: Set(song_id.to_string()),
            submitted_by: Set(user_id.to_string()),
            changes: Set(changes),
            notes: Set(notes.to_string()),
            status: Set(SuggestionStatus::Pending),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            review_notes: Set(None),
            created_at: Set(Utc::now().into()),
        };

        let created = self.suggestion_repo.create(model).await?;
        tracing::info!(suggestion_id = %created.id, song_id = %song_id, "Edit suggestion filed");
        Ok(created)
    }

    /// Review a pending suggestion (moderator-only, one-way).
    ///
    /// Approval applies the proposed changes to the song; rejection only
    /// stamps the review.
    pub async fn review(
        &self,
        moderator: &user::Model,
        suggestion_id: &str,
        approve: bool,
        notes: Option<&str>,
    ) -> AppResult<edit_suggestion::Model> {
        if !moderator.is_admin {
            return Err(AppError::Forbidden(
                "Reviewing suggestions requires a moderator".to_string(),
            ));
        }

        let suggestion = self.suggestion_repo.get_by_id(suggestion_id).await?;

        if suggestion.status != SuggestionStatus::Pending {
            return Err(AppError::AlreadyProcessed(format!(
                "Suggestion already reviewed: {suggestion_id}"
            )));
        }

        if approve {
            self.apply_changes(&suggestion).await?;
        }

        let mut model: edit_suggestion::ActiveModel = suggestion.into();
        model.status = Set(if approve {
            SuggestionStatus::Approved
        } else {
            SuggestionStatus::Rejected
        });
        model.reviewed_by = Set(Some(moderator.id.clone()));
        model.reviewed_at = Set(Some(Utc::now().into()));
        model.review_notes = Set(notes.map(str::to_string));

        let updated = self.suggestion_repo.update(model).await?;
        tracing::info!(suggestion_id = %suggestion_id, moderator = %moderator.id, approved = approve, "Edit suggestion reviewed");
        Ok(updated)
    }

    /// List suggestions, optionally filtered by status.
    pub async fn list(
        &self,
        status: Option<SuggestionStatus>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<edit_suggestion::Model>> {
        self.suggestion_repo
            .find_by_status(status, limit.clamp(1, 100), until_id)
            .await
    }

    /// List suggestions targeting a song.
    pub async fn list_for_song(
        &self,
        song_id: &str,
        limit: u64,
    ) -> AppResult<Vec<edit_suggestion::Model>> {
        self.suggestion_repo
            .find_by_song(song_id, limit.clamp(1, 100))
            .await
    }

    /// Apply an approved suggestion's changes to the song row.
    async fn apply_changes(&self, suggestion: &edit_suggestion::Model) -> AppResult<()> {
        let song = self.song_repo.get_by_id(&suggestion.song_id).await?;
        let Some(map) = suggestion.changes.as_object() else {
            return Err(AppError::Validation(
                "Changes must be a JSON object".to_string(),
            ));
        };

        let mut model: song::ActiveModel = song.into();

        for (key, value) in map {
            match key.as_str() {
                "title" => {
                    let title = as_nonempty_str(value, "title")?;
                    model.title = Set(title.to_string());
                }
                "artists" => {
                    let artists = value
                        .as_array()
                        .filter(|a| !a.is_empty() && a.iter().all(Value::is_string))
                        .ok_or_else(|| {
                            AppError::Validation(
                                "Artists must be a non-empty array of names".to_string(),
                            )
                        })?;
                    model.artists = Set(Value::Array(artists.clone()));
                }
                "genre" => {
                    let genre = as_nonempty_str(value, "genre")?;
                    model.genre = Set(genre.to_string());
                }
                "release_date" => {
                    let parsed = match value {
                        Value::Null => None,
                        Value::String(s) => Some(
                            DateTime::parse_from_rfc3339(s).map_err(|e| {
                                AppError::Validation(format!("Invalid release date: {e}"))
                            })?,
                        ),
                        _ => {
                            return Err(AppError::Validation(
                                "Release date must be an RFC 3339 string or null".to_string(),
                            ));
                        }
                    };
                    model.release_date = Set(parsed);
                }
                "soundcloud_url" => {
                    let url = match value {
                        Value::Null => None,
                        Value::String(raw) => {
                            if !is_allowed_media_url(raw, &self.media.allowed_hosts) {
                                return Err(AppError::Validation(format!(
                                    "Audio link host not allowed: {raw}"
                                )));
                            }
                            normalize_media_url(raw)
                        }
                        _ => {
                            return Err(AppError::Validation(
                                "Audio link must be a string or null".to_string(),
                            ));
                        }
                    };
                    model.soundcloud_url = Set(url);
                }
                // propose() already screened the keys.
                other => {
                    return Err(AppError::Validation(format!(
                        "Field not editable via suggestion: {other}"
                    )));
                }
            }
        }

        model.updated_at = Set(Some(Utc::now().into()));
        self.song_repo.update(model).await?;
        Ok(())
    }
}

fn as_nonempty_str<'a>(value: &'a Value, field: &str) -> AppResult<&'a str> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} must be a non-empty string")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use std::sync::Arc;
    use trackdrop_db::entities::song::VerificationStatus;

    fn create_test_song(id: &str) -> song::Model {
        song::Model {
            id: id.to_string(),
            title: "Test Track".to_string(),
            artists: json!(["Artist A"]),
            genre: "house".to_string(),
            release_date: None,
            soundcloud_url: None,
            artwork_url: None,
            uploader_id: "author".to_string(),
            verification_status: VerificationStatus::Pending,
            verified_at: None,
            up_count: 0,
            down_count: 0,
            favorite_count: 0,
            report_count: 0,
            is_archived: false,
            archived_at: None,
            archive_reason: None,
            version: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_suggestion(
        id: &str,
        status: SuggestionStatus,
        changes: Value,
    ) -> edit_suggestion::Model {
        edit_suggestion::Model {
            id: id.to_string(),
            song_id: "s1".to_string(),
            submitted_by: "user1".to_string(),
            changes,
            notes: "typo in title".to_string(),
            status,
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_moderator(is_admin: bool) -> user::Model {
        user::Model {
            id: "mod1".to_string(),
            username: "mod".to_string(),
            username_lower: "mod".to_string(),
            token: None,
            display_name: None,
            bio: None,
            avatar_url: None,
            is_public: true,
            points: 0,
            is_admin,
            is_super_admin: false,
            followers_count: 0,
            following_count: 0,
            upload_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(suggestion_db: MockDatabase, song_db: MockDatabase) -> EditSuggestionService {
        EditSuggestionService::new(
            EditSuggestionRepository::new(Arc::new(suggestion_db.into_connection())),
            SongRepository::new(Arc::new(song_db.into_connection())),
            MediaConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_propose_rejects_non_whitelisted_field() {
        let song_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_song("s1")]]);

        let service = service(MockDatabase::new(DatabaseBackend::Postgres), song_db);
        let result = service
            .propose("user1", "s1", json!({"up_count": 99}), "")
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_propose_rejects_empty_changes() {
        let song_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_song("s1")]]);

        let service = service(MockDatabase::new(DatabaseBackend::Postgres), song_db);
        let result = service.propose("user1", "s1", json!({}), "").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_review_requires_moderator() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let actor = create_test_moderator(false);
        let result = service.review(&actor, "e1", true, None).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_review_already_processed() {
        let suggestion = create_test_suggestion(
            "e1",
            SuggestionStatus::Approved,
            json!({"title": "Fixed"}),
        );
        let suggestion_db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[suggestion]]);

        let service = service(suggestion_db, MockDatabase::new(DatabaseBackend::Postgres));
        let actor = create_test_moderator(true);
        let result = service.review(&actor, "e1", false, None).await;

        assert!(matches!(result, Err(AppError::AlreadyProcessed(_))));
    }

    #[tokio::test]
    async fn test_review_approval_rejects_bad_url() {
        let suggestion = create_test_suggestion(
            "e1",
            SuggestionStatus::Pending,
            json!({"soundcloud_url": "https://example.com/x"}),
        );
        let suggestion_db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[suggestion]]);
        let song_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_song("s1")]]);

        let service = service(suggestion_db, song_db);
        let actor = create_test_moderator(true);
        let result = service.review(&actor, "e1", true, None).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
