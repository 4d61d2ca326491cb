//! Song service.

use std::time::Duration;

use crate::services::points::{AwardKind, PointsService};
use chrono::Utc;
use sea_orm::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Deserialize;
use trackdrop_common::{
    AppError, AppResult, CommunityConfig, IdGenerator, MediaConfig, is_allowed_media_url,
    normalize_media_url,
};
use trackdrop_db::{
    entities::{
        song::{self, VerificationStatus},
        user,
    },
    repositories::{SongGuardedUpdate, SongRepository, UserRepository},
};
use validator::Validate;

/// Base delay for the conflict-retry backoff.
const RETRY_BASE_DELAY_MS: u64 = 20;

/// Input for creating a song.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSongInput {
    #[validate(length(min = 1, max = 512))]
    pub title: String,
    #[validate(length(min = 1))]
    pub artists: Vec<String>,
    #[validate(length(min = 1, max = 128))]
    pub genre: String,
    /// Canonical release timestamp, parsed once at the API boundary.
    pub release_date: Option<DateTimeWithTimeZone>,
    pub soundcloud_url: Option<String>,
    pub artwork_url: Option<String>,
}

/// Song service for business logic.
#[derive(Clone)]
pub struct SongService {
    song_repo: SongRepository,
    user_repo: UserRepository,
    points: PointsService,
    community: CommunityConfig,
    media: MediaConfig,
    id_gen: IdGenerator,
}

impl SongService {
    /// Create a new song service.
    #[must_use]
    pub const fn new(
        song_repo: SongRepository,
        user_repo: UserRepository,
        points: PointsService,
        community: CommunityConfig,
        media: MediaConfig,
    ) -> Self {
        Self {
            song_repo,
            user_repo,
            points,
            community,
            media,
            id_gen: IdGenerator::new(),
        }
    }

    /// Upload a song.
    ///
    /// The submission starts pending with zero tallies; the uploader is
    /// credited the upload reward, deduped by the song id.
    pub async fn create(
        &self,
        uploader_id: &str,
        input: CreateSongInput,
    ) -> AppResult<song::Model> {
        input.validate()?;

        if input.artists.iter().any(|a| a.trim().is_empty()) {
            return Err(AppError::Validation(
                "Artist names must not be empty".to_string(),
            ));
        }

        let soundcloud_url = match input.soundcloud_url.as_deref() {
            Some(raw) => {
                if !is_allowed_media_url(raw, &self.media.allowed_hosts) {
                    return Err(AppError::Validation(format!(
                        "Audio link host not allowed: {raw}"
                    )));
                }
                normalize_media_url(raw)
            }
            None => None,
        };

        // Uploader must exist before we hand out an id.
        self.user_repo.get_by_id(uploader_id).await?;

        let song_id = self.id_gen.generate();
        let model = song::ActiveModel {
            id: Set(song_id.clone()),
            title: Set(input.title),
            artists: Set(serde_json::json!(input.artists)),
            genre: Set(input.genre),
            release_date: Set(input.release_date),
            soundcloud_url: Set(soundcloud_url),
            artwork_url: Set(input.artwork_url),
            uploader_id: Set(uploader_id.to_string()),
            verification_status: Set(VerificationStatus::Pending),
            verified_at: Set(None),
            up_count: Set(0),
            down_count: Set(0),
            favorite_count: Set(0),
            report_count: Set(0),
            is_archived: Set(false),
            archived_at: Set(None),
            archive_reason: Set(None),
            version: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.song_repo.create(model).await?;

        self.user_repo.increment_upload_count(uploader_id).await?;
        self.points
            .award(uploader_id, AwardKind::Upload, &song_id)
            .await?;

        tracing::info!(song_id = %created.id, uploader_id = %uploader_id, "Song uploaded");
        Ok(created)
    }

    /// Get a song by ID.
    pub async fn get(&self, song_id: &str) -> AppResult<song::Model> {
        self.song_repo.get_by_id(song_id).await
    }

    /// List songs, optionally filtered by verification status.
    pub async fn list(
        &self,
        status: Option<VerificationStatus>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<song::Model>> {
        self.song_repo
            .find_by_status(status, limit.clamp(1, 100), until_id)
            .await
    }

    /// List songs uploaded by a user.
    pub async fn list_by_uploader(
        &self,
        uploader_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<song::Model>> {
        self.song_repo
            .find_by_uploader(uploader_id, limit.clamp(1, 100), until_id)
            .await
    }

    /// Mark a song artist-verified (moderation path).
    ///
    /// Not revertible by votes. The uploader reward uses the same event
    /// identity as the community path, so the credit lands once per song
    /// whichever path verifies it first.
    pub async fn artist_verify(
        &self,
        actor: &user::Model,
        song_id: &str,
    ) -> AppResult<song::Model> {
        if !actor.is_admin {
            return Err(AppError::Forbidden(
                "Artist verification requires a moderator".to_string(),
            ));
        }

        let song = self
            .guarded_write(song_id, |song, update| {
                if song.verification_status == VerificationStatus::ArtistVerified {
                    return Err(AppError::AlreadyProcessed(format!(
                        "Song already artist-verified: {}",
                        song.id
                    )));
                }
                update.verification_status = VerificationStatus::ArtistVerified;
                update.verified_at = Some(Utc::now().into());
                Ok(())
            })
            .await?;

        self.points
            .award(&song.uploader_id, AwardKind::VerifiedUpload, song_id)
            .await?;

        tracing::info!(song_id = %song_id, actor = %actor.id, "Song artist-verified");
        self.song_repo.get_by_id(song_id).await
    }

    /// Archive a song (moderation path).
    pub async fn archive(
        &self,
        actor: &user::Model,
        song_id: &str,
        reason: &str,
    ) -> AppResult<song::Model> {
        if !actor.is_admin {
            return Err(AppError::Forbidden(
                "Archiving requires a moderator".to_string(),
            ));
        }
        if reason.trim().is_empty() {
            return Err(AppError::Validation(
                "Archive reason must not be empty".to_string(),
            ));
        }

        self.guarded_write(song_id, |song, update| {
            if song.is_archived {
                return Err(AppError::AlreadyProcessed(format!(
                    "Song already archived: {}",
                    song.id
                )));
            }
            update.is_archived = true;
            update.archived_at = Some(Utc::now().into());
            update.archive_reason = Some(reason.to_string());
            Ok(())
        })
        .await?;

        tracing::info!(song_id = %song_id, actor = %actor.id, reason = %reason, "Song archived");
        self.song_repo.get_by_id(song_id).await
    }

    /// Delete a song outright (terminal moderator action).
    pub async fn delete(&self, actor: &user::Model, song_id: &str) -> AppResult<()> {
        if !actor.is_admin {
            return Err(AppError::Forbidden(
                "Deletion requires a moderator".to_string(),
            ));
        }

        // 404 rather than a silent no-op for unknown ids.
        self.song_repo.get_by_id(song_id).await?;
        self.song_repo.delete(song_id).await?;

        tracing::info!(song_id = %song_id, actor = %actor.id, "Song deleted");
        Ok(())
    }

    /// Apply a mutation to a song row under optimistic concurrency.
    ///
    /// The mutator receives the fresh row and an update pre-filled from it;
    /// a lost version race re-reads and retries up to the configured budget.
    async fn guarded_write<F>(&self, song_id: &str, mutate: F) -> AppResult<song::Model>
    where
        F: Fn(&song::Model, &mut SongGuardedUpdate) -> AppResult<()>,
    {
        let mut attempt: u32 = 0;

        loop {
            let song = self.song_repo.get_by_id(song_id).await?;

            let mut update = SongGuardedUpdate {
                up_count: song.up_count,
                down_count: song.down_count,
                verification_status: song.verification_status.clone(),
                verified_at: song.verified_at,
                is_archived: song.is_archived,
                archived_at: song.archived_at,
                archive_reason: song.archive_reason.clone(),
            };
            mutate(&song, &mut update)?;

            if self
                .song_repo
                .apply_guarded(song_id, song.version, update)
                .await?
            {
                return Ok(song);
            }

            attempt += 1;
            if attempt >= self.community.max_write_attempts {
                return Err(AppError::Conflict(format!(
                    "Guarded write lost {attempt} races on song {song_id}"
                )));
            }

            let delay = RETRY_BASE_DELAY_MS << attempt;
            tracing::debug!(song_id = %song_id, attempt = attempt, delay_ms = delay, "Guarded update lost race, retrying");
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;
    use std::sync::Arc;
    use trackdrop_db::repositories::PointAwardRepository;

    fn create_test_user(id: &str, is_admin: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: "alice".to_string(),
            username_lower: "alice".to_string(),
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

    fn create_test_song(id: &str, uploader_id: &str) -> song::Model {
        song::Model {
            id: id.to_string(),
            title: "Test Track".to_string(),
            artists: json!(["Artist A"]),
            genre: "house".to_string(),
            release_date: None,
            soundcloud_url: None,
            artwork_url: None,
            uploader_id: uploader_id.to_string(),
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

    fn input(soundcloud_url: Option<&str>) -> CreateSongInput {
        CreateSongInput {
            title: "Test Track".to_string(),
            artists: vec!["Artist A".to_string()],
            genre: "house".to_string(),
            release_date: None,
            soundcloud_url: soundcloud_url.map(str::to_string),
            artwork_url: None,
        }
    }

    fn service(song_db: MockDatabase, user_db: MockDatabase) -> SongService {
        let points = PointsService::new(
            PointAwardRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            UserRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            CommunityConfig::default(),
        );
        SongService::new(
            SongRepository::new(Arc::new(song_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
            points,
            CommunityConfig::default(),
            MediaConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_create_rejects_disallowed_host() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service
            .create("user1", input(Some("https://example.com/track")))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let mut bad = input(None);
        bad.title = String::new();
        let result = service.create("user1", bad).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_artist() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let mut bad = input(None);
        bad.artists = vec!["  ".to_string()];
        let result = service.create("user1", bad).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_unknown_uploader() {
        let song_db = MockDatabase::new(DatabaseBackend::Postgres);
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]);

        let service = service(song_db, user_db);
        let result = service.create("ghost", input(None)).await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_artist_verify_requires_moderator() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let actor = create_test_user("user1", false);
        let result = service.artist_verify(&actor, "s1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_artist_verify_already_processed() {
        let mut song = create_test_song("s1", "author");
        song.verification_status = VerificationStatus::ArtistVerified;
        song.verified_at = Some(Utc::now().into());

        let song_db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[song]]);

        let service = service(song_db, MockDatabase::new(DatabaseBackend::Postgres));
        let actor = create_test_user("mod1", true);
        let result = service.artist_verify(&actor, "s1").await;

        assert!(matches!(result, Err(AppError::AlreadyProcessed(_))));
    }

    #[tokio::test]
    async fn test_archive_already_archived() {
        let mut song = create_test_song("s1", "author");
        song.is_archived = true;
        song.archived_at = Some(Utc::now().into());

        let song_db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[song]]);

        let service = service(song_db, MockDatabase::new(DatabaseBackend::Postgres));
        let actor = create_test_user("mod1", true);
        let result = service.archive(&actor, "s1", "takedown").await;

        assert!(matches!(result, Err(AppError::AlreadyProcessed(_))));
    }

    #[tokio::test]
    async fn test_delete_requires_moderator() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let actor = create_test_user("user1", false);
        let result = service.delete(&actor, "s1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_guarded_write_conflict_after_exhausted_retries() {
        let song = create_test_song("s1", "author");

        let mut song_db = MockDatabase::new(DatabaseBackend::Postgres);
        for _ in 0..3 {
            song_db = song_db
                .append_query_results([[song.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }]);
        }

        let service = service(song_db, MockDatabase::new(DatabaseBackend::Postgres));
        let actor = create_test_user("mod1", true);
        let result = service.archive(&actor, "s1", "takedown").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
