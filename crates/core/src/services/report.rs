//! Report service (moderation queue).

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use trackdrop_common::{AppError, AppResult, IdGenerator};
use trackdrop_db::{
    entities::{
        report::{self, ReportStatus},
        user,
    },
    repositories::{ReportRepository, SongRepository},
};

use crate::services::points::{AwardKind, PointsService};

/// Reason codes accepted for a report.
pub const ALLOWED_REASONS: &[&str] = &[
    "duplicate",
    "copyright",
    "inappropriate",
    "spam",
    "incorrect_info",
    "other",
];

/// Terminal outcome of a report resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportOutcome {
    Resolved,
    Rejected,
}

impl ReportOutcome {
    const fn status(self) -> ReportStatus {
        match self {
            Self::Resolved => ReportStatus::Resolved,
            Self::Rejected => ReportStatus::Rejected,
        }
    }
}

/// Report service for business logic.
#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    song_repo: SongRepository,
    points: PointsService,
    id_gen: IdGenerator,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        song_repo: SongRepository,
        points: PointsService,
    ) -> Self {
        Self {
            report_repo,
            song_repo,
            points,
            id_gen: IdGenerator::new(),
        }
    }

    /// File a report against a song.
    ///
    /// One pending report per reporter per song; re-reporting is allowed
    /// once the prior report has been processed. Filing bumps the song's
    /// report tally and credits the reporter, deduped by the report id.
    pub async fn file(
        &self,
        reporter_id: &str,
        song_id: &str,
        reason: &str,
        detail: &str,
    ) -> AppResult<report::Model> {
        let song = self.song_repo.get_by_id(song_id).await?;

        if song.uploader_id == reporter_id {
            // Reporting your own upload always fails with Unauthorized.
            return Err(AppError::Unauthorized);
        }

        if !ALLOWED_REASONS.contains(&reason) {
            return Err(AppError::Validation(format!(
                "Unknown report reason: {reason}"
            )));
        }

        if self.report_repo.has_pending(reporter_id, song_id).await? {
            return Err(AppError::AlreadyReported);
        }

        let report_id = self.id_gen.generate();
        let model = report::ActiveModel {
            id: Set(report_id.clone()),
            song_id: Set(song_id.to_string()),
            reporter_id: Set(reporter_id.to_string()),
            reason: Set(reason.to_string()),
            detail: Set(detail.to_string()),
            status: Set(ReportStatus::Pending),
            processed_by: Set(None),
            processed_at: Set(None),
            created_at: Set(Utc::now().into()),
        };

        let created = self.report_repo.create(model).await?;

        self.song_repo.increment_report_count(song_id).await?;
        self.points
            .award(reporter_id, AwardKind::Report, &report_id)
            .await?;

        tracing::info!(report_id = %created.id, song_id = %song_id, reason = %reason, "Report filed");
        Ok(created)
    }

    /// Resolve a pending report (moderator-only, one-way).
    pub async fn resolve(
        &self,
        moderator: &user::Model,
        report_id: &str,
        outcome: ReportOutcome,
    ) -> AppResult<report::Model> {
        if !moderator.is_admin {
            return Err(AppError::Forbidden(
                "Resolving reports requires a moderator".to_string(),
            ));
        }

        let report = self.report_repo.get_by_id(report_id).await?;

        if report.status != ReportStatus::Pending {
            return Err(AppError::AlreadyProcessed(format!(
                "Report already processed: {report_id}"
            )));
        }

        let mut model: report::ActiveModel = report.into();
        model.status = Set(outcome.status());
        model.processed_by = Set(Some(moderator.id.clone()));
        model.processed_at = Set(Some(Utc::now().into()));

        let updated = self.report_repo.update(model).await?;

        tracing::info!(report_id = %report_id, moderator = %moderator.id, status = ?updated.status, "Report processed");
        Ok(updated)
    }

    /// List reports for the moderation queue.
    pub async fn list(
        &self,
        status: Option<ReportStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<report::Model>> {
        self.report_repo
            .find_by_status(status, limit.clamp(1, 100), offset)
            .await
    }

    /// Count pending reports.
    pub async fn count_pending(&self) -> AppResult<u64> {
        self.report_repo.count_pending().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use std::sync::Arc;
    use trackdrop_common::CommunityConfig;
    use trackdrop_db::entities::song::{self, VerificationStatus};
    use trackdrop_db::repositories::{PointAwardRepository, UserRepository};

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

    fn create_test_report(id: &str, status: ReportStatus) -> report::Model {
        report::Model {
            id: id.to_string(),
            song_id: "s1".to_string(),
            reporter_id: "user1".to_string(),
            reason: "duplicate".to_string(),
            detail: String::new(),
            status,
            processed_by: None,
            processed_at: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_moderator(id: &str, is_admin: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
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

    fn service(report_db: MockDatabase, song_db: MockDatabase) -> ReportService {
        let points = PointsService::new(
            PointAwardRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            UserRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            CommunityConfig::default(),
        );
        ReportService::new(
            ReportRepository::new(Arc::new(report_db.into_connection())),
            SongRepository::new(Arc::new(song_db.into_connection())),
            points,
        )
    }

    #[tokio::test]
    async fn test_file_own_song_rejected() {
        let song = create_test_song("s1", "user1");
        let song_db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[song]]);

        let service = service(MockDatabase::new(DatabaseBackend::Postgres), song_db);
        let result = service.file("user1", "s1", "duplicate", "").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_file_unknown_reason() {
        let song = create_test_song("s1", "author");
        let song_db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[song]]);

        let service = service(MockDatabase::new(DatabaseBackend::Postgres), song_db);
        let result = service.file("user1", "s1", "sounds_bad", "").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_file_pending_duplicate_rejected() {
        let song = create_test_song("s1", "author");
        let song_db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[song]]);
        let report_db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([
            [maplit::btreemap! {
                "num_items" => sea_orm::Value::BigInt(Some(1))
            }],
        ]);

        let service = service(report_db, song_db);
        let result = service.file("user1", "s1", "duplicate", "").await;

        assert!(matches!(result, Err(AppError::AlreadyReported)));
    }

    #[tokio::test]
    async fn test_resolve_requires_moderator() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let actor = create_test_moderator("user1", false);
        let result = service.resolve(&actor, "r1", ReportOutcome::Resolved).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_resolve_already_processed() {
        let report = create_test_report("r1", ReportStatus::Resolved);
        let report_db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[report]]);

        let service = service(report_db, MockDatabase::new(DatabaseBackend::Postgres));
        let actor = create_test_moderator("mod1", true);
        let result = service.resolve(&actor, "r1", ReportOutcome::Rejected).await;

        assert!(matches!(result, Err(AppError::AlreadyProcessed(_))));
    }

    #[tokio::test]
    async fn test_resolve_pending_report() {
        let report = create_test_report("r1", ReportStatus::Pending);
        let mut resolved = create_test_report("r1", ReportStatus::Resolved);
        resolved.processed_by = Some("mod1".to_string());
        resolved.processed_at = Some(Utc::now().into());

        let report_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[report]])
            .append_query_results([[resolved]]);

        let service = service(report_db, MockDatabase::new(DatabaseBackend::Postgres));
        let actor = create_test_moderator("mod1", true);
        let updated = service
            .resolve(&actor, "r1", ReportOutcome::Resolved)
            .await
            .unwrap();

        assert_eq!(updated.status, ReportStatus::Resolved);
        assert_eq!(updated.processed_by.as_deref(), Some("mod1"));
    }
}
