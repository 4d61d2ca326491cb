//! Points ledger service.
//!
//! Every reputation credit is written through here: an award row keyed by a
//! deterministic event id, then a single atomic bump of the user's points
//! column. Duplicate delivery of the same event is a no-op.

use chrono::Utc;
use sea_orm::Set;
use trackdrop_common::{AppResult, CommunityConfig, RewardTable};
use trackdrop_db::{
    entities::{point_award, user},
    repositories::{PointAwardRepository, UserRepository},
};

/// Kinds of reputation-earning events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardKind {
    /// Uploader credit on song creation.
    Upload,
    /// Uploader credit when their song becomes verified.
    VerifiedUpload,
    /// Voter credit on an upvote.
    ConfirmVote,
    /// Reporter credit when a report is filed.
    Report,
}

impl AwardKind {
    /// Stable ledger name for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::VerifiedUpload => "verified_upload",
            Self::ConfirmVote => "confirm_vote",
            Self::Report => "report",
        }
    }

    /// Points granted for this kind under the given reward table.
    #[must_use]
    pub const fn amount(self, rewards: &RewardTable) -> i64 {
        match self {
            Self::Upload => rewards.upload,
            Self::VerifiedUpload => rewards.verified_upload,
            Self::ConfirmVote => rewards.confirm_vote,
            Self::Report => rewards.report,
        }
    }

    /// Deterministic event identity for dedup, keyed by the source row.
    #[must_use]
    pub fn event_id(self, key: &str) -> String {
        match self {
            Self::Upload => format!("upload:{key}"),
            Self::VerifiedUpload => format!("song-verified:{key}"),
            Self::ConfirmVote => format!("vote:{key}"),
            Self::Report => format!("report:{key}"),
        }
    }
}

/// Community role derived from stored grants and the points balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    NewUser,
    VerifiedContributor,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewUser => "new_user",
            Self::VerifiedContributor => "verified_contributor",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

/// Points service for reputation credits and role derivation.
#[derive(Clone)]
pub struct PointsService {
    award_repo: PointAwardRepository,
    user_repo: UserRepository,
    community: CommunityConfig,
}

impl PointsService {
    /// Create a new points service.
    #[must_use]
    pub const fn new(
        award_repo: PointAwardRepository,
        user_repo: UserRepository,
        community: CommunityConfig,
    ) -> Self {
        Self {
            award_repo,
            user_repo,
            community,
        }
    }

    /// Credit a user for an event, deduped by event identity.
    ///
    /// Returns `true` when the credit was applied, `false` when the event
    /// was already credited. Safe to re-drive after a partial failure.
    pub async fn award(&self, user_id: &str, kind: AwardKind, key: &str) -> AppResult<bool> {
        let event_id = kind.event_id(key);
        let amount = kind.amount(&self.community.rewards);

        let model = point_award::ActiveModel {
            event_id: Set(event_id.clone()),
            user_id: Set(user_id.to_string()),
            kind: Set(kind.as_str().to_string()),
            amount: Set(amount),
            created_at: Set(Utc::now().into()),
        };

        if !self.award_repo.insert_if_absent(model).await? {
            tracing::debug!(event_id = %event_id, "Points event already credited");
            return Ok(false);
        }

        self.user_repo.add_points(user_id, amount).await?;
        tracing::debug!(user_id = %user_id, event_id = %event_id, amount = amount, "Credited points");
        Ok(true)
    }

    /// Derive the role for a user.
    ///
    /// Admin roles come only from the stored grant flags; the contributor
    /// role is computed from the points balance at read time, never stored.
    #[must_use]
    pub fn role_for(&self, user: &user::Model) -> Role {
        if user.is_super_admin {
            Role::SuperAdmin
        } else if user.is_admin {
            Role::Admin
        } else if user.points >= self.community.contributor_points {
            Role::VerifiedContributor
        } else {
            Role::NewUser
        }
    }

    /// Award history for a user (newest first).
    pub async fn history(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<point_award::Model>> {
        self.award_repo.find_by_user(user_id, limit).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_user(id: &str, points: i64, is_admin: bool, is_super_admin: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: "alice".to_string(),
            username_lower: "alice".to_string(),
            token: None,
            display_name: None,
            bio: None,
            avatar_url: None,
            is_public: true,
            points,
            is_admin,
            is_super_admin,
            followers_count: 0,
            following_count: 0,
            upload_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(award_db: MockDatabase, user_db: MockDatabase) -> PointsService {
        PointsService::new(
            PointAwardRepository::new(Arc::new(award_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
            CommunityConfig::default(),
        )
    }

    #[test]
    fn test_event_id_formats() {
        assert_eq!(AwardKind::Upload.event_id("s1"), "upload:s1");
        assert_eq!(AwardKind::VerifiedUpload.event_id("s1"), "song-verified:s1");
        assert_eq!(AwardKind::ConfirmVote.event_id("v1"), "vote:v1");
        assert_eq!(AwardKind::Report.event_id("r1"), "report:r1");
    }

    #[test]
    fn test_amounts_follow_reward_table() {
        let rewards = RewardTable::default();
        assert_eq!(AwardKind::Upload.amount(&rewards), 1);
        assert_eq!(AwardKind::VerifiedUpload.amount(&rewards), 200);
        assert_eq!(AwardKind::ConfirmVote.amount(&rewards), 10);
        assert_eq!(AwardKind::Report.amount(&rewards), 50);
    }

    #[test]
    fn test_role_derivation() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        assert_eq!(
            service.role_for(&create_test_user("u1", 0, false, false)),
            Role::NewUser
        );
        assert_eq!(
            service.role_for(&create_test_user("u2", 999, false, false)),
            Role::NewUser
        );
        assert_eq!(
            service.role_for(&create_test_user("u3", 1000, false, false)),
            Role::VerifiedContributor
        );
        // Grant flags win over points.
        assert_eq!(
            service.role_for(&create_test_user("u4", 0, true, false)),
            Role::Admin
        );
        assert_eq!(
            service.role_for(&create_test_user("u5", 5000, true, true)),
            Role::SuperAdmin
        );
    }

    #[tokio::test]
    async fn test_award_credits_once() {
        let award_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_award_row("vote:v1", "user1")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        let user_db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ]);

        let service = service_with(award_db, user_db);
        let credited = service
            .award("user1", AwardKind::ConfirmVote, "v1")
            .await
            .unwrap();

        assert!(credited);
    }

    fn create_test_award_row(event_id: &str, user_id: &str) -> point_award::Model {
        point_award::Model {
            event_id: event_id.to_string(),
            user_id: user_id.to_string(),
            kind: "confirm_vote".to_string(),
            amount: 10,
            created_at: Utc::now().into(),
        }
    }
}
