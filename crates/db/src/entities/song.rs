//! Song (submission) entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Verification lifecycle of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum VerificationStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    /// Verified by the community vote quorum. Reversible when votes retract.
    #[sea_orm(string_value = "community_verified")]
    CommunityVerified,
    /// Verified through the artist/moderation path. Not reverted by votes.
    #[sea_orm(string_value = "artist_verified")]
    ArtistVerified,
}

impl VerificationStatus {
    /// Whether the song counts as verified in either form.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        matches!(self, Self::CommunityVerified | Self::ArtistVerified)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "song")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    /// Artist names (JSON array of strings)
    #[sea_orm(column_type = "JsonBinary")]
    pub artists: Json,

    pub genre: String,

    /// Canonical release timestamp, parsed once at the API boundary.
    /// NULL = unannounced.
    #[sea_orm(nullable)]
    pub release_date: Option<DateTimeWithTimeZone>,

    /// External audio host link. NULL or a dead link means "preview not
    /// available", never an error.
    #[sea_orm(nullable)]
    pub soundcloud_url: Option<String>,

    /// Artwork URL
    #[sea_orm(nullable)]
    pub artwork_url: Option<String>,

    /// Uploader user ID
    #[sea_orm(indexed)]
    pub uploader_id: String,

    pub verification_status: VerificationStatus,

    #[sea_orm(nullable)]
    pub verified_at: Option<DateTimeWithTimeZone>,

    /// Upvote tally (denormalized from the vote ledger)
    #[sea_orm(default_value = 0)]
    pub up_count: i32,

    /// Downvote tally (denormalized from the vote ledger)
    #[sea_orm(default_value = 0)]
    pub down_count: i32,

    /// Favorite tally (denormalized from the favorites ledger)
    #[sea_orm(default_value = 0)]
    pub favorite_count: i32,

    /// Report tally (denormalized from the report queue)
    #[sea_orm(default_value = 0)]
    pub report_count: i32,

    /// Stored archival flag; distinct from the derived released view
    #[sea_orm(default_value = false)]
    pub is_archived: bool,

    #[sea_orm(nullable)]
    pub archived_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub archive_reason: Option<String>,

    /// Optimistic-concurrency token; bumped on every guarded write
    #[sea_orm(default_value = 0)]
    pub version: i32,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Whether the release date has elapsed (strictly past, UTC).
    ///
    /// This is a derived display view, not a stored transition.
    #[must_use]
    pub fn is_released(&self, now: DateTimeWithTimeZone) -> bool {
        self.release_date.is_some_and(|date| date < now)
    }

    /// Net vote score (#up - #down).
    #[must_use]
    pub const fn net_score(&self) -> i64 {
        self.up_count as i64 - self.down_count as i64
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UploaderId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Uploader,

    #[sea_orm(has_many = "super::vote::Entity")]
    Votes,

    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorites,

    #[sea_orm(has_many = "super::report::Entity")]
    Reports,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Uploader.def()
    }
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl Related<super::favorite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn sample_song(release_date: Option<DateTimeWithTimeZone>) -> Model {
        Model {
            id: "song1".to_string(),
            title: "Test Track".to_string(),
            artists: json!(["Artist A"]),
            genre: "house".to_string(),
            release_date,
            soundcloud_url: None,
            artwork_url: None,
            uploader_id: "user1".to_string(),
            verification_status: VerificationStatus::Pending,
            verified_at: None,
            up_count: 2,
            down_count: 5,
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

    #[test]
    fn test_net_score() {
        let song = sample_song(None);
        assert_eq!(song.net_score(), -3);
    }

    #[test]
    fn test_is_released() {
        let now = Utc::now();
        let past = sample_song(Some((now - Duration::days(1)).into()));
        let future = sample_song(Some((now + Duration::days(1)).into()));
        let unannounced = sample_song(None);

        assert!(past.is_released(now.into()));
        assert!(!future.is_released(now.into()));
        assert!(!unannounced.is_released(now.into()));
    }

    #[test]
    fn test_is_verified() {
        assert!(!VerificationStatus::Pending.is_verified());
        assert!(VerificationStatus::CommunityVerified.is_verified());
        assert!(VerificationStatus::ArtistVerified.is_verified());
    }
}
