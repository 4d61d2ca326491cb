//! Verification state machine.
//!
//! The transition rule is a pure function of the current song row, the
//! recomputed vote tally, and the community thresholds. Callers apply the
//! resulting decision with a version-guarded update.

use sea_orm::prelude::DateTimeWithTimeZone;
use trackdrop_common::CommunityConfig;
use trackdrop_db::entities::song::{self, VerificationStatus};

/// Archive reason recorded when the community vote sinks a submission.
pub const ARCHIVE_COMMUNITY_REJECTED: &str = "community_rejected";

/// Outcome of evaluating the transition rule against a fresh tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationDecision {
    pub status: VerificationStatus,
    pub verified_at: Option<DateTimeWithTimeZone>,
    pub is_archived: bool,
    pub archived_at: Option<DateTimeWithTimeZone>,
    pub archive_reason: Option<String>,
    /// True only on the pending -> `community_verified` edge; the uploader
    /// reward is credited when this is set (deduped by event identity).
    pub newly_verified: bool,
}

/// Evaluate the verification and archival rules for a song.
///
/// - pending -> `community_verified` when net >= `verify_threshold`.
/// - `community_verified` -> pending when net drops below the threshold.
/// - `artist_verified` is never reverted by votes.
/// - net <= `archive_threshold` archives the song as community-rejected.
///   Archival is one-way from the vote path; only moderation can undo it.
#[must_use]
pub fn evaluate(
    song: &song::Model,
    net: i64,
    community: &CommunityConfig,
    now: DateTimeWithTimeZone,
) -> VerificationDecision {
    let mut decision = VerificationDecision {
        status: song.verification_status.clone(),
        verified_at: song.verified_at,
        is_archived: song.is_archived,
        archived_at: song.archived_at,
        archive_reason: song.archive_reason.clone(),
        newly_verified: false,
    };

    match song.verification_status {
        VerificationStatus::Pending => {
            if net >= community.verify_threshold {
                decision.status = VerificationStatus::CommunityVerified;
                decision.verified_at = Some(now);
                decision.newly_verified = true;
            }
        }
        VerificationStatus::CommunityVerified => {
            if net < community.verify_threshold {
                decision.status = VerificationStatus::Pending;
                decision.verified_at = None;
            }
        }
        VerificationStatus::ArtistVerified => {}
    }

    if !decision.is_archived && net <= community.archive_threshold {
        decision.is_archived = true;
        decision.archived_at = Some(now);
        decision.archive_reason = Some(ARCHIVE_COMMUNITY_REJECTED.to_string());
    }

    decision
}
