//! Vote service.
//!
//! Owns the vote ledger and drives the verification state machine: every
//! ledger change recomputes the tallies and applies the transition rule
//! under optimistic concurrency.

use std::time::Duration;

use crate::services::points::{AwardKind, PointsService};
use crate::services::verification::{self, VerificationDecision};
use chrono::Utc;
use sea_orm::Set;
use serde::Serialize;
use trackdrop_common::{AppError, AppResult, CommunityConfig, IdGenerator};
use trackdrop_db::{
    entities::{
        song::VerificationStatus,
        vote::{self, VoteDirection},
    },
    repositories::{SongGuardedUpdate, SongRepository, VoteRepository},
};

/// Base delay for the conflict-retry backoff.
const RETRY_BASE_DELAY_MS: u64 = 20;

/// Result of casting a vote.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutcome {
    /// Net score after the ledger change.
    pub net_score: i64,
    /// Verification status after the transition rule ran.
    pub status: VerificationStatus,
    /// The caller's active vote after the change (None after a toggle-off).
    pub user_vote: Option<VoteDirection>,
}

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: VoteRepository,
    song_repo: SongRepository,
    points: PointsService,
    community: CommunityConfig,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(
        vote_repo: VoteRepository,
        song_repo: SongRepository,
        points: PointsService,
        community: CommunityConfig,
    ) -> Self {
        Self {
            vote_repo,
            song_repo,
            points,
            community,
            id_gen: IdGenerator::new(),
        }
    }

    /// Cast a vote on a song.
    ///
    /// Same-direction repeat toggles the vote off, an opposite vote replaces
    /// the existing one, otherwise a new vote is inserted. At most one active
    /// vote per (song, user) survives, backed by the unique index.
    pub async fn cast(
        &self,
        user_id: &str,
        song_id: &str,
        direction: VoteDirection,
    ) -> AppResult<VoteOutcome> {
        let song = self.song_repo.get_by_id(song_id).await?;

        if song.uploader_id == user_id {
            // Voting on your own upload always fails with Unauthorized.
            return Err(AppError::Unauthorized);
        }

        let existing = self.vote_repo.find_by_user_and_song(user_id, song_id).await?;

        let (user_vote, credit_vote_id) = match existing {
            Some(vote) if vote.direction == direction => {
                // Toggle off. Retraction never claws back points.
                self.vote_repo.delete(&vote.id).await?;
                (None, None)
            }
            Some(vote) => {
                let vote_id = vote.id.clone();
                let mut model: vote::ActiveModel = vote.into();
                model.direction = Set(direction);
                self.vote_repo.update(model).await?;
                // The ledger row keeps its id across a flip, so the upvote
                // credit lands at most once per row.
                let credit = (direction == VoteDirection::Up).then_some(vote_id);
                (Some(direction), credit)
            }
            None => {
                let vote_id = self.id_gen.generate();
                let model = vote::ActiveModel {
                    id: Set(vote_id.clone()),
                    song_id: Set(song_id.to_string()),
                    user_id: Set(user_id.to_string()),
                    direction: Set(direction),
                    created_at: Set(Utc::now().into()),
                };
                self.vote_repo.create(model).await?;
                let credit = (direction == VoteDirection::Up).then_some(vote_id);
                (Some(direction), credit)
            }
        };

        if let Some(vote_id) = credit_vote_id {
            self.points
                .award(user_id, AwardKind::ConfirmVote, &vote_id)
                .await?;
        }

        let (net, decision) = self.recompute(song_id).await?;

        if decision.newly_verified {
            self.points
                .award(&song.uploader_id, AwardKind::VerifiedUpload, song_id)
                .await?;
            tracing::info!(song_id = %song_id, net = net, "Song community-verified");
        }

        Ok(VoteOutcome {
            net_score: net,
            status: decision.status,
            user_vote,
        })
    }

    /// Recompute tallies from the ledger and apply the transition rule.
    ///
    /// The write is guarded by the song's version column; on a lost race the
    /// song and tally are re-read and the rule re-evaluated, up to the
    /// configured attempt budget.
    async fn recompute(&self, song_id: &str) -> AppResult<(i64, VerificationDecision)> {
        let mut attempt: u32 = 0;

        loop {
            let song = self.song_repo.get_by_id(song_id).await?;
            let tally = self.vote_repo.tally(song_id).await?;
            let decision =
                verification::evaluate(&song, tally.net(), &self.community, Utc::now().into());

            let update = SongGuardedUpdate {
                up_count: i32::try_from(tally.up).unwrap_or(i32::MAX),
                down_count: i32::try_from(tally.down).unwrap_or(i32::MAX),
                verification_status: decision.status.clone(),
                verified_at: decision.verified_at,
                is_archived: decision.is_archived,
                archived_at: decision.archived_at,
                archive_reason: decision.archive_reason.clone(),
            };

            if self
                .song_repo
                .apply_guarded(song_id, song.version, update)
                .await?
            {
                return Ok((tally.net(), decision));
            }

            attempt += 1;
            if attempt >= self.community.max_write_attempts {
                return Err(AppError::Conflict(format!(
                    "Vote recompute lost {attempt} races on song {song_id}"
                )));
            }

            let delay = RETRY_BASE_DELAY_MS << attempt;
            tracing::debug!(song_id = %song_id, attempt = attempt, delay_ms = delay, "Guarded update lost race, retrying");
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    /// Get the caller's active vote on a song.
    pub async fn get_user_vote(
        &self,
        user_id: &str,
        song_id: &str,
    ) -> AppResult<Option<vote::Model>> {
        self.vote_repo.find_by_user_and_song(user_id, song_id).await
    }
}
