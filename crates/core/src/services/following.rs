//! Following service.

use chrono::Utc;
use sea_orm::Set;
use trackdrop_common::{AppError, AppResult, IdGenerator};
use trackdrop_db::{
    entities::following,
    repositories::{FollowingRepository, UserRepository},
};

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    following_repo: FollowingRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(following_repo: FollowingRepository, user_repo: UserRepository) -> Self {
        Self {
            following_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow a user.
    pub async fn follow(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        if follower_id == followee_id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        if self
            .following_repo
            .is_following(follower_id, followee_id)
            .await?
        {
            return Err(AppError::BadRequest("Already following".to_string()));
        }

        // Both sides must exist.
        self.user_repo.get_by_id(follower_id).await?;
        self.user_repo.get_by_id(followee_id).await?;

        let model = following::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            followee_id: Set(followee_id.to_string()),
            created_at: Set(Utc::now().into()),
        };
        self.following_repo.create(model).await?;

        self.user_repo.increment_following_count(follower_id).await?;
        self.user_repo.increment_followers_count(followee_id).await?;

        tracing::debug!(follower = %follower_id, followee = %followee_id, "Follow created");
        Ok(())
    }

    /// Unfollow a user.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        if !self
            .following_repo
            .is_following(follower_id, followee_id)
            .await?
        {
            return Err(AppError::NotFound("Not following".to_string()));
        }

        self.following_repo
            .delete_by_pair(follower_id, followee_id)
            .await?;

        self.user_repo.decrement_following_count(follower_id).await?;
        self.user_repo.decrement_followers_count(followee_id).await?;

        tracing::debug!(follower = %follower_id, followee = %followee_id, "Follow removed");
        Ok(())
    }

    /// Check if a user follows another.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.following_repo
            .is_following(follower_id, followee_id)
            .await
    }

    /// List follower relations of a user.
    pub async fn get_followers(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<following::Model>> {
        self.following_repo
            .find_followers(user_id, limit.clamp(1, 100), until_id)
            .await
    }

    /// List who a user follows.
    pub async fn get_following(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<following::Model>> {
        self.following_repo
            .find_following(user_id, limit.clamp(1, 100), until_id)
            .await
    }
}
