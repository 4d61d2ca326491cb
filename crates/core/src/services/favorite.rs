//! Favorite service.

use chrono::Utc;
use sea_orm::Set;
use serde::Serialize;
use trackdrop_common::{AppResult, IdGenerator};
use trackdrop_db::{
    entities::favorite,
    repositories::{FavoriteRepository, SongRepository},
};

/// Result of toggling a favorite.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteOutcome {
    /// Whether the song is favorited by the caller after the toggle.
    pub favorited: bool,
    /// Favorite tally after the toggle.
    pub favorite_count: i32,
}

/// Favorite service for business logic.
#[derive(Clone)]
pub struct FavoriteService {
    favorite_repo: FavoriteRepository,
    song_repo: SongRepository,
    id_gen: IdGenerator,
}

impl FavoriteService {
    /// Create a new favorite service.
    #[must_use]
    pub const fn new(favorite_repo: FavoriteRepository, song_repo: SongRepository) -> Self {
        Self {
            favorite_repo,
            song_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Toggle a favorite on a song.
    ///
    /// Idempotent per call: favorited becomes unfavorited and vice versa.
    /// The unique (song, user) index backstops a concurrent double-add.
    pub async fn toggle(&self, user_id: &str, song_id: &str) -> AppResult<FavoriteOutcome> {
        let song = self.song_repo.get_by_id(song_id).await?;

        let existing = self
            .favorite_repo
            .find_by_user_and_song(user_id, song_id)
            .await?;

        let favorited = match existing {
            Some(_) => {
                self.favorite_repo
                    .delete_by_user_and_song(user_id, song_id)
                    .await?;
                if song.favorite_count == 0 {
                    // The decrement clamps at zero in SQL; a hit here means
                    // the tally had already drifted from the ledger.
                    tracing::warn!(song_id = %song_id, "Favorite count underflow clamped");
                }
                self.song_repo.decrement_favorite_count(song_id).await?;
                false
            }
            None => {
                let model = favorite::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    song_id: Set(song_id.to_string()),
                    created_at: Set(Utc::now().into()),
                };
                self.favorite_repo.create(model).await?;
                self.song_repo.increment_favorite_count(song_id).await?;
                true
            }
        };

        let song = self.song_repo.get_by_id(song_id).await?;
        Ok(FavoriteOutcome {
            favorited,
            favorite_count: song.favorite_count,
        })
    }

    /// Check if a song is favorited by user.
    pub async fn is_favorited(&self, user_id: &str, song_id: &str) -> AppResult<bool> {
        self.favorite_repo.is_favorited(user_id, song_id).await
    }

    /// Get a user's favorites (paginated).
    pub async fn get_favorites(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<favorite::Model>> {
        self.favorite_repo
            .find_by_user(user_id, limit.clamp(1, 100), until_id)
            .await
    }
}
