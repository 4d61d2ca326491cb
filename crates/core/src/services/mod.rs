//! Business logic services.

#![allow(missing_docs)]

pub mod edit_suggestion;
pub mod favorite;
pub mod following;
pub mod points;
pub mod report;
pub mod song;
pub mod user;
pub mod verification;
pub mod vote;

pub use edit_suggestion::EditSuggestionService;
pub use favorite::{FavoriteOutcome, FavoriteService};
pub use following::FollowingService;
pub use points::{AwardKind, PointsService, Role};
pub use report::{ALLOWED_REASONS, ReportOutcome, ReportService};
pub use song::{CreateSongInput, SongService};
pub use user::{RegisterInput, UpdateUserInput, UserService};
pub use verification::{ARCHIVE_COMMUNITY_REJECTED, VerificationDecision};
pub use vote::{VoteOutcome, VoteService};
