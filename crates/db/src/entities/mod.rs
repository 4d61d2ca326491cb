//! Database entities.

#![allow(missing_docs)]

pub mod edit_suggestion;
pub mod favorite;
pub mod following;
pub mod point_award;
pub mod report;
pub mod song;
pub mod user;
pub mod vote;

pub use edit_suggestion::Entity as EditSuggestion;
pub use favorite::Entity as Favorite;
pub use following::Entity as Following;
pub use point_award::Entity as PointAward;
pub use report::Entity as Report;
pub use song::Entity as Song;
pub use user::Entity as User;
pub use vote::Entity as Vote;
