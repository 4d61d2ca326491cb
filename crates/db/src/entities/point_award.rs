//! Point award entity.
//!
//! One row per credited reputation event. The primary key is a deterministic
//! event identity (e.g. `vote:{vote_id}`), which deduplicates at-least-once
//! delivery of point credits.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "point_award")]
pub struct Model {
    /// Deterministic event identity.
    #[sea_orm(primary_key, auto_increment = false)]
    pub event_id: String,

    /// User credited by this event.
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Event kind (upload, verified_upload, confirm_vote, report).
    pub kind: String,

    /// Points credited.
    pub amount: i64,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
