//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_user_table;
mod m20250601_000002_create_song_table;
mod m20250601_000003_create_vote_table;
mod m20250601_000004_create_favorite_table;
mod m20250601_000005_create_report_table;
mod m20250601_000006_create_edit_suggestion_table;
mod m20250601_000007_create_point_award_table;
mod m20250601_000008_create_following_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_user_table::Migration),
            Box::new(m20250601_000002_create_song_table::Migration),
            Box::new(m20250601_000003_create_vote_table::Migration),
            Box::new(m20250601_000004_create_favorite_table::Migration),
            Box::new(m20250601_000005_create_report_table::Migration),
            Box::new(m20250601_000006_create_edit_suggestion_table::Migration),
            Box::new(m20250601_000007_create_point_award_table::Migration),
            Box::new(m20250601_000008_create_following_table::Migration),
        ]
    }
}
