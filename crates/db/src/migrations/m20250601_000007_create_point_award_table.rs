//! Create point award table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PointAward::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointAward::EventId)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PointAward::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(PointAward::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(PointAward::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(PointAward::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_point_award_user")
                            .from(PointAward::Table, PointAward::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (award history listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_point_award_user_id")
                    .table(PointAward::Table)
                    .col(PointAward::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PointAward::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PointAward {
    Table,
    EventId,
    UserId,
    Kind,
    Amount,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
