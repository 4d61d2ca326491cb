//! Create edit suggestion table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EditSuggestion::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EditSuggestion::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EditSuggestion::SongId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EditSuggestion::SubmittedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EditSuggestion::Changes)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EditSuggestion::Notes).text().not_null())
                    .col(
                        ColumnDef::new(EditSuggestion::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(EditSuggestion::ReviewedBy).string_len(32))
                    .col(ColumnDef::new(EditSuggestion::ReviewedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(EditSuggestion::ReviewNotes).text())
                    .col(
                        ColumnDef::new(EditSuggestion::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_edit_suggestion_song")
                            .from(EditSuggestion::Table, EditSuggestion::SongId)
                            .to(Song::Table, Song::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: status (review queue)
        manager
            .create_index(
                Index::create()
                    .name("idx_edit_suggestion_status")
                    .table(EditSuggestion::Table)
                    .col(EditSuggestion::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EditSuggestion::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EditSuggestion {
    Table,
    Id,
    SongId,
    SubmittedBy,
    Changes,
    Notes,
    Status,
    ReviewedBy,
    ReviewedAt,
    ReviewNotes,
    CreatedAt,
}

#[derive(Iden)]
enum Song {
    Table,
    Id,
}
