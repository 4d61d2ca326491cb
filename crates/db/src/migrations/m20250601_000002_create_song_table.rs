//! Create song table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Song::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Song::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Song::Title).string_len(512).not_null())
                    .col(ColumnDef::new(Song::Artists).json_binary().not_null())
                    .col(ColumnDef::new(Song::Genre).string_len(128).not_null())
                    .col(ColumnDef::new(Song::ReleaseDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Song::SoundcloudUrl).string_len(512))
                    .col(ColumnDef::new(Song::ArtworkUrl).string_len(512))
                    .col(ColumnDef::new(Song::UploaderId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Song::VerificationStatus)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Song::VerifiedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Song::UpCount).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Song::DownCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Song::FavoriteCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Song::ReportCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Song::IsArchived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Song::ArchivedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Song::ArchiveReason).string_len(128))
                    .col(
                        ColumnDef::new(Song::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Song::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Song::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_song_uploader")
                            .from(Song::Table, Song::UploaderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: verification_status (pending-queue listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_song_verification_status")
                    .table(Song::Table)
                    .col(Song::VerificationStatus)
                    .to_owned(),
            )
            .await?;

        // Index: uploader_id (profile listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_song_uploader_id")
                    .table(Song::Table)
                    .col(Song::UploaderId)
                    .to_owned(),
            )
            .await?;

        // Index: release_date (released view)
        manager
            .create_index(
                Index::create()
                    .name("idx_song_release_date")
                    .table(Song::Table)
                    .col(Song::ReleaseDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Song::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Song {
    Table,
    Id,
    Title,
    Artists,
    Genre,
    ReleaseDate,
    SoundcloudUrl,
    ArtworkUrl,
    UploaderId,
    VerificationStatus,
    VerifiedAt,
    UpCount,
    DownCount,
    FavoriteCount,
    ReportCount,
    IsArchived,
    ArchivedAt,
    ArchiveReason,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
