use sea_orm_migration::{prelude::*, schema::*};

use super::m20251014_000003_create_sections_table::Section;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Video::Table)
                    .col(pk_uuid(Video::Id))
                    .col(uuid(Video::SectionId))
                    .col(string(Video::Title))
                    .col(text_null(Video::Description))
                    .col(string(Video::VideoUrl))
                    .col(integer_null(Video::Duration))
                    .col(integer(Video::OrderIndex).default(0))
                    .col(timestamp_with_time_zone(Video::CreatedAt))
                    .col(timestamp_with_time_zone(Video::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-video-section_id")
                            .from(Video::Table, Video::SectionId)
                            .to(Section::Table, Section::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_videos_section_id")
                    .table(Video::Table)
                    .col(Video::SectionId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Video::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Video {
    Table,
    Id,
    SectionId,
    Title,
    Description,
    VideoUrl,
    Duration,
    OrderIndex,
    CreatedAt,
    UpdatedAt,
}
