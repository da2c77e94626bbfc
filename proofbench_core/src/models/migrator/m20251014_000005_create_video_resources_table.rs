use sea_orm_migration::{prelude::*, schema::*};

use super::m20251014_000004_create_videos_table::Video;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VideoResource::Table)
                    .col(pk_uuid(VideoResource::Id))
                    .col(uuid(VideoResource::VideoId))
                    .col(string(VideoResource::Title))
                    .col(string(VideoResource::Url))
                    .col(string_len(VideoResource::Type, 16))
                    .col(timestamp_with_time_zone(VideoResource::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-video-resource-video_id")
                            .from(VideoResource::Table, VideoResource::VideoId)
                            .to(Video::Table, Video::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_video_resources_video_id")
                    .table(VideoResource::Table)
                    .col(VideoResource::VideoId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VideoResource::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum VideoResource {
    Table,
    Id,
    VideoId,
    Title,
    Url,
    Type,
    CreatedAt,
}
