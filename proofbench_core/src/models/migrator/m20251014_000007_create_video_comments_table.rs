use sea_orm_migration::{prelude::*, schema::*};

use super::m20251014_000001_create_profiles_table::Profile;
use super::m20251014_000004_create_videos_table::Video;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VideoComment::Table)
                    .col(pk_uuid(VideoComment::Id))
                    .col(uuid(VideoComment::VideoId))
                    .col(uuid(VideoComment::UserId))
                    .col(uuid_null(VideoComment::ParentId)) // For threaded replies
                    .col(text(VideoComment::Content))
                    .col(timestamp_with_time_zone(VideoComment::CreatedAt))
                    .col(timestamp_with_time_zone(VideoComment::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-video-comment-video_id")
                            .from(VideoComment::Table, VideoComment::VideoId)
                            .to(Video::Table, Video::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-video-comment-user_id")
                            .from(VideoComment::Table, VideoComment::UserId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-video-comment-parent_id")
                            .from(VideoComment::Table, VideoComment::ParentId)
                            .to(VideoComment::Table, VideoComment::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_video_comments_video_id")
                    .table(VideoComment::Table)
                    .col(VideoComment::VideoId)
                    .to_owned(),
            )
            .await?;

        // Reply lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_video_comments_parent_id")
                    .table(VideoComment::Table)
                    .col(VideoComment::ParentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VideoComment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum VideoComment {
    Table,
    Id,
    VideoId,
    UserId,
    ParentId,
    Content,
    CreatedAt,
    UpdatedAt,
}
