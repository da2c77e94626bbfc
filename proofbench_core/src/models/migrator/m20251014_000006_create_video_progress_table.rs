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
                    .table(VideoProgress::Table)
                    .col(pk_uuid(VideoProgress::Id))
                    .col(uuid(VideoProgress::UserId))
                    .col(uuid(VideoProgress::VideoId))
                    .col(integer(VideoProgress::LastPosition).default(0))
                    .col(integer(VideoProgress::WatchPercentage).default(0))
                    .col(boolean(VideoProgress::Completed).default(false))
                    .col(timestamp_with_time_zone(VideoProgress::LastWatchedAt))
                    .col(timestamp_with_time_zone(VideoProgress::CreatedAt))
                    .col(timestamp_with_time_zone(VideoProgress::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-video-progress-user_id")
                            .from(VideoProgress::Table, VideoProgress::UserId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-video-progress-video_id")
                            .from(VideoProgress::Table, VideoProgress::VideoId)
                            .to(Video::Table, Video::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One progress row per viewer and video
        manager
            .create_index(
                Index::create()
                    .name("idx_video_progress_user_video")
                    .table(VideoProgress::Table)
                    .col(VideoProgress::UserId)
                    .col(VideoProgress::VideoId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_video_progress_last_watched_at")
                    .table(VideoProgress::Table)
                    .col(VideoProgress::LastWatchedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VideoProgress::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum VideoProgress {
    Table,
    Id,
    UserId,
    VideoId,
    LastPosition,
    WatchPercentage,
    Completed,
    LastWatchedAt,
    CreatedAt,
    UpdatedAt,
}
