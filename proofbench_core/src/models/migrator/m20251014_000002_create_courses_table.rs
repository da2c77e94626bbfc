use sea_orm_migration::{prelude::*, schema::*};

use super::m20251014_000001_create_profiles_table::Profile;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Course::Table)
                    .col(pk_uuid(Course::Id))
                    .col(string(Course::Title))
                    .col(text_null(Course::Description))
                    .col(string_len(Course::Category, 32))
                    .col(string_null(Course::ThumbnailUrl))
                    .col(json(Course::Tags))
                    .col(boolean(Course::Published).default(false))
                    .col(uuid(Course::CreatedBy))
                    .col(timestamp_with_time_zone(Course::CreatedAt))
                    .col(timestamp_with_time_zone(Course::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-course-created_by")
                            .from(Course::Table, Course::CreatedBy)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_courses_created_at")
                    .table(Course::Table)
                    .col(Course::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Course::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Course {
    Table,
    Id,
    Title,
    Description,
    Category,
    ThumbnailUrl,
    Tags,
    Published,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
