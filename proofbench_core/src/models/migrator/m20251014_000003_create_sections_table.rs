use sea_orm_migration::{prelude::*, schema::*};

use super::m20251014_000002_create_courses_table::Course;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Section::Table)
                    .col(pk_uuid(Section::Id))
                    .col(uuid(Section::CourseId))
                    .col(string(Section::Name))
                    .col(integer(Section::OrderIndex).default(0))
                    .col(timestamp_with_time_zone(Section::CreatedAt))
                    .col(timestamp_with_time_zone(Section::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-section-course_id")
                            .from(Section::Table, Section::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sections_course_id")
                    .table(Section::Table)
                    .col(Section::CourseId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Section::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Section {
    Table,
    Id,
    CourseId,
    Name,
    OrderIndex,
    CreatedAt,
    UpdatedAt,
}
