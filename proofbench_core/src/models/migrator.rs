use sea_orm_migration::prelude::*;

mod m20251014_000001_create_profiles_table;
mod m20251014_000002_create_courses_table;
mod m20251014_000003_create_sections_table;
mod m20251014_000004_create_videos_table;
mod m20251014_000005_create_video_resources_table;
mod m20251014_000006_create_video_progress_table;
mod m20251014_000007_create_video_comments_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251014_000001_create_profiles_table::Migration),
            Box::new(m20251014_000002_create_courses_table::Migration),
            Box::new(m20251014_000003_create_sections_table::Migration),
            Box::new(m20251014_000004_create_videos_table::Migration),
            Box::new(m20251014_000005_create_video_resources_table::Migration),
            Box::new(m20251014_000006_create_video_progress_table::Migration),
            Box::new(m20251014_000007_create_video_comments_table::Migration),
        ]
    }
}

#[cfg(test)]
use sea_orm::{Database, DbErr};

#[tokio::test]
async fn test_migrations_okay() -> Result<(), DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    let schema_manager = SchemaManager::new(&db);

    Migrator::refresh(&db).await?;

    assert!(schema_manager.has_table("profile").await?);
    assert!(schema_manager.has_table("course").await?);
    assert!(schema_manager.has_table("section").await?);
    assert!(schema_manager.has_table("video").await?);
    assert!(schema_manager.has_table("video_resource").await?);
    assert!(schema_manager.has_table("video_progress").await?);
    assert!(schema_manager.has_table("video_comment").await?);

    Ok(())
}
