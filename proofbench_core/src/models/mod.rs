use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

use crate::config::ProofBenchConfig;

pub mod migrator;

pub async fn open_or_create_db(config: &ProofBenchConfig) -> Result<DatabaseConnection, DbErr> {
    // `mode=rwc` creates the file on first start
    let connection_string = format!("sqlite://{}?mode=rwc", config.database_path.display());

    tracing::info!(path = %config.database_path.display(), "opening database");
    Database::connect(&connection_string).await
}

pub async fn migrate_up(db: &DatabaseConnection) -> Result<(), DbErr> {
    migrator::Migrator::up(db, None).await
}
