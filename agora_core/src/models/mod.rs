use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::AgoraConfig;

pub mod migrator;

pub async fn open_or_create_db(config: &AgoraConfig) -> Result<DatabaseConnection, DbErr> {
    info!("Connecting to {}", config.database_url);

    let mut options = ConnectOptions::new(config.database_url.clone());
    options.sqlx_logging(false);

    Database::connect(options).await
}

pub async fn migrate_up(db: &DatabaseConnection) -> Result<(), DbErr> {
    migrator::Migrator::up(db, None).await
}
