//! Fills the configured database with sample topics, a user, posts and
//! comments. Safe to run more than once.

use agora_core::{config, models, seed};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agora_core=info".into()),
        )
        .init();

    let config = config::get_or_init().await?;
    let db = models::open_or_create_db(&config).await?;
    models::migrate_up(&db).await?;

    seed::run(&db).await?;

    db.close().await?;
    Ok(())
}
