pub mod entity;
pub mod ids;
pub mod models;

use sea_orm::DatabaseConnection;
use tracing::info;

pub mod actions;
pub mod config;
pub mod error;
pub mod forum;
pub mod seed;
pub mod service;
pub mod thread;

#[cfg(test)]
pub(crate) mod test_utils;

pub use forum::Forum;

/// Main runtime handle for Agora.
pub struct AgoraCore {
    pub config: config::AgoraConfig,

    /// GitHub OAuth app credentials, validated at startup.
    pub credentials: config::OAuthCredentials,

    pub db: DatabaseConnection,

    pub forum: Forum,
}

impl AgoraCore {
    pub async fn start() -> Result<Self, error::CoreError> {
        let config = config::get_or_init().await?;
        let credentials = config::OAuthCredentials::from_env()?;
        info!("Starting with {config:?}");

        // DB + migrations
        let db = models::open_or_create_db(&config).await?;
        models::migrate_up(&db).await?;

        let forum = Forum::new(db.clone());

        Ok(Self {
            config,
            credentials,
            db,
            forum,
        })
    }

    pub async fn shutdown(self) -> Result<(), error::CoreError> {
        self.db.close().await?;
        Ok(())
    }
}
