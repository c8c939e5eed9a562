//! tower-sessions store backed by the `session` table.

use std::fmt;

use agora_core::service::SessionsService;
use async_trait::async_trait;
use time::OffsetDateTime;
use tower_sessions::{
    session::{Id, Record},
    session_store::{self, SessionStore},
};

#[derive(Clone)]
pub struct DbSessionStore {
    sessions: SessionsService,
}

impl DbSessionStore {
    pub fn new(sessions: SessionsService) -> Self {
        Self { sessions }
    }

    /// Remove every expired record; returns how many went away
    pub async fn delete_expired(&self) -> session_store::Result<u64> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        self.sessions.delete_expired(now).await.map_err(backend)
    }
}

impl fmt::Debug for DbSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSessionStore").finish_non_exhaustive()
    }
}

fn backend(error: sea_orm::DbErr) -> session_store::Error {
    session_store::Error::Backend(error.to_string())
}

fn encode(record: &Record) -> session_store::Result<String> {
    serde_json::to_string(&record.data).map_err(|e| session_store::Error::Encode(e.to_string()))
}

#[async_trait]
impl SessionStore for DbSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let data = encode(record)?;
        let expires_at = record.expiry_date.unix_timestamp();

        // Ids are random; retry on the rare collision
        while !self
            .sessions
            .insert_new(&record.id.to_string(), data.clone(), expires_at)
            .await
            .map_err(backend)?
        {
            record.id = Id::default();
        }

        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let data = encode(record)?;
        self.sessions
            .save(&record.id.to_string(), data, record.expiry_date.unix_timestamp())
            .await
            .map_err(backend)
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let Some(row) = self
            .sessions
            .load(&session_id.to_string(), now)
            .await
            .map_err(backend)?
        else {
            return Ok(None);
        };

        let data = serde_json::from_str(&row.data)
            .map_err(|e| session_store::Error::Decode(e.to_string()))?;
        let expiry_date = OffsetDateTime::from_unix_timestamp(row.expires_at)
            .map_err(|e| session_store::Error::Decode(e.to_string()))?;

        Ok(Some(Record {
            id: *session_id,
            data,
            expiry_date,
        }))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.sessions
            .delete(&session_id.to_string())
            .await
            .map_err(backend)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use agora_core::{models, Forum};
    use sea_orm::Database;

    use super::*;

    async fn store() -> DbSessionStore {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        models::migrate_up(&db).await.unwrap();
        DbSessionStore::new(Forum::new(db).sessions)
    }

    fn record(expiry_date: OffsetDateTime) -> Record {
        let mut data = HashMap::new();
        data.insert("user_id".to_string(), serde_json::json!("someone"));
        Record {
            id: Id::default(),
            data,
            expiry_date,
        }
    }

    #[tokio::test]
    async fn test_create_then_load() {
        let store = store().await;
        let mut record = record(OffsetDateTime::now_utc() + time::Duration::hours(1));

        store.create(&mut record).await.unwrap();
        let loaded = store.load(&record.id).await.unwrap().unwrap();

        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.data, record.data);
        assert_eq!(
            loaded.expiry_date.unix_timestamp(),
            record.expiry_date.unix_timestamp()
        );
    }

    #[tokio::test]
    async fn test_expired_records_are_not_loaded() {
        let store = store().await;
        let record = record(OffsetDateTime::now_utc() - time::Duration::hours(1));

        store.save(&record).await.unwrap();
        assert!(store.load(&record.id).await.unwrap().is_none());
        assert_eq!(store.delete_expired().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = store().await;
        let record = record(OffsetDateTime::now_utc() + time::Duration::hours(1));

        store.save(&record).await.unwrap();
        store.delete(&record.id).await.unwrap();
        assert!(store.load(&record.id).await.unwrap().is_none());
    }
}
