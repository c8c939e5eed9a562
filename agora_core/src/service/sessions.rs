use sea_orm::{sea_query::OnConflict, DatabaseConnection};

use crate::entity::prelude::*;

/// Persistence for HTTP session records.
///
/// Payloads are opaque strings here; the web layer owns their encoding.
#[derive(Clone)]
pub struct SessionsService {
    db: DatabaseConnection,
}

impl SessionsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert a record unless the id is already taken. Returns `false` on collision.
    pub async fn insert_new(&self, id: &str, data: String, expires_at: i64) -> Result<bool, DbErr> {
        if Session::find_by_id(id.to_string()).one(&self.db).await?.is_some() {
            return Ok(false);
        }

        let session = SessionActiveModel {
            id: Set(id.to_string()),
            data: Set(data),
            expires_at: Set(expires_at),
        };
        Session::insert(session).exec(&self.db).await?;

        Ok(true)
    }

    /// Insert or overwrite a record
    pub async fn save(&self, id: &str, data: String, expires_at: i64) -> Result<(), DbErr> {
        let session = SessionActiveModel {
            id: Set(id.to_string()),
            data: Set(data),
            expires_at: Set(expires_at),
        };

        Session::insert(session)
            .on_conflict(
                OnConflict::column(SessionColumn::Id)
                    .update_columns([SessionColumn::Data, SessionColumn::ExpiresAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    /// Load a record that has not expired at `now` (unix seconds)
    pub async fn load(&self, id: &str, now: i64) -> Result<Option<SessionModel>, DbErr> {
        Session::find_by_id(id.to_string())
            .filter(SessionColumn::ExpiresAt.gt(now))
            .one(&self.db)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), DbErr> {
        Session::delete_by_id(id.to_string()).exec(&self.db).await?;
        Ok(())
    }

    /// Drop every record expired at `now`; returns how many were removed
    pub async fn delete_expired(&self, now: i64) -> Result<u64, DbErr> {
        let result = Session::delete_many()
            .filter(SessionColumn::ExpiresAt.lte(now))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
