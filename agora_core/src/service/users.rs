use sea_orm::{DatabaseConnection, DatabaseTransaction};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{entity::prelude::*, ids::UserId};

#[derive(Debug, Error)]
pub enum UsersServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("user not found")]
    UserNotFound,
}

/// Profile fields reported by an OAuth provider at sign-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

/// The signed-in user as seen by actions and templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub name: Option<String>,
    pub image: Option<String>,
}

impl SessionUser {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Anonymous")
    }
}

impl From<UserModel> for SessionUser {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            name: user.name,
            image: user.image,
        }
    }
}

#[derive(Clone)]
pub struct UsersService {
    db: DatabaseConnection,
}

impl UsersService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolve the user stored in a session, if it still exists
    pub async fn session_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<SessionUser>, UsersServiceError> {
        let user = User::find_by_id(user_id).one(&self.db).await?;
        Ok(user.map(SessionUser::from))
    }

    /// Sign-in bookkeeping for an external identity.
    ///
    /// A known `(provider, provider_account_id)` pair refreshes the linked
    /// user's profile; an unknown one creates a user and links it. Both run
    /// in a single transaction.
    pub async fn upsert_from_provider(
        &self,
        provider: &str,
        provider_account_id: &str,
        profile: ProviderProfile,
    ) -> Result<UserModel, UsersServiceError> {
        let txn = self.db.begin().await?;

        let account = Account::find_by_id((provider.to_string(), provider_account_id.to_string()))
            .one(&txn)
            .await?;

        let user = match account {
            Some(account) => {
                let user = User::find_by_id(account.user_id)
                    .one(&txn)
                    .await?
                    .ok_or(UsersServiceError::UserNotFound)?;
                let email = usable_email(&txn, profile.email, Some(user.id)).await?;

                let mut active: UserActiveModel = user.into();
                active.name = Set(profile.name);
                active.image = Set(profile.image);
                if email.is_some() {
                    active.email = Set(email);
                }
                active.update(&txn).await?
            }
            None => {
                let email = usable_email(&txn, profile.email, None).await?;
                let user = UserActiveModel {
                    id: Set(UserId::new()),
                    name: Set(profile.name),
                    email: Set(email),
                    image: Set(profile.image),
                    created_at: Set(chrono::Utc::now()),
                };
                let user = User::insert(user).exec_with_returning(&txn).await?;

                let account = AccountActiveModel {
                    provider: Set(provider.to_string()),
                    provider_account_id: Set(provider_account_id.to_string()),
                    user_id: Set(user.id),
                };
                Account::insert(account).exec(&txn).await?;

                info!("Created user {} for {provider} account", user.id);
                user
            }
        };

        txn.commit().await?;

        Ok(user)
    }
}

// Emails are unique; one already held by another user is dropped.
async fn usable_email(
    txn: &DatabaseTransaction,
    email: Option<String>,
    owner: Option<UserId>,
) -> Result<Option<String>, DbErr> {
    let Some(email) = email else {
        return Ok(None);
    };

    let holder = User::find()
        .filter(UserColumn::Email.eq(email.as_str()))
        .one(txn)
        .await?;

    match holder {
        Some(holder) if Some(holder.id) != owner => Ok(None),
        _ => Ok(Some(email)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    fn profile(name: &str, email: Option<&str>) -> ProviderProfile {
        ProviderProfile {
            name: Some(name.to_string()),
            email: email.map(str::to_string),
            image: Some("https://example.com/a.png".to_string()),
        }
    }

    #[tokio::test]
    async fn test_first_sign_in_creates_user_and_account() {
        let db = test_utils::setup_test_db().await;
        let service = UsersService::new(db.clone());

        let user = service
            .upsert_from_provider("github", "42", profile("Octo", Some("octo@example.com")))
            .await
            .expect("Failed to upsert user");

        assert_eq!(user.name.as_deref(), Some("Octo"));
        assert_eq!(user.email.as_deref(), Some("octo@example.com"));

        let account = Account::find_by_id(("github".to_string(), "42".to_string()))
            .one(&db)
            .await
            .unwrap()
            .expect("account should be linked");
        assert_eq!(account.user_id, user.id);
    }

    #[tokio::test]
    async fn test_repeat_sign_in_refreshes_profile() {
        let db = test_utils::setup_test_db().await;
        let service = UsersService::new(db.clone());

        let first = service
            .upsert_from_provider("github", "42", profile("Octo", Some("octo@example.com")))
            .await
            .unwrap();
        let second = service
            .upsert_from_provider("github", "42", profile("Octocat", None))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name.as_deref(), Some("Octocat"));
        // A missing email keeps the stored one
        assert_eq!(second.email.as_deref(), Some("octo@example.com"));
        assert_eq!(User::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_taken_email_is_not_copied() {
        let db = test_utils::setup_test_db().await;
        let service = UsersService::new(db);

        let first = service
            .upsert_from_provider("github", "1", profile("One", Some("same@example.com")))
            .await
            .unwrap();
        let second = service
            .upsert_from_provider("github", "2", profile("Two", Some("same@example.com")))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert!(second.email.is_none());
    }

    #[tokio::test]
    async fn test_session_user() {
        let db = test_utils::setup_test_db().await;
        let user = test_utils::create_test_user(&db, "Sessioned").await;
        let service = UsersService::new(db);

        let session_user = service.session_user(user.id).await.unwrap().unwrap();
        assert_eq!(session_user.id, user.id);
        assert_eq!(session_user.display_name(), "Sessioned");

        assert!(service.session_user(UserId::new()).await.unwrap().is_none());
    }

    #[test]
    fn test_anonymous_display_name() {
        let user = SessionUser {
            id: UserId::new(),
            name: None,
            image: None,
        };
        assert_eq!(user.display_name(), "Anonymous");
    }
}
