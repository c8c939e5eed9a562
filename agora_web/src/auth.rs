//! GitHub sign-in and the session-backed current user.
//!
//! The flow is the plain OAuth 2 authorization-code grant: `/auth/signin`
//! stores a random `state` in the session and redirects to GitHub, the
//! callback checks it, trades the code for a token and reads the profile.

use agora_core::{
    config::OAuthCredentials,
    ids::UserId,
    service::{ProviderProfile, SessionUser},
};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query, State},
    http::request::Parts,
    response::Redirect,
};
use rand::{distr::Alphanumeric, Rng};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, warn};

use crate::{error::AppError, state::AppState};

pub const PROVIDER: &str = "github";

/// Session key holding the signed-in [`UserId`].
pub const USER_ID_KEY: &str = "user_id";
const OAUTH_STATE_KEY: &str = "oauth_state";

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const API_URL: &str = "https://api.github.com";
const SCOPE: &str = "read:user user:email";

pub struct GithubOAuth {
    client_id: String,
    client_secret: String,
    redirect_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Deserialize)]
struct GithubUser {
    id: u64,
    login: String,
    name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Deserialize)]
struct GithubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

impl GithubOAuth {
    pub fn new(credentials: &OAuthCredentials, public_url: &str) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("agora/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            redirect_url: format!("{}/auth/callback/{PROVIDER}", public_url.trim_end_matches('/')),
            http,
        })
    }

    pub fn authorize_url(&self, state: &str) -> Result<String, AppError> {
        let url = reqwest::Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("scope", SCOPE),
                ("state", state),
            ],
        )
        .map_err(|e| AppError::OAuth(e.to_string()))?;

        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<String, AppError> {
        let response: TokenResponse = self
            .http
            .post(TOKEN_URL)
            .header(ACCEPT, "application/json")
            .json(&TokenRequest {
                client_id: &self.client_id,
                client_secret: &self.client_secret,
                code,
                redirect_uri: &self.redirect_url,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match response.access_token {
            Some(token) => Ok(token),
            None => Err(AppError::OAuth(format!(
                "token exchange refused: {} {}",
                response.error.unwrap_or_default(),
                response.error_description.unwrap_or_default()
            ))),
        }
    }

    /// GitHub account id and the profile fields kept on the user row
    async fn fetch_profile(&self, token: &str) -> Result<(String, ProviderProfile), AppError> {
        let user: GithubUser = self
            .http
            .get(format!("{API_URL}/user"))
            .bearer_auth(token)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // Private emails are only listed on the emails endpoint
        let email = match user.email {
            Some(email) => Some(email),
            None => self.primary_email(token).await?,
        };

        let profile = ProviderProfile {
            name: user.name.or(Some(user.login)),
            email,
            image: user.avatar_url,
        };

        Ok((user.id.to_string(), profile))
    }

    async fn primary_email(&self, token: &str) -> Result<Option<String>, AppError> {
        let emails: Vec<GithubEmail> = self
            .http
            .get(format!("{API_URL}/user/emails"))
            .bearer_auth(token)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(emails
            .into_iter()
            .find(|email| email.primary && email.verified)
            .map(|email| email.email))
    }
}

fn random_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

pub async fn signin(session: Session, State(state): State<AppState>) -> Result<Redirect, AppError> {
    let oauth_state = random_state();
    session.insert(OAUTH_STATE_KEY, &oauth_state).await?;

    let url = state.github.authorize_url(&oauth_state)?;
    Ok(Redirect::to(&url))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

pub async fn callback(
    session: Session,
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, AppError> {
    let expected: Option<String> = session.remove(OAUTH_STATE_KEY).await?;

    if let Some(error) = params.error {
        return Err(AppError::OAuth(format!("provider returned {error}")));
    }
    let code = params
        .code
        .ok_or_else(|| AppError::OAuth("missing code".to_string()))?;
    if expected.is_none() || expected != params.state {
        return Err(AppError::OAuth("state mismatch".to_string()));
    }

    let token = state.github.exchange_code(&code).await?;
    let (account_id, profile) = state.github.fetch_profile(&token).await?;

    let user = state
        .forum
        .users
        .upsert_from_provider(PROVIDER, &account_id, profile)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // Fresh id so a pre-login cookie can't be reused
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user.id).await?;
    info!("User {} signed in with {PROVIDER}", user.id);

    Ok(Redirect::to("/"))
}

pub async fn signout(session: Session) -> Result<Redirect, AppError> {
    session.flush().await?;
    Ok(Redirect::to("/"))
}

/// The signed-in user, if any. A session pointing at a deleted user counts
/// as signed out.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<SessionUser>);

impl CurrentUser {
    pub fn user(&self) -> Option<&SessionUser> {
        self.0.as_ref()
    }

    pub fn id(&self) -> Option<UserId> {
        self.0.as_ref().map(|user| user.id)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| AppError::Internal(message.to_string()))?;

        let Some(user_id) = session.get::<UserId>(USER_ID_KEY).await? else {
            return Ok(CurrentUser(None));
        };

        let user = state
            .forum
            .users
            .session_user(user_id)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        if user.is_none() {
            warn!("Session refers to missing user {user_id}");
        }

        Ok(CurrentUser(user))
    }
}
