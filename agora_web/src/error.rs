use agora_core::{forum::PageError, ids::InvalidId};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Page not found")]
    NotFound,

    #[error("Sign-in failed: {0}")]
    OAuth(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PageError> for AppError {
    fn from(error: PageError) -> Self {
        match error {
            PageError::NotFound => AppError::NotFound,
            PageError::DbError(error) => AppError::Internal(error.to_string()),
        }
    }
}

/// A malformed id in a path is just a page that does not exist
impl From<InvalidId> for AppError {
    fn from(_: InvalidId) -> Self {
        AppError::NotFound
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::OAuth(error.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Page not found"),
            AppError::OAuth(_) => {
                warn!("{self}");
                (StatusCode::UNAUTHORIZED, "Sign-in failed")
            }
            AppError::Template(_) | AppError::Session(_) | AppError::Internal(_) => {
                error!("{self}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
            }
        };

        (
            status,
            Html(format!(
                "<!doctype html><title>{message}</title><h1>{message}</h1><p><a href=\"/\">Back home</a></p>"
            )),
        )
            .into_response()
    }
}
