use axum::{
    routing::{get, post},
    Router,
};

use crate::{auth, state::AppState};

pub mod actions;
pub mod api;
pub mod pages;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/topic/:slug", get(pages::topic))
        .route("/post/:id", get(pages::post))
        .route("/api/topics", get(api::list_topics))
        .route("/topics", post(actions::create_topic))
        .route("/posts", post(actions::create_post))
        .route("/comments", post(actions::comment))
        .route("/auth/signin", post(auth::signin))
        .route("/auth/callback/github", get(auth::callback))
        .route("/auth/signout", post(auth::signout))
}
