//! Form endpoints. JSON clients get the action result as-is; browsers get a
//! redirect on success and the page again, with errors, on failure.

use agora_core::{
    actions::{ActionResponse, ActionResult, CommentForm, PostForm, TopicForm},
    ids::{CommentId, PostId},
};
use axum::{
    extract::State,
    http::{header::ACCEPT, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Serialize;
use tracing::debug;

use super::pages::{self, CommentBox, HomeForms};
use crate::{auth::CurrentUser, error::AppError, state::AppState};

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"))
}

fn json_response<T: Serialize>(result: ActionResult<T>) -> Response {
    let status = match result {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(ActionResponse::from(result))).into_response()
}

pub async fn create_topic(
    State(state): State<AppState>,
    user: CurrentUser,
    headers: HeaderMap,
    Form(form): Form<TopicForm>,
) -> Result<Response, AppError> {
    let result = state.forum.create_topic(form.clone()).await;
    if wants_json(&headers) {
        return Ok(json_response(result));
    }

    match result {
        Ok(created) => Ok(Redirect::to(&format!("/topic/{}", created.topic.slug)).into_response()),
        Err(errors) => {
            let forms = HomeForms {
                topic: form,
                topic_errors: errors,
                ..Default::default()
            };
            let page = pages::render_home(&state, &user, forms).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

pub async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    headers: HeaderMap,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let result = state.forum.create_post(user.user(), form.clone()).await;
    if wants_json(&headers) {
        return Ok(json_response(result));
    }

    match result {
        Ok(created) => Ok(Redirect::to(&format!("/post/{}", created.post.post.id)).into_response()),
        Err(errors) => {
            let forms = HomeForms {
                post: form,
                post_errors: errors,
                ..Default::default()
            };
            let page = pages::render_home(&state, &user, forms).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

pub async fn comment(
    State(state): State<AppState>,
    user: CurrentUser,
    headers: HeaderMap,
    Form(form): Form<CommentForm>,
) -> Result<Response, AppError> {
    let post_id = form.post_id.clone();
    let comment_id = form.comment_id.clone();
    let is_create = !matches!(form.action.as_deref(), Some("edit" | "delete"));
    let content = if is_create {
        form.content.clone()
    } else {
        String::new()
    };

    let result = state.forum.comment_action(user.user(), form).await;
    if wants_json(&headers) {
        return Ok(json_response(result));
    }

    match result {
        Ok(outcome) => {
            let target = match outcome.comment() {
                Some(view) => format!("/post/{}#comment-{}", view.comment.post_id, view.comment.id),
                None if !post_id.is_empty() => format!("/post/{post_id}"),
                None => "/".to_string(),
            };
            Ok(Redirect::to(&target).into_response())
        }
        Err(errors) => {
            let Some(post_id) = failed_comment_post(&state, &post_id, &comment_id).await else {
                return Ok(Redirect::to("/").into_response());
            };
            let page =
                pages::render_post(&state, &user, post_id, CommentBox { content, errors }).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

/// The post page a failed comment action is shown on: the form's `postId`,
/// else the post of the targeted comment.
async fn failed_comment_post(
    state: &AppState,
    post_id: &str,
    comment_id: &str,
) -> Option<PostId> {
    if let Ok(post_id) = post_id.parse() {
        return Some(post_id);
    }

    let comment_id: CommentId = comment_id.parse().ok()?;
    match state.forum.comments.get_comment(comment_id).await {
        Ok(comment) => Some(comment.post_id),
        Err(e) => {
            debug!("No post to return to for comment {comment_id}: {e}");
            None
        }
    }
}
