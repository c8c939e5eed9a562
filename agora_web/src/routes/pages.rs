use agora_core::{
    actions::{FieldErrors, PostForm, TopicForm},
    ids::PostId,
};
use askama::Template;
use axum::{
    extract::{Path, State},
    response::Html,
};

use crate::{
    auth::CurrentUser,
    error::AppError,
    render::{render_thread, ThreadContext},
    state::AppState,
    templates::{
        AboutTemplate, HomeTemplate, NavUser, PostCard, PostDetail, PostTemplate, TopicLink,
        TopicTemplate,
    },
};

/// Submitted values and errors to show again on the home page
#[derive(Debug, Default)]
pub struct HomeForms {
    pub topic: TopicForm,
    pub topic_errors: FieldErrors,
    pub post: PostForm,
    pub post_errors: FieldErrors,
}

/// Comment box contents to show again on the post page
#[derive(Debug, Default)]
pub struct CommentBox {
    pub content: String,
    pub errors: FieldErrors,
}

fn nav(user: &CurrentUser) -> Option<NavUser> {
    user.user().map(NavUser::from)
}

pub async fn home(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Html<String>, AppError> {
    render_home(&state, &user, HomeForms::default()).await
}

pub async fn render_home(
    state: &AppState,
    user: &CurrentUser,
    forms: HomeForms,
) -> Result<Html<String>, AppError> {
    let page = state.forum.load_home().await?;

    let template = HomeTemplate {
        nav: nav(user),
        posts: page.posts.iter().map(PostCard::from).collect(),
        topics: page.topics.iter().map(TopicLink::from).collect(),
        topic_form: forms.topic,
        topic_errors: forms.topic_errors,
        post_form: forms.post,
        post_errors: forms.post_errors,
    };
    Ok(Html(template.render()?))
}

pub async fn topic(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(slug): Path<String>,
) -> Result<Html<String>, AppError> {
    let page = state.forum.load_topic_page(&slug).await?;

    let template = TopicTemplate::new(nav(&user), &page.topic, &page.posts);
    Ok(Html(template.render()?))
}

pub async fn post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let post_id: PostId = id.parse()?;
    render_post(&state, &user, post_id, CommentBox::default()).await
}

pub async fn render_post(
    state: &AppState,
    user: &CurrentUser,
    post_id: PostId,
    comment_box: CommentBox,
) -> Result<Html<String>, AppError> {
    let page = state.forum.load_post_page(post_id).await?;

    let comments_html = render_thread(
        &page.comments,
        ThreadContext {
            post_id,
            viewer: user.id(),
        },
    )?;

    let template = PostTemplate {
        nav: nav(user),
        post: PostDetail::from(&page.post),
        comment_total: page.comments.total,
        comments_html,
        comment_content: comment_box.content,
        comment_errors: comment_box.errors,
    };
    Ok(Html(template.render()?))
}

pub async fn about(user: CurrentUser) -> Result<Html<String>, AppError> {
    let template = AboutTemplate { nav: nav(&user) };
    Ok(Html(template.render()?))
}
