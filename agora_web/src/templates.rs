//! Askama templates and the display structs they read.

use agora_core::{
    actions::{FieldErrors, PostForm, TopicForm},
    entity::prelude::TopicModel,
    service::{PostView, SessionUser, TopicWithCount},
};
use askama::Template;
use chrono::{DateTime, Utc};

pub fn display_date(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

/// Signed-in user shown in the navbar
#[derive(Debug)]
pub struct NavUser {
    pub name: String,
    pub image: Option<String>,
}

impl From<&SessionUser> for NavUser {
    fn from(user: &SessionUser) -> Self {
        Self {
            name: user.display_name().to_string(),
            image: user.image.clone(),
        }
    }
}

#[derive(Debug)]
pub struct TopicLink {
    pub id: String,
    pub slug: String,
    pub description: String,
    pub post_count: u64,
}

impl From<&TopicWithCount> for TopicLink {
    fn from(topic: &TopicWithCount) -> Self {
        Self {
            id: topic.topic.id.to_string(),
            slug: topic.topic.slug.clone(),
            description: topic.topic.description.clone(),
            post_count: topic.count.posts,
        }
    }
}

/// One row of a post listing
#[derive(Debug)]
pub struct PostCard {
    pub id: String,
    pub title: String,
    pub topic_slug: String,
    pub author: String,
    pub created: String,
    pub comment_count: u64,
}

impl From<&PostView> for PostCard {
    fn from(view: &PostView) -> Self {
        Self {
            id: view.post.id.to_string(),
            title: view.post.title.clone(),
            topic_slug: view.topic.slug.clone(),
            author: view.user.display_name().to_string(),
            created: display_date(&view.post.created_at),
            comment_count: view.comment_count,
        }
    }
}

#[derive(Debug)]
pub struct PostDetail {
    pub id: String,
    pub title: String,
    pub content: String,
    pub topic_slug: String,
    pub author: String,
    pub author_image: Option<String>,
    pub created: String,
    pub comment_count: u64,
}

impl From<&PostView> for PostDetail {
    fn from(view: &PostView) -> Self {
        Self {
            id: view.post.id.to_string(),
            title: view.post.title.clone(),
            content: view.post.content.clone(),
            topic_slug: view.topic.slug.clone(),
            author: view.user.display_name().to_string(),
            author_image: view.user.image.clone(),
            created: display_date(&view.post.created_at),
            comment_count: view.comment_count,
        }
    }
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: Option<NavUser>,
    pub posts: Vec<PostCard>,
    pub topics: Vec<TopicLink>,
    pub topic_form: TopicForm,
    pub topic_errors: FieldErrors,
    pub post_form: PostForm,
    pub post_errors: FieldErrors,
}

#[derive(Template)]
#[template(path = "topic.html")]
pub struct TopicTemplate {
    pub nav: Option<NavUser>,
    pub topic_id: String,
    pub slug: String,
    pub description: String,
    pub created: String,
    pub posts: Vec<PostCard>,
}

impl TopicTemplate {
    pub fn new(nav: Option<NavUser>, topic: &TopicModel, posts: &[PostView]) -> Self {
        Self {
            nav,
            topic_id: topic.id.to_string(),
            slug: topic.slug.clone(),
            description: topic.description.clone(),
            created: display_date(&topic.created_at),
            posts: posts.iter().map(PostCard::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub nav: Option<NavUser>,
    pub post: PostDetail,
    pub comment_total: usize,
    pub comments_html: String,
    pub comment_content: String,
    pub comment_errors: FieldErrors,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub nav: Option<NavUser>,
}

/// A single comment. Replies arrive pre-rendered in `children_html`.
#[derive(Template)]
#[template(path = "comment.html")]
pub struct CommentNodeTemplate {
    pub id: String,
    pub post_id: String,
    pub content: String,
    pub author: String,
    pub author_image: Option<String>,
    pub created: String,
    pub depth: usize,
    pub reply_count: usize,
    pub can_reply: bool,
    pub is_owner: bool,
    pub children_html: String,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_display_date() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(display_date(&at), "Mar 7, 2024");
    }

    #[test]
    fn test_comment_escapes_content() {
        let html = CommentNodeTemplate {
            id: "c1".to_string(),
            post_id: "p1".to_string(),
            content: "<script>alert(1)</script>".to_string(),
            author: "Anonymous".to_string(),
            author_image: None,
            created: "Mar 7, 2024".to_string(),
            depth: 0,
            reply_count: 0,
            can_reply: false,
            is_owner: false,
            children_html: String::new(),
        }
        .render()
        .unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("Reply"));
        assert!(!html.contains("Delete"));
    }

    #[test]
    fn test_owner_controls() {
        let html = CommentNodeTemplate {
            id: "c1".to_string(),
            post_id: "p1".to_string(),
            content: "mine".to_string(),
            author: "Me".to_string(),
            author_image: Some("https://example.com/me.png".to_string()),
            created: "Mar 7, 2024".to_string(),
            depth: 1,
            reply_count: 2,
            can_reply: true,
            is_owner: true,
            children_html: "<article>child</article>".to_string(),
        }
        .render()
        .unwrap();

        assert!(html.contains("Reply"));
        assert!(html.contains("Edit"));
        assert!(html.contains("Delete"));
        assert!(html.contains("2 replies"));
        assert!(html.contains("<article>child</article>"));
    }
}
