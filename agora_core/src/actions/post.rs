use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use validator::{Validate, ValidationError};

use super::{check_length, parse_id, ActionResult, FieldErrors};
use crate::{
    ids::TopicId,
    service::{PostView, PostsServiceError, SessionUser},
    Forum,
};

const TITLE_MAX: usize = 300;
const CONTENT_MAX: usize = 40_000;

fn title_length(title: &str) -> Result<(), ValidationError> {
    check_length(
        title,
        TITLE_MAX,
        "Title is required",
        "Title must be less than 300 characters",
    )
}

fn content_length(content: &str) -> Result<(), ValidationError> {
    check_length(
        content,
        CONTENT_MAX,
        "Content is required",
        "Content must be less than 40000 characters",
    )
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct PostForm {
    #[validate(custom(function = "title_length"))]
    pub title: String,

    #[validate(custom(function = "content_length"))]
    pub content: String,

    #[validate(length(min = 1, message = "Topic is required"))]
    pub topic_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostCreated {
    pub post: PostView,
}

impl From<PostsServiceError> for FieldErrors {
    fn from(error: PostsServiceError) -> Self {
        match error {
            PostsServiceError::TopicNotFound => FieldErrors::form("Topic not found"),
            PostsServiceError::UserNotFound => {
                warn!("Post attempted by a session user that no longer exists");
                FieldErrors::form("You must be signed in to create a post")
            }
            PostsServiceError::DbError(error) => {
                error!("Error creating post: {error}");
                FieldErrors::form("Failed to create post")
            }
            PostsServiceError::PostNotFound => FieldErrors::form("Failed to create post"),
        }
    }
}

impl Forum {
    /// Create a post in a topic as the signed-in user.
    pub async fn create_post(
        &self,
        user: Option<&SessionUser>,
        form: PostForm,
    ) -> ActionResult<PostCreated> {
        let Some(user) = user else {
            return Err(FieldErrors::form("You must be signed in to create a post"));
        };

        form.validate()?;

        let topic_id: TopicId = parse_id(&form.topic_id, "Topic not found")?;

        let post = self
            .posts
            .create_post(user.id, topic_id, form.title, form.content)
            .await?;

        Ok(PostCreated { post })
    }
}
