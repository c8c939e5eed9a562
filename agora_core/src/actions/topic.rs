use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::error;
use validator::Validate;

use super::{ActionResult, FieldErrors};
use crate::{
    entity::prelude::TopicModel,
    service::TopicsServiceError,
    Forum,
};

static TOPIC_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_]+$").expect("topic name pattern is valid")
});

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct TopicForm {
    #[validate(
        length(min = 3, message = "Name must be at least 3 characters"),
        regex(
            path = *TOPIC_NAME,
            message = "Name can only contain letters, numbers and underscores"
        )
    )]
    pub name: String,

    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCreated {
    pub topic: TopicModel,
}

impl From<TopicsServiceError> for FieldErrors {
    fn from(error: TopicsServiceError) -> Self {
        match error {
            TopicsServiceError::TopicExists => {
                FieldErrors::field("name", "This community name already exists")
            }
            TopicsServiceError::DbError(error) => {
                error!("Error creating topic: {error}");
                FieldErrors::form("Failed to create community")
            }
            TopicsServiceError::TopicNotFound => FieldErrors::form("Failed to create community"),
        }
    }
}

impl Forum {
    /// Create a community. The slug is the lowercased name.
    pub async fn create_topic(&self, form: TopicForm) -> ActionResult<TopicCreated> {
        form.validate()?;

        let slug = form.name.to_lowercase();
        let topic = self.topics.create_topic(slug, form.description).await?;

        Ok(TopicCreated { topic })
    }
}
