use std::collections::HashMap;

use sea_orm::DatabaseConnection;
use serde::Serialize;
use thiserror::Error;

use crate::{entity::prelude::*, ids::TopicId};

#[derive(Debug, Error)]
pub enum TopicsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("topic already exists")]
    TopicExists,

    #[error("topic not found")]
    TopicNotFound,
}

/// Per-topic aggregate, serialized as `{"posts": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TopicCounts {
    pub posts: u64,
}

/// A topic together with how many posts it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicWithCount {
    #[serde(flatten)]
    pub topic: TopicModel,
    #[serde(rename = "_count")]
    pub count: TopicCounts,
}

#[derive(Clone)]
pub struct TopicsService {
    db: DatabaseConnection,
}

impl TopicsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a topic; the slug must not be taken yet
    pub async fn create_topic(
        &self,
        slug: String,
        description: String,
    ) -> Result<TopicModel, TopicsServiceError> {
        if self.find_by_slug(&slug).await?.is_some() {
            return Err(TopicsServiceError::TopicExists);
        }

        let topic = TopicActiveModel {
            id: Set(TopicId::new()),
            slug: Set(slug),
            description: Set(description),
            created_at: Set(chrono::Utc::now()),
        };

        let result = Topic::insert(topic).exec_with_returning(&self.db).await?;

        Ok(result)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<TopicModel, TopicsServiceError> {
        self.find_by_slug(slug)
            .await?
            .ok_or(TopicsServiceError::TopicNotFound)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<TopicModel>, DbErr> {
        Topic::find()
            .filter(TopicColumn::Slug.eq(slug))
            .one(&self.db)
            .await
    }

    /// Every topic with its post count, newest first
    pub async fn list_with_post_counts(&self) -> Result<Vec<TopicWithCount>, TopicsServiceError> {
        let topics = Topic::find()
            .order_by_desc(TopicColumn::CreatedAt)
            .all(&self.db)
            .await?;

        let counts: HashMap<TopicId, i64> = Post::find()
            .select_only()
            .column(PostColumn::TopicId)
            .column_as(PostColumn::Id.count(), "post_count")
            .group_by(PostColumn::TopicId)
            .into_tuple::<(TopicId, i64)>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();

        Ok(topics
            .into_iter()
            .map(|topic| {
                let posts = counts.get(&topic.id).copied().unwrap_or(0).max(0) as u64;
                TopicWithCount {
                    topic,
                    count: TopicCounts { posts },
                }
            })
            .collect())
    }
}
