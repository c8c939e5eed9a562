use std::collections::HashMap;

use sea_orm::DatabaseConnection;
use serde::Serialize;
use thiserror::Error;

use crate::{
    entity::prelude::*,
    ids::{PostId, TopicId, UserId},
};

#[derive(Debug, Error)]
pub enum PostsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("post not found")]
    PostNotFound,

    #[error("topic not found")]
    TopicNotFound,

    #[error("user not found")]
    UserNotFound,
}

/// A post joined with its author, its topic and its comment count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(flatten)]
    pub post: PostModel,
    pub user: UserModel,
    pub topic: TopicModel,
    pub comment_count: u64,
}

#[derive(Clone)]
pub struct PostsService {
    db: DatabaseConnection,
}

impl PostsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new post in a topic
    pub async fn create_post(
        &self,
        user_id: UserId,
        topic_id: TopicId,
        title: String,
        content: String,
    ) -> Result<PostView, PostsServiceError> {
        let user = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(PostsServiceError::UserNotFound)?;

        let topic = Topic::find_by_id(topic_id)
            .one(&self.db)
            .await?
            .ok_or(PostsServiceError::TopicNotFound)?;

        let post = PostActiveModel {
            id: Set(PostId::new()),
            title: Set(title),
            content: Set(content),
            topic_id: Set(topic_id),
            user_id: Set(user_id),
            created_at: Set(chrono::Utc::now()),
        };

        let post = Post::insert(post).exec_with_returning(&self.db).await?;

        Ok(PostView {
            post,
            user,
            topic,
            comment_count: 0,
        })
    }

    /// Get a specific post by ID
    pub async fn get_post(&self, post_id: PostId) -> Result<PostModel, PostsServiceError> {
        Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .ok_or(PostsServiceError::PostNotFound)
    }

    /// Get a post joined with author and topic
    pub async fn get_post_view(&self, post_id: PostId) -> Result<PostView, PostsServiceError> {
        let post = self.get_post(post_id).await?;
        self.into_views(vec![post])
            .await?
            .pop()
            .ok_or(PostsServiceError::PostNotFound)
    }

    /// Every post, newest first
    pub async fn list_recent_posts(&self) -> Result<Vec<PostView>, PostsServiceError> {
        let posts = Post::find()
            .order_by_desc(PostColumn::CreatedAt)
            .all(&self.db)
            .await?;

        self.into_views(posts).await
    }

    /// Posts of one topic, newest first
    pub async fn list_posts_for_topic(
        &self,
        topic_id: TopicId,
    ) -> Result<Vec<PostView>, PostsServiceError> {
        let posts = Post::find()
            .filter(PostColumn::TopicId.eq(topic_id))
            .order_by_desc(PostColumn::CreatedAt)
            .all(&self.db)
            .await?;

        self.into_views(posts).await
    }

    /// Count total posts in a topic
    pub async fn count_posts_in_topic(&self, topic_id: TopicId) -> Result<u64, PostsServiceError> {
        let count = Post::find()
            .filter(PostColumn::TopicId.eq(topic_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    // Joins authors, topics and comment counts with one query each.
    async fn into_views(&self, posts: Vec<PostModel>) -> Result<Vec<PostView>, PostsServiceError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<UserId> = posts.iter().map(|p| p.user_id).collect();
        let topic_ids: Vec<TopicId> = posts.iter().map(|p| p.topic_id).collect();
        let post_ids: Vec<PostId> = posts.iter().map(|p| p.id).collect();

        let users: HashMap<UserId, UserModel> = User::find()
            .filter(UserColumn::Id.is_in(user_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let topics: HashMap<TopicId, TopicModel> = Topic::find()
            .filter(TopicColumn::Id.is_in(topic_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let comment_counts: HashMap<PostId, i64> = Comment::find()
            .select_only()
            .column(CommentColumn::PostId)
            .column_as(CommentColumn::Id.count(), "comment_count")
            .filter(CommentColumn::PostId.is_in(post_ids))
            .group_by(CommentColumn::PostId)
            .into_tuple::<(PostId, i64)>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();

        let mut views = Vec::with_capacity(posts.len());
        for post in posts {
            let user = users
                .get(&post.user_id)
                .cloned()
                .ok_or(PostsServiceError::UserNotFound)?;
            let topic = topics
                .get(&post.topic_id)
                .cloned()
                .ok_or(PostsServiceError::TopicNotFound)?;
            let comment_count = comment_counts.get(&post.id).copied().unwrap_or(0).max(0) as u64;

            views.push(PostView {
                post,
                user,
                topic,
                comment_count,
            });
        }

        Ok(views)
    }
}
