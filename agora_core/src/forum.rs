use sea_orm::{DatabaseConnection, DbErr};
use thiserror::Error;

use crate::{
    entity::prelude::TopicModel,
    ids::PostId,
    service::{
        CommentsService, CommentsServiceError, PostView, PostsService, PostsServiceError,
        SessionsService, TopicWithCount, TopicsService, TopicsServiceError, UsersService,
    },
    thread::{CommentTree, LOAD_DEPTH},
};

/// Every service of the forum over one database connection.
#[derive(Clone)]
pub struct Forum {
    pub topics: TopicsService,
    pub posts: PostsService,
    pub comments: CommentsService,
    pub users: UsersService,
    pub sessions: SessionsService,
}

impl Forum {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            topics: TopicsService::new(db.clone()),
            posts: PostsService::new(db.clone()),
            comments: CommentsService::new(db.clone()),
            users: UsersService::new(db.clone()),
            sessions: SessionsService::new(db),
        }
    }
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("page not found")]
    NotFound,

    #[error("fatal database error")]
    DbError(#[from] DbErr),
}

impl From<TopicsServiceError> for PageError {
    fn from(error: TopicsServiceError) -> Self {
        match error {
            TopicsServiceError::DbError(error) => PageError::DbError(error),
            TopicsServiceError::TopicNotFound | TopicsServiceError::TopicExists => {
                PageError::NotFound
            }
        }
    }
}

impl From<PostsServiceError> for PageError {
    fn from(error: PostsServiceError) -> Self {
        match error {
            PostsServiceError::DbError(error) => PageError::DbError(error),
            _ => PageError::NotFound,
        }
    }
}

impl From<CommentsServiceError> for PageError {
    fn from(error: CommentsServiceError) -> Self {
        match error {
            CommentsServiceError::DbError(error) => PageError::DbError(error),
            _ => PageError::NotFound,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HomePage {
    pub posts: Vec<PostView>,
    pub topics: Vec<TopicWithCount>,
}

#[derive(Debug, Clone)]
pub struct TopicPage {
    pub topic: TopicModel,
    pub posts: Vec<PostView>,
}

#[derive(Debug, Clone)]
pub struct PostPage {
    pub post: PostView,
    pub comments: CommentTree,
}

// Pages are read fresh on every view.
impl Forum {
    /// Recent posts and the topic sidebar
    pub async fn load_home(&self) -> Result<HomePage, PageError> {
        Ok(HomePage {
            posts: self.posts.list_recent_posts().await?,
            topics: self.topics.list_with_post_counts().await?,
        })
    }

    pub async fn load_topic_page(&self, slug: &str) -> Result<TopicPage, PageError> {
        let topic = self.topics.get_by_slug(slug).await?;
        let posts = self.posts.list_posts_for_topic(topic.id).await?;

        Ok(TopicPage { topic, posts })
    }

    /// A post with its comments arranged `LOAD_DEPTH` levels deep
    pub async fn load_post_page(&self, post_id: PostId) -> Result<PostPage, PageError> {
        let post = self.posts.get_post_view(post_id).await?;
        let comments = self.comments.list_for_post(post_id).await?;

        Ok(PostPage {
            post,
            comments: CommentTree::build(comments, LOAD_DEPTH),
        })
    }
}
