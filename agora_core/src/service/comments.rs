use sea_orm::DatabaseConnection;
use serde::Serialize;
use thiserror::Error;

use crate::{
    entity::prelude::*,
    ids::{CommentId, PostId, UserId},
};

#[derive(Debug, Error)]
pub enum CommentsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("comment not found")]
    CommentNotFound,

    #[error("post not found")]
    PostNotFound,

    #[error("parent comment not found")]
    ParentNotFound,

    #[error("parent comment belongs to a different post")]
    ParentMismatch,

    #[error("user not found")]
    UserNotFound,

    #[error("unauthorized: not comment author")]
    Unauthorized,
}

/// A comment joined with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: CommentModel,
    pub user: UserModel,
}

#[derive(Clone)]
pub struct CommentsService {
    db: DatabaseConnection,
}

impl CommentsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a comment on a post, optionally as a reply to another comment
    pub async fn create_comment(
        &self,
        user_id: UserId,
        post_id: PostId,
        parent_id: Option<CommentId>,
        content: String,
    ) -> Result<CommentView, CommentsServiceError> {
        let post_exists = Post::find_by_id(post_id).one(&self.db).await?.is_some();
        if !post_exists {
            return Err(CommentsServiceError::PostNotFound);
        }

        if let Some(parent_id) = parent_id {
            let parent = Comment::find_by_id(parent_id)
                .one(&self.db)
                .await?
                .ok_or(CommentsServiceError::ParentNotFound)?;

            // Replies stay on the post of their parent
            if parent.post_id != post_id {
                return Err(CommentsServiceError::ParentMismatch);
            }
        }

        let user = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(CommentsServiceError::UserNotFound)?;

        let comment = CommentActiveModel {
            id: Set(CommentId::new()),
            content: Set(content),
            post_id: Set(post_id),
            user_id: Set(user_id),
            parent_id: Set(parent_id),
            created_at: Set(chrono::Utc::now()),
        };

        let comment = Comment::insert(comment)
            .exec_with_returning(&self.db)
            .await?;

        Ok(CommentView { comment, user })
    }

    /// Get a specific comment by ID
    pub async fn get_comment(
        &self,
        comment_id: CommentId,
    ) -> Result<CommentModel, CommentsServiceError> {
        Comment::find_by_id(comment_id)
            .one(&self.db)
            .await?
            .ok_or(CommentsServiceError::CommentNotFound)
    }

    /// Replace the content of a comment (only by author)
    pub async fn edit_comment(
        &self,
        comment_id: CommentId,
        user_id: UserId,
        content: String,
    ) -> Result<CommentView, CommentsServiceError> {
        let comment = self.get_comment(comment_id).await?;

        if comment.user_id != user_id {
            return Err(CommentsServiceError::Unauthorized);
        }

        let user = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(CommentsServiceError::UserNotFound)?;

        let mut active: CommentActiveModel = comment.into();
        active.content = Set(content);

        let comment = active.update(&self.db).await?;
        Ok(CommentView { comment, user })
    }

    /// Delete a comment and every reply below it (only by author).
    ///
    /// Returns the removed comment so callers know which post changed.
    pub async fn delete_comment(
        &self,
        comment_id: CommentId,
        user_id: UserId,
    ) -> Result<CommentModel, CommentsServiceError> {
        let comment = self.get_comment(comment_id).await?;

        if comment.user_id != user_id {
            return Err(CommentsServiceError::Unauthorized);
        }

        let txn = self.db.begin().await?;

        let mut doomed = vec![comment.id];
        let mut frontier = vec![comment.id];
        while !frontier.is_empty() {
            let children: Vec<CommentId> = Comment::find()
                .select_only()
                .column(CommentColumn::Id)
                .filter(CommentColumn::ParentId.is_in(frontier))
                .into_tuple()
                .all(&txn)
                .await?;

            doomed.extend(children.iter().copied());
            frontier = children;
        }

        Comment::delete_many()
            .filter(CommentColumn::Id.is_in(doomed))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        Ok(comment)
    }

    /// Every comment of a post with its author, newest first
    pub async fn list_for_post(
        &self,
        post_id: PostId,
    ) -> Result<Vec<CommentView>, CommentsServiceError> {
        let rows = Comment::find()
            .filter(CommentColumn::PostId.eq(post_id))
            .find_also_related(User)
            .order_by_desc(CommentColumn::CreatedAt)
            .all(&self.db)
            .await?;

        rows.into_iter()
            .map(|(comment, user)| {
                let user = user.ok_or(CommentsServiceError::UserNotFound)?;
                Ok(CommentView { comment, user })
            })
            .collect()
    }

    /// Count all comments of a post, replies included
    pub async fn count_for_post(&self, post_id: PostId) -> Result<u64, CommentsServiceError> {
        let count = Comment::find()
            .filter(CommentColumn::PostId.eq(post_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }
}
