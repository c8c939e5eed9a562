use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use validator::{Validate, ValidationError};

use super::{check_length, parse_id, ActionResult, FieldErrors};
use crate::{
    ids::{CommentId, PostId},
    service::{CommentView, CommentsServiceError, SessionUser},
    Forum,
};

const COMMENT_MAX: usize = 10_000;

const SIGNED_OUT: &str = "You must be signed in to comment";

fn comment_length(content: &str) -> Result<(), ValidationError> {
    check_length(
        content,
        COMMENT_MAX,
        "Comment is required",
        "Comment must be less than 10000 characters",
    )
}

/// Raw comment form. `action` picks create (default), edit or delete.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommentForm {
    pub action: Option<String>,
    pub content: String,
    pub post_id: String,
    pub parent_id: Option<String>,
    pub comment_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentAction {
    Create(CreateComment),
    Edit(EditComment),
    Delete(DeleteComment),
}

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct CreateComment {
    #[validate(custom(function = "comment_length"))]
    pub content: String,
    #[validate(length(min = 1, message = "Post ID is required"))]
    pub post_id: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct EditComment {
    #[validate(custom(function = "comment_length"))]
    pub content: String,
    #[validate(length(min = 1, message = "Comment ID is required"))]
    pub comment_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct DeleteComment {
    #[validate(length(min = 1, message = "Comment ID is required"))]
    pub comment_id: String,
}

impl From<CommentForm> for CommentAction {
    fn from(form: CommentForm) -> Self {
        match form.action.as_deref() {
            Some("edit") => CommentAction::Edit(EditComment {
                content: form.content,
                comment_id: form.comment_id,
            }),
            Some("delete") => CommentAction::Delete(DeleteComment {
                comment_id: form.comment_id,
            }),
            _ => CommentAction::Create(CreateComment {
                content: form.content,
                post_id: form.post_id,
                // An empty select means "no parent"
                parent_id: form.parent_id.filter(|id| !id.is_empty()),
            }),
        }
    }
}

/// Payload of a successful comment action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommentOutcome {
    Created { comment: CommentView },
    Edited { comment: CommentView },
    Deleted { deleted: bool },
}

impl CommentOutcome {
    /// The comment shown after the action, if it still exists
    pub fn comment(&self) -> Option<&CommentView> {
        match self {
            CommentOutcome::Created { comment } | CommentOutcome::Edited { comment } => {
                Some(comment)
            }
            CommentOutcome::Deleted { .. } => None,
        }
    }
}

// Maps a service failure for one verb ("create", "edit", "delete").
fn comment_errors(error: CommentsServiceError, verb: &str) -> FieldErrors {
    match error {
        CommentsServiceError::CommentNotFound => FieldErrors::form("Comment not found"),
        CommentsServiceError::PostNotFound => FieldErrors::form("Post not found"),
        CommentsServiceError::ParentNotFound => FieldErrors::form("Parent comment not found"),
        CommentsServiceError::ParentMismatch => {
            FieldErrors::field("parentId", "Parent comment belongs to a different post")
        }
        CommentsServiceError::Unauthorized => {
            FieldErrors::form(format!("You can only {verb} your own comments"))
        }
        CommentsServiceError::UserNotFound => FieldErrors::form(SIGNED_OUT),
        CommentsServiceError::DbError(error) => {
            error!("Error trying to {verb} comment: {error}");
            FieldErrors::form(format!("Failed to {verb} comment"))
        }
    }
}

impl Forum {
    /// Create, edit or delete a comment as the signed-in user.
    pub async fn comment_action(
        &self,
        user: Option<&SessionUser>,
        form: CommentForm,
    ) -> ActionResult<CommentOutcome> {
        let Some(user) = user else {
            return Err(FieldErrors::form(SIGNED_OUT));
        };

        match CommentAction::from(form) {
            CommentAction::Create(create) => self.create_comment(user, create).await,
            CommentAction::Edit(edit) => self.edit_comment(user, edit).await,
            CommentAction::Delete(delete) => self.delete_comment(user, delete).await,
        }
    }

    async fn create_comment(
        &self,
        user: &SessionUser,
        input: CreateComment,
    ) -> ActionResult<CommentOutcome> {
        input.validate()?;

        let post_id: PostId = parse_id(&input.post_id, "Post not found")?;
        let parent_id: Option<CommentId> = match input.parent_id.as_deref() {
            Some(raw) => Some(parse_id(raw, "Parent comment not found")?),
            None => None,
        };

        let comment = self
            .comments
            .create_comment(user.id, post_id, parent_id, input.content)
            .await
            .map_err(|e| comment_errors(e, "create"))?;

        Ok(CommentOutcome::Created { comment })
    }

    async fn edit_comment(
        &self,
        user: &SessionUser,
        input: EditComment,
    ) -> ActionResult<CommentOutcome> {
        input.validate()?;

        let comment_id = parse_comment_id(&input.comment_id)?;
        let comment = self
            .comments
            .edit_comment(comment_id, user.id, input.content)
            .await
            .map_err(|e| {
                if matches!(e, CommentsServiceError::Unauthorized) {
                    warn!("User {} tried to edit comment {comment_id}", user.id);
                }
                comment_errors(e, "edit")
            })?;

        Ok(CommentOutcome::Edited { comment })
    }

    async fn delete_comment(
        &self,
        user: &SessionUser,
        input: DeleteComment,
    ) -> ActionResult<CommentOutcome> {
        input.validate()?;

        let comment_id = parse_comment_id(&input.comment_id)?;
        self.comments
            .delete_comment(comment_id, user.id)
            .await
            .map_err(|e| {
                if matches!(e, CommentsServiceError::Unauthorized) {
                    warn!("User {} tried to delete comment {comment_id}", user.id);
                }
                comment_errors(e, "delete")
            })?;

        Ok(CommentOutcome::Deleted { deleted: true })
    }
}

fn parse_comment_id(raw: &str) -> Result<CommentId, FieldErrors> {
    parse_id(raw, "Comment not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        actions::{ActionResponse, FORM_ERROR_KEY},
        entity::prelude::*,
        test_utils,
    };

    struct Fixture {
        forum: Forum,
        db: DatabaseConnection,
        user: SessionUser,
        post: PostModel,
    }

    async fn setup() -> Fixture {
        let db = test_utils::setup_test_db().await;
        let user = test_utils::create_test_user(&db, "Commenter").await;
        let topic = test_utils::create_test_topic(&db, "rust").await;
        let post = test_utils::create_test_post(&db, user.id, topic.id, "Post").await;

        Fixture {
            forum: Forum::new(db.clone()),
            db,
            user: user.into(),
            post,
        }
    }

    fn create(post_id: PostId, parent: Option<CommentId>, content: &str) -> CommentForm {
        CommentForm {
            content: content.to_string(),
            post_id: post_id.to_string(),
            parent_id: parent.map(|id| id.to_string()),
            ..Default::default()
        }
    }

    fn edit(comment_id: CommentId, content: &str) -> CommentForm {
        CommentForm {
            action: Some("edit".to_string()),
            content: content.to_string(),
            comment_id: comment_id.to_string(),
            ..Default::default()
        }
    }

    fn delete(comment_id: CommentId) -> CommentForm {
        CommentForm {
            action: Some("delete".to_string()),
            comment_id: comment_id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_unknown_action_means_create() {
        let form = CommentForm {
            action: Some("frobnicate".to_string()),
            content: "hi".to_string(),
            post_id: "p".to_string(),
            parent_id: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(
            CommentAction::from(form),
            CommentAction::Create(CreateComment {
                content: "hi".to_string(),
                post_id: "p".to_string(),
                parent_id: None,
            })
        );
    }

    #[tokio::test]
    async fn test_signed_out() {
        let f = setup().await;

        for form in [
            create(f.post.id, None, "hi"),
            edit(CommentId::new(), "hi"),
            delete(CommentId::new()),
        ] {
            let errors = f.forum.comment_action(None, form).await.unwrap_err();
            assert_eq!(errors.get(FORM_ERROR_KEY), [SIGNED_OUT]);
        }
    }

    #[tokio::test]
    async fn test_create_and_reply() {
        let f = setup().await;

        let root = f
            .forum
            .comment_action(Some(&f.user), create(f.post.id, None, "root"))
            .await
            .unwrap();
        let root = root.comment().unwrap().comment.clone();
        assert!(root.parent_id.is_none());

        let reply = f
            .forum
            .comment_action(Some(&f.user), create(f.post.id, Some(root.id), "reply"))
            .await
            .unwrap();
        assert_eq!(reply.comment().unwrap().comment.parent_id, Some(root.id));
        assert_eq!(reply.comment().unwrap().user.id, f.user.id);
    }

    #[tokio::test]
    async fn test_create_validation() {
        let f = setup().await;

        let errors = f
            .forum
            .comment_action(Some(&f.user), CommentForm::default())
            .await
            .unwrap_err();
        assert_eq!(errors.get("content"), ["Comment is required"]);
        assert_eq!(errors.get("postId"), ["Post ID is required"]);

        let errors = f
            .forum
            .comment_action(Some(&f.user), create(f.post.id, None, &"x".repeat(10_001)))
            .await
            .unwrap_err();
        assert_eq!(
            errors.get("content"),
            ["Comment must be less than 10000 characters"]
        );
    }

    #[tokio::test]
    async fn test_create_on_missing_post_or_parent() {
        let f = setup().await;

        let errors = f
            .forum
            .comment_action(Some(&f.user), create(PostId::new(), None, "hi"))
            .await
            .unwrap_err();
        assert_eq!(errors.get(FORM_ERROR_KEY), ["Post not found"]);

        let errors = f
            .forum
            .comment_action(Some(&f.user), create(f.post.id, Some(CommentId::new()), "hi"))
            .await
            .unwrap_err();
        assert_eq!(errors.get(FORM_ERROR_KEY), ["Parent comment not found"]);
    }

    #[tokio::test]
    async fn test_cross_post_parent() {
        let f = setup().await;
        let topic = test_utils::create_test_topic(&f.db, "other").await;
        let other = test_utils::create_test_post(&f.db, f.user.id, topic.id, "Other").await;
        let foreign = test_utils::create_test_comment(&f.db, f.user.id, other.id, None, "x").await;

        let errors = f
            .forum
            .comment_action(Some(&f.user), create(f.post.id, Some(foreign.id), "hi"))
            .await
            .unwrap_err();
        assert_eq!(
            errors.get("parentId"),
            ["Parent comment belongs to a different post"]
        );
    }

    #[tokio::test]
    async fn test_edit_own_comment() {
        let f = setup().await;
        let comment = test_utils::create_test_comment(&f.db, f.user.id, f.post.id, None, "old").await;

        let outcome = f
            .forum
            .comment_action(Some(&f.user), edit(comment.id, "new"))
            .await
            .unwrap();

        let edited = outcome.comment().unwrap();
        assert_eq!(edited.comment.id, comment.id);
        assert_eq!(edited.comment.content, "new");
    }

    #[tokio::test]
    async fn test_edit_requires_ownership() {
        let f = setup().await;
        let intruder: SessionUser = test_utils::create_test_user(&f.db, "Intruder").await.into();
        let comment = test_utils::create_test_comment(&f.db, f.user.id, f.post.id, None, "old").await;

        let errors = f
            .forum
            .comment_action(Some(&intruder), edit(comment.id, "hacked"))
            .await
            .unwrap_err();
        assert_eq!(
            errors.get(FORM_ERROR_KEY),
            ["You can only edit your own comments"]
        );

        let stored = f.forum.comments.get_comment(comment.id).await.unwrap();
        assert_eq!(stored.content, "old");
    }

    #[tokio::test]
    async fn test_edit_validation_and_missing() {
        let f = setup().await;

        let errors = f
            .forum
            .comment_action(
                Some(&f.user),
                CommentForm {
                    action: Some("edit".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(errors.get("content"), ["Comment is required"]);
        assert_eq!(errors.get("commentId"), ["Comment ID is required"]);

        let errors = f
            .forum
            .comment_action(Some(&f.user), edit(CommentId::new(), "text"))
            .await
            .unwrap_err();
        assert_eq!(errors.get(FORM_ERROR_KEY), ["Comment not found"]);
    }

    #[tokio::test]
    async fn test_delete_cascades_and_answers_deleted() {
        let f = setup().await;
        let root = test_utils::create_test_comment(&f.db, f.user.id, f.post.id, None, "root").await;
        test_utils::create_test_comment(&f.db, f.user.id, f.post.id, Some(root.id), "child").await;

        let outcome = f
            .forum
            .comment_action(Some(&f.user), delete(root.id))
            .await
            .unwrap();
        assert_eq!(outcome, CommentOutcome::Deleted { deleted: true });

        let response: ActionResponse<CommentOutcome> = ActionResult::Ok(outcome).into();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "deleted": true}));

        assert_eq!(f.forum.comments.count_for_post(f.post.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_requires_ownership() {
        let f = setup().await;
        let intruder: SessionUser = test_utils::create_test_user(&f.db, "Intruder").await.into();
        let comment = test_utils::create_test_comment(&f.db, f.user.id, f.post.id, None, "mine").await;

        let errors = f
            .forum
            .comment_action(Some(&intruder), delete(comment.id))
            .await
            .unwrap_err();
        assert_eq!(
            errors.get(FORM_ERROR_KEY),
            ["You can only delete your own comments"]
        );
        assert_eq!(f.forum.comments.count_for_post(f.post.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_topic_page_counts_follow_comments() {
        let f = setup().await;
        let before = f.forum.load_topic_page("rust").await.unwrap();
        assert_eq!(before.posts[0].comment_count, 0);

        let created = f
            .forum
            .comment_action(Some(&f.user), create(f.post.id, None, "hi"))
            .await
            .unwrap();
        let page = f.forum.load_topic_page("rust").await.unwrap();
        assert_eq!(page.posts[0].comment_count, 1);
        assert_eq!(f.forum.load_home().await.unwrap().posts[0].comment_count, 1);

        let comment_id = created.comment().unwrap().comment.id;
        f.forum
            .comment_action(Some(&f.user), delete(comment_id))
            .await
            .unwrap();
        let page = f.forum.load_topic_page("rust").await.unwrap();
        assert_eq!(page.posts[0].comment_count, 0);
    }
}
