//! Recursive comment-tree rendering.

use agora_core::{
    ids::{PostId, UserId},
    thread::{CommentNode, CommentTree},
};
use askama::Template;

use crate::templates::{display_date, CommentNodeTemplate};

/// Who is looking at the thread, and where it lives.
#[derive(Debug, Clone, Copy)]
pub struct ThreadContext {
    pub post_id: PostId,
    pub viewer: Option<UserId>,
}

pub fn render_thread(tree: &CommentTree, ctx: ThreadContext) -> Result<String, askama::Error> {
    let mut html = String::new();
    for root in &tree.roots {
        html.push_str(&render_node(root, ctx)?);
    }
    Ok(html)
}

fn render_node(node: &CommentNode, ctx: ThreadContext) -> Result<String, askama::Error> {
    let mut children_html = String::new();
    for reply in &node.replies {
        children_html.push_str(&render_node(reply, ctx)?);
    }

    let comment = &node.comment.comment;
    let author = &node.comment.user;

    CommentNodeTemplate {
        id: comment.id.to_string(),
        post_id: ctx.post_id.to_string(),
        content: comment.content.clone(),
        author: author.display_name().to_string(),
        author_image: author.image.clone(),
        created: display_date(&comment.created_at),
        depth: node.depth,
        reply_count: node.reply_count,
        can_reply: ctx.viewer.is_some() && node.can_reply(),
        is_owner: ctx.viewer == Some(comment.user_id),
        children_html,
    }
    .render()
}

#[cfg(test)]
mod tests {
    use agora_core::{
        entity::prelude::{CommentModel, UserModel},
        ids::CommentId,
        service::CommentView,
        thread::LOAD_DEPTH,
    };
    use chrono::{Duration, Utc};

    use super::*;

    fn view(
        post_id: PostId,
        author: &UserModel,
        parent: Option<CommentId>,
        content: &str,
        minutes: i64,
    ) -> CommentView {
        CommentView {
            comment: CommentModel {
                id: CommentId::new(),
                content: content.to_string(),
                post_id,
                user_id: author.id,
                parent_id: parent,
                created_at: Utc::now() + Duration::minutes(minutes),
            },
            user: author.clone(),
        }
    }

    fn user(name: Option<&str>) -> UserModel {
        UserModel {
            id: UserId::new(),
            name: name.map(str::to_string),
            email: None,
            image: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_nested_replies_render_inside_parent() {
        let post_id = PostId::new();
        let alice = user(Some("alice"));
        let root = view(post_id, &alice, None, "root text", 0);
        let reply = view(post_id, &alice, Some(root.comment.id), "reply text", 1);

        let tree = CommentTree::build(vec![root, reply], LOAD_DEPTH);
        let html = render_thread(
            &tree,
            ThreadContext {
                post_id,
                viewer: None,
            },
        )
        .unwrap();

        let root_at = html.find("root text").unwrap();
        let reply_at = html.find("reply text").unwrap();
        assert!(root_at < reply_at);
        assert!(html.contains("1 reply"));
        // Signed out: no forms at all
        assert!(!html.contains("action=\"/comments\""));
    }

    #[test]
    fn test_only_owner_sees_edit_and_delete() {
        let post_id = PostId::new();
        let alice = user(Some("alice"));
        let bob = user(None);
        let tree = CommentTree::build(
            vec![
                view(post_id, &alice, None, "by alice", 0),
                view(post_id, &bob, None, "by bob", 1),
            ],
            LOAD_DEPTH,
        );

        let html = render_thread(
            &tree,
            ThreadContext {
                post_id,
                viewer: Some(alice.id),
            },
        )
        .unwrap();

        assert_eq!(html.matches("value=\"edit\"").count(), 1);
        assert_eq!(html.matches("value=\"delete\"").count(), 1);
        assert_eq!(html.matches("<summary>Reply</summary>").count(), 2);
        assert!(html.contains("Anonymous"));
    }
}
