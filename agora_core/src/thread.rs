//! Builds the nested comment view of a post from its flat comment list.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::{ids::CommentId, service::CommentView};

/// Levels materialized on the post page (root, child, grandchild).
pub const LOAD_DEPTH: usize = 3;

/// Deepest level that still offers a reply form.
pub const MAX_REPLY_DEPTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: CommentView,
    /// Zero for root comments.
    pub depth: usize,
    pub reply_count: usize,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    pub fn id(&self) -> CommentId {
        self.comment.comment.id
    }

    pub fn can_reply(&self) -> bool {
        self.depth < MAX_REPLY_DEPTH
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommentTree {
    pub roots: Vec<CommentNode>,
    /// Every comment of the post, including ones below the load depth.
    pub total: usize,
}

impl CommentTree {
    /// Arrange comments into a tree at most `max_depth` levels deep.
    ///
    /// Roots are comments without a parent, or whose parent is not in the
    /// list; they come newest first. Replies come oldest first.
    pub fn build(comments: Vec<CommentView>, max_depth: usize) -> Self {
        let total = comments.len();

        let mut roots = Vec::new();
        let mut children: HashMap<CommentId, Vec<CommentView>> = HashMap::new();
        let known: HashSet<CommentId> = comments.iter().map(|c| c.comment.id).collect();

        for view in comments {
            match view.comment.parent_id {
                Some(parent_id) if known.contains(&parent_id) => {
                    children.entry(parent_id).or_default().push(view);
                }
                _ => roots.push(view),
            }
        }

        roots.sort_by(|a, b| b.comment.created_at.cmp(&a.comment.created_at));
        for replies in children.values_mut() {
            replies.sort_by(|a, b| a.comment.created_at.cmp(&b.comment.created_at));
        }

        let roots = if max_depth == 0 {
            Vec::new()
        } else {
            roots
                .into_iter()
                .map(|view| attach(view, 0, max_depth, &mut children))
                .collect()
        };

        Self { roots, total }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

fn attach(
    view: CommentView,
    depth: usize,
    max_depth: usize,
    children: &mut HashMap<CommentId, Vec<CommentView>>,
) -> CommentNode {
    let replies = if depth + 1 < max_depth {
        children
            .remove(&view.comment.id)
            .unwrap_or_default()
            .into_iter()
            .map(|child| attach(child, depth + 1, max_depth, children))
            .collect()
    } else {
        Vec::new()
    };

    CommentNode {
        comment: view,
        depth,
        reply_count: replies.len(),
        replies,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::entity::prelude::*;
    use crate::ids::{PostId, UserId};

    fn author() -> UserModel {
        UserModel {
            id: UserId::new(),
            name: Some("Tree".to_string()),
            email: None,
            image: None,
            created_at: Utc::now(),
        }
    }

    fn view(
        user: &UserModel,
        post_id: PostId,
        parent: Option<&CommentView>,
        minute: i64,
    ) -> CommentView {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        CommentView {
            comment: CommentModel {
                id: CommentId::new(),
                content: format!("comment at {minute}"),
                post_id,
                user_id: user.id,
                parent_id: parent.map(|p| p.comment.id),
                created_at: start + Duration::minutes(minute),
            },
            user: user.clone(),
        }
    }

    #[test]
    fn test_roots_newest_first_replies_oldest_first() {
        let user = author();
        let post = PostId::new();
        let old_root = view(&user, post, None, 0);
        let new_root = view(&user, post, None, 10);
        let late_reply = view(&user, post, Some(&old_root), 5);
        let early_reply = view(&user, post, Some(&old_root), 1);

        let tree = CommentTree::build(
            vec![
                late_reply.clone(),
                new_root.clone(),
                early_reply.clone(),
                old_root.clone(),
            ],
            LOAD_DEPTH,
        );

        assert_eq!(tree.total, 4);
        assert_eq!(tree.roots.len(), 2);
        assert_eq!(tree.roots[0].id(), new_root.comment.id);
        assert_eq!(tree.roots[1].id(), old_root.comment.id);

        let replies = &tree.roots[1].replies;
        assert_eq!(tree.roots[1].reply_count, 2);
        assert_eq!(replies[0].id(), early_reply.comment.id);
        assert_eq!(replies[1].id(), late_reply.comment.id);
        assert!(replies.iter().all(|r| r.depth == 1));
    }

    #[test]
    fn test_depth_is_bounded() {
        let user = author();
        let post = PostId::new();
        let mut chain = vec![view(&user, post, None, 0)];
        for minute in 1..6 {
            let next = view(&user, post, chain.last(), minute);
            chain.push(next);
        }

        let tree = CommentTree::build(chain, LOAD_DEPTH);
        assert_eq!(tree.total, 6);

        let root = &tree.roots[0];
        let child = &root.replies[0];
        let grandchild = &child.replies[0];
        assert_eq!(grandchild.depth, 2);
        assert!(grandchild.replies.is_empty());
        assert_eq!(grandchild.reply_count, 0);
    }

    #[test]
    fn test_orphans_become_roots() {
        let user = author();
        let post = PostId::new();
        let missing = view(&user, post, None, 0);
        let orphan = view(&user, post, Some(&missing), 1);

        let tree = CommentTree::build(vec![orphan.clone()], LOAD_DEPTH);
        assert_eq!(tree.roots.len(), 1);
        assert_eq!(tree.roots[0].id(), orphan.comment.id);
    }

    #[test]
    fn test_reply_limit() {
        let user = author();
        let node = CommentNode {
            comment: view(&user, PostId::new(), None, 0),
            depth: MAX_REPLY_DEPTH,
            reply_count: 0,
            replies: Vec::new(),
        };
        assert!(!node.can_reply());
        assert!(CommentNode { depth: 0, ..node }.can_reply());
    }

    #[test]
    fn test_empty_tree() {
        let tree = CommentTree::build(Vec::new(), LOAD_DEPTH);
        assert!(tree.is_empty());
        assert_eq!(tree.total, 0);
    }
}
