//! Assembles flat comment lists into reply trees.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    entity::prelude::VideoCommentModel,
    ids::{CommentId, UserId},
    store::CommentWithAuthor,
};

/// Replies nest one level under root comments.
pub const DEFAULT_MAX_REPLY_DEPTH: usize = 1;

/// Anything that can be placed in a reply tree.
pub trait Threaded {
    fn comment_id(&self) -> CommentId;
    fn parent_comment_id(&self) -> Option<CommentId>;
    fn author_id(&self) -> UserId;
}

impl Threaded for VideoCommentModel {
    fn comment_id(&self) -> CommentId {
        self.id
    }

    fn parent_comment_id(&self) -> Option<CommentId> {
        self.parent_id
    }

    fn author_id(&self) -> UserId {
        self.user_id
    }
}

impl Threaded for CommentWithAuthor {
    fn comment_id(&self) -> CommentId {
        self.comment.id
    }

    fn parent_comment_id(&self) -> Option<CommentId> {
        self.comment.parent_id
    }

    fn author_id(&self) -> UserId {
        self.comment.user_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentNode<T> {
    #[serde(flatten)]
    pub comment: T,
    pub replies: Vec<CommentNode<T>>,
}

/// Builds the reply tree for one video's comments.
///
/// `comments` should be in chronological order; roots and every reply list
/// keep that order. A reply whose parent is not in `comments` is dropped.
/// Nodes `max_depth` levels below a root carry no replies, so with the
/// default depth of 1 a reply's own replies are discarded.
pub fn build_comment_tree<T: Threaded>(comments: Vec<T>, max_depth: usize) -> Vec<CommentNode<T>> {
    let index: HashMap<CommentId, usize> = comments
        .iter()
        .enumerate()
        .map(|(position, comment)| (comment.comment_id(), position))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];
    let mut roots = Vec::new();

    for (position, comment) in comments.iter().enumerate() {
        match comment.parent_comment_id() {
            None => roots.push(position),
            Some(parent_id) => match index.get(&parent_id) {
                Some(&parent) => children[parent].push(position),
                None => tracing::debug!(
                    comment_id = %comment.comment_id(),
                    %parent_id,
                    "dropping reply to unknown comment"
                ),
            },
        }
    }

    let mut slots: Vec<Option<T>> = comments.into_iter().map(Some).collect();

    roots
        .into_iter()
        .filter_map(|root| assemble(root, 0, max_depth, &children, &mut slots))
        .collect()
}

fn assemble<T>(
    position: usize,
    depth: usize,
    max_depth: usize,
    children: &[Vec<usize>],
    slots: &mut [Option<T>],
) -> Option<CommentNode<T>> {
    let comment = slots[position].take()?;

    let replies = if depth < max_depth {
        children[position]
            .iter()
            .filter_map(|&child| assemble(child, depth + 1, max_depth, children, slots))
            .collect()
    } else {
        Vec::new()
    };

    Some(CommentNode { comment, replies })
}

/// Only the author may edit or delete a comment.
pub fn can_modify<T: Threaded>(comment: &T, viewer: Option<UserId>) -> bool {
    viewer == Some(comment.author_id())
}

/// Number of comments visible in the tree.
pub fn count_comments<T>(tree: &[CommentNode<T>]) -> usize {
    tree.iter()
        .map(|node| 1 + count_comments(&node.replies))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: CommentId,
        parent: Option<CommentId>,
        author: UserId,
    }

    impl Threaded for Row {
        fn comment_id(&self) -> CommentId {
            self.id
        }

        fn parent_comment_id(&self) -> Option<CommentId> {
            self.parent
        }

        fn author_id(&self) -> UserId {
            self.author
        }
    }

    fn row(parent: Option<CommentId>) -> Row {
        Row {
            id: CommentId::new(),
            parent,
            author: UserId::new(),
        }
    }

    #[test]
    fn orphaned_replies_are_dropped() {
        let a = row(None);
        let b = row(Some(a.id));
        let c = row(Some(CommentId::new()));

        let tree = build_comment_tree(vec![a.clone(), b.clone(), c], DEFAULT_MAX_REPLY_DEPTH);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].comment, a);
        assert_eq!(tree[0].replies.len(), 1);
        assert_eq!(tree[0].replies[0].comment, b);
        assert_eq!(count_comments(&tree), 2);
    }

    #[test]
    fn keeps_chronological_order() {
        let first = row(None);
        let second = row(None);
        let reply_one = row(Some(first.id));
        let reply_two = row(Some(first.id));

        let tree = build_comment_tree(
            vec![first.clone(), reply_one.clone(), second.clone(), reply_two.clone()],
            DEFAULT_MAX_REPLY_DEPTH,
        );

        let roots: Vec<_> = tree.iter().map(|node| node.comment.id).collect();
        assert_eq!(roots, vec![first.id, second.id]);

        let replies: Vec<_> = tree[0].replies.iter().map(|node| node.comment.id).collect();
        assert_eq!(replies, vec![reply_one.id, reply_two.id]);
        assert!(tree[1].replies.is_empty());
    }

    #[test]
    fn truncates_below_max_depth() {
        let root = row(None);
        let reply = row(Some(root.id));
        let nested = row(Some(reply.id));

        let shallow = build_comment_tree(
            vec![root.clone(), reply.clone(), nested.clone()],
            DEFAULT_MAX_REPLY_DEPTH,
        );
        assert_eq!(shallow[0].replies.len(), 1);
        assert!(shallow[0].replies[0].replies.is_empty());
        assert_eq!(count_comments(&shallow), 2);

        let deep = build_comment_tree(vec![root, reply, nested.clone()], 2);
        assert_eq!(deep[0].replies[0].replies[0].comment, nested);

        let flat = build_comment_tree(vec![row(None), row(None)], 0);
        assert!(flat.iter().all(|node| node.replies.is_empty()));
    }

    #[test]
    fn empty_input_builds_empty_tree() {
        let tree = build_comment_tree(Vec::<Row>::new(), DEFAULT_MAX_REPLY_DEPTH);
        assert!(tree.is_empty());
    }

    #[test]
    fn only_author_can_modify() {
        let comment = row(None);
        assert!(can_modify(&comment, Some(comment.author)));
        assert!(!can_modify(&comment, Some(UserId::new())));
        assert!(!can_modify(&comment, None));
    }
}
