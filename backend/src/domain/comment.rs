//! Comments and threaded comment views.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::{CommentId, PostId, UserId, Username};

/// Stored comment. Replies point at their parent through `parent_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub parent_id: Option<CommentId>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Values required to insert a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub parent_id: Option<CommentId>,
    pub content: String,
}

/// Comment joined with the commenter's username.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentView {
    pub comment: Comment,
    pub username: Username,
}

/// Node of a comment thread.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub comment: CommentView,
    pub replies: Vec<CommentNode>,
}

/// Assemble a flat list of comments into root threads.
///
/// Roots and replies are ordered oldest first. A reply whose parent is not in
/// `comments` is promoted to a root so nothing is silently dropped.
///
/// # Examples
/// ```
/// use social_backend::domain::build_comment_thread;
///
/// assert!(build_comment_thread(Vec::new()).is_empty());
/// ```
pub fn build_comment_thread(mut comments: Vec<CommentView>) -> Vec<CommentNode> {
    comments.sort_by(|a, b| {
        a.comment
            .created_at
            .cmp(&b.comment.created_at)
            .then_with(|| a.comment.id.cmp(&b.comment.id))
    });

    let known: std::collections::HashSet<CommentId> =
        comments.iter().map(|view| view.comment.id).collect();
    let mut children: HashMap<CommentId, Vec<CommentView>> = HashMap::new();
    let mut roots = Vec::new();
    for view in comments {
        match view.comment.parent_id {
            Some(parent) if known.contains(&parent) && parent != view.comment.id => {
                children.entry(parent).or_default().push(view);
            }
            _ => roots.push(view),
        }
    }

    let mut forest = Vec::with_capacity(roots.len());
    let mut stack: Vec<OpenNode> = Vec::new();
    for root in roots {
        stack.push(OpenNode::new(root, &mut children));
        while let Some(top) = stack.last_mut() {
            if let Some(child) = top.pending.next() {
                let node = OpenNode::new(child, &mut children);
                stack.push(node);
                continue;
            }
            if let Some(done) = stack.pop() {
                let node = done.close();
                match stack.last_mut() {
                    Some(parent) => parent.replies.push(node),
                    None => forest.push(node),
                }
            }
        }
    }
    forest
}

/// Thread node whose replies are still being assembled. Threads are built
/// with an explicit stack so reply depth is bounded by the heap only.
struct OpenNode {
    view: CommentView,
    pending: std::vec::IntoIter<CommentView>,
    replies: Vec<CommentNode>,
}

impl OpenNode {
    fn new(view: CommentView, children: &mut HashMap<CommentId, Vec<CommentView>>) -> Self {
        let pending = children.remove(&view.comment.id).unwrap_or_default();
        Self {
            view,
            replies: Vec::with_capacity(pending.len()),
            pending: pending.into_iter(),
        }
    }

    fn close(self) -> CommentNode {
        CommentNode {
            comment: self.view,
            replies: self.replies,
        }
    }
}
