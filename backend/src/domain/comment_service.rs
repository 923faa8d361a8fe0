//! Comments and comment threads.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    CommentCommand, CommentQuery, CommentRepository, CreateComment, PostRepository,
    UserRepository,
};
use crate::domain::{
    CommentId, CommentNode, CommentView, Error, NewComment, PostId, build_comment_thread,
};

/// Comment service implementing [`CommentCommand`] and [`CommentQuery`].
pub struct CommentService<C, P, U> {
    comments: Arc<C>,
    posts: Arc<P>,
    users: Arc<U>,
}

impl<C, P, U> CommentService<C, P, U> {
    /// Create a service over the given ports.
    pub fn new(comments: Arc<C>, posts: Arc<P>, users: Arc<U>) -> Self {
        Self {
            comments,
            posts,
            users,
        }
    }
}

impl<C, P, U> CommentService<C, P, U>
where
    C: CommentRepository,
    P: PostRepository,
    U: UserRepository,
{
    async fn require_post(&self, post_id: &PostId) -> Result<(), Error> {
        match self.posts.find_by_id(post_id).await? {
            Some(_) => Ok(()),
            None => Err(Error::not_found(format!("post {post_id} does not exist"))),
        }
    }

    async fn check_parent(&self, parent_id: &CommentId, post_id: &PostId) -> Result<(), Error> {
        let parent = self
            .comments
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("comment {parent_id} does not exist")))?;
        if parent.post_id != *post_id {
            return Err(Error::invalid_request(
                "parent comment belongs to a different post",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl<C, P, U> CommentCommand for CommentService<C, P, U>
where
    C: CommentRepository,
    P: PostRepository,
    U: UserRepository,
{
    async fn create_comment(&self, request: CreateComment) -> Result<CommentView, Error> {
        self.require_post(&request.post_id).await?;
        if let Some(parent_id) = &request.parent_id {
            self.check_parent(parent_id, &request.post_id).await?;
        }
        let user = self
            .users
            .find_by_id(&request.user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {} does not exist", request.user_id)))?;

        let comment = self
            .comments
            .create(&NewComment {
                id: CommentId::random(),
                post_id: request.post_id,
                user_id: request.user_id,
                parent_id: request.parent_id,
                content: request.content,
            })
            .await?;
        debug!(comment_id = %comment.id, post_id = %comment.post_id, "stored comment");
        Ok(CommentView {
            comment,
            username: user.username,
        })
    }
}

#[async_trait]
impl<C, P, U> CommentQuery for CommentService<C, P, U>
where
    C: CommentRepository,
    P: PostRepository,
    U: UserRepository,
{
    async fn comment_thread(&self, post_id: &PostId) -> Result<Vec<CommentNode>, Error> {
        self.require_post(post_id).await?;
        let comments = self.comments.list_for_post(post_id).await?;
        Ok(build_comment_thread(comments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockCommentRepository, MockPostRepository, MockUserRepository};
    use crate::domain::{
        Comment, Email, ErrorCode, Password, PasswordDigest, Post, Role, User, UserId, Username,
    };
    use chrono::Utc;
    use rstest::rstest;

    fn post(id: PostId) -> Post {
        let now = Utc::now();
        Post {
            id,
            author_id: UserId::random(),
            image_url: None,
            content: "post".to_owned(),
            created_at: now,
            updated_at: now,
        }
    }

    fn comment_on(post_id: PostId) -> Comment {
        Comment {
            id: CommentId::random(),
            post_id,
            user_id: UserId::random(),
            parent_id: None,
            content: "first".to_owned(),
            created_at: Utc::now(),
        }
    }

    fn user(id: UserId) -> User {
        let now = Utc::now();
        User {
            id,
            username: Username::new("grace").expect("valid username"),
            email: Email::new("grace@example.com").expect("valid email"),
            password_digest: PasswordDigest::derive("grace@example.com", &Password::new("pw")),
            age: None,
            address_id: None,
            role: Role::Normal,
            created_at: now,
            updated_at: now,
        }
    }

    fn request(post_id: PostId, parent_id: Option<CommentId>) -> CreateComment {
        CreateComment {
            post_id,
            user_id: UserId::random(),
            content: "reply".to_owned(),
            parent_id,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_comments_on_unknown_posts() {
        let mut posts = MockPostRepository::new();
        posts.expect_find_by_id().return_once(|_| Ok(None));
        let mut comments = MockCommentRepository::new();
        comments.expect_create().never();
        let service = CommentService::new(
            Arc::new(comments),
            Arc::new(posts),
            Arc::new(MockUserRepository::new()),
        );

        let err = service
            .create_comment(request(PostId::random(), None))
            .await
            .expect_err("unknown post");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_parents_from_other_posts() {
        let post_id = PostId::random();
        let mut posts = MockPostRepository::new();
        posts
            .expect_find_by_id()
            .return_once(move |id| Ok(Some(post(*id))));
        let mut comments = MockCommentRepository::new();
        comments
            .expect_find_by_id()
            .return_once(|_| Ok(Some(comment_on(PostId::random()))));
        comments.expect_create().never();
        let service = CommentService::new(
            Arc::new(comments),
            Arc::new(posts),
            Arc::new(MockUserRepository::new()),
        );

        let err = service
            .create_comment(request(post_id, Some(CommentId::random())))
            .await
            .expect_err("parent on another post");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn stores_replies_with_the_commenter_name() {
        let post_id = PostId::random();
        let parent = comment_on(post_id);
        let parent_id = parent.id;
        let mut posts = MockPostRepository::new();
        posts
            .expect_find_by_id()
            .return_once(move |id| Ok(Some(post(*id))));
        let mut comments = MockCommentRepository::new();
        comments
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(parent)));
        comments
            .expect_create()
            .withf(move |new| new.parent_id == Some(parent_id))
            .return_once(|new| {
                Ok(Comment {
                    id: new.id,
                    post_id: new.post_id,
                    user_id: new.user_id,
                    parent_id: new.parent_id,
                    content: new.content.clone(),
                    created_at: Utc::now(),
                })
            });
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(user(*id))));
        let service = CommentService::new(Arc::new(comments), Arc::new(posts), Arc::new(users));

        let view = service
            .create_comment(request(post_id, Some(parent_id)))
            .await
            .expect("reply stored");
        assert_eq!(view.username.as_ref(), "grace");
        assert_eq!(view.comment.parent_id, Some(parent_id));
    }

    #[rstest]
    #[tokio::test]
    async fn thread_requires_existing_post() {
        let mut posts = MockPostRepository::new();
        posts.expect_find_by_id().return_once(|_| Ok(None));
        let mut comments = MockCommentRepository::new();
        comments.expect_list_for_post().never();
        let service = CommentService::new(
            Arc::new(comments),
            Arc::new(posts),
            Arc::new(MockUserRepository::new()),
        );

        let err = service
            .comment_thread(&PostId::random())
            .await
            .expect_err("unknown post");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
