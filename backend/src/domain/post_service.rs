//! Posts, tags, and likes.
//!
//! Publishing a post touches three tables: missing tags are created, the
//! post row is inserted, and the post is linked to its tags. All three run
//! in one unit of work. Tag creation opens its own nested unit of work so it
//! stays atomic when called on its own.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{
    CommentRepository, LikeOutcome, PostCommand, PostQuery, PostRepository, TagRepository,
    UnitOfWork, UserRepository, in_transaction,
};
use crate::domain::{
    Error, Keywords, NewPost, Page, Pagination, Post, PostId, PostSummary, PublishPost, Tag,
    TagId, TagNames, User, UserId,
};

/// Post service implementing [`PostCommand`] and [`PostQuery`].
pub struct PostService<P, T, U, C, W> {
    posts: Arc<P>,
    tags: Arc<T>,
    users: Arc<U>,
    comments: Arc<C>,
    uow: Arc<W>,
}

impl<P, T, U, C, W> PostService<P, T, U, C, W> {
    /// Create a service over the given ports.
    pub fn new(
        posts: Arc<P>,
        tags: Arc<T>,
        users: Arc<U>,
        comments: Arc<C>,
        uow: Arc<W>,
    ) -> Self {
        Self {
            posts,
            tags,
            users,
            comments,
            uow,
        }
    }
}

impl<P, T, U, C, W> PostService<P, T, U, C, W>
where
    P: PostRepository,
    T: TagRepository,
    U: UserRepository,
    C: CommentRepository,
    W: UnitOfWork,
{
    /// Return the tags named in `names`, creating the ones that do not exist.
    ///
    /// The result follows the order of `names`.
    pub async fn create_if_not_exist(&self, names: &TagNames) -> Result<Vec<Tag>, Error> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        in_transaction(self.uow.as_ref(), || async move {
            let known = self.tags.find_by_names(names.as_slice()).await?;
            let created: Vec<Tag> = names
                .missing_from(&known)
                .into_iter()
                .map(|name| Tag {
                    id: TagId::random(),
                    name: name.to_owned(),
                })
                .collect();
            if created.is_empty() {
                return Ok(order_by_names(known, names));
            }
            debug!(count = created.len(), "creating tags");
            self.tags.create_all(&created).await?;
            // A concurrent request may have stored some of these names first;
            // its rows win, so read the identifiers back.
            let resolved = self.tags.find_by_names(names.as_slice()).await?;
            Ok(order_by_names(resolved, names))
        })
        .await
    }

    async fn require_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {user_id} does not exist")))
    }

    async fn require_post(&self, post_id: &PostId) -> Result<Post, Error> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("post {post_id} does not exist")))
    }
}

fn order_by_names(mut tags: Vec<Tag>, names: &TagNames) -> Vec<Tag> {
    tags.sort_by_key(|tag| {
        names
            .as_slice()
            .iter()
            .position(|name| name == &tag.name)
            .unwrap_or(usize::MAX)
    });
    tags
}

#[async_trait]
impl<P, T, U, C, W> PostCommand for PostService<P, T, U, C, W>
where
    P: PostRepository,
    T: TagRepository,
    U: UserRepository,
    C: CommentRepository,
    W: UnitOfWork,
{
    async fn create_post(&self, request: PublishPost) -> Result<PostSummary, Error> {
        let author = self.require_user(&request.author_id).await?;
        let PublishPost {
            author_id,
            content,
            image_url,
            tags,
        } = request;

        let summary = in_transaction(self.uow.as_ref(), || async move {
            let tags = self.create_if_not_exist(&tags).await?;
            let post = self
                .posts
                .create(&NewPost {
                    id: PostId::random(),
                    author_id,
                    image_url,
                    content,
                })
                .await?;
            let tag_ids: Vec<TagId> = tags.iter().map(|tag| tag.id).collect();
            if !tag_ids.is_empty() {
                self.posts.attach_tags(&post.id, &tag_ids).await?;
            }
            Ok(PostSummary {
                post,
                author_username: author.username,
                tags,
                like_count: 0,
            })
        })
        .await?;

        info!(post_id = %summary.post.id, author_id = %author_id, "published post");
        Ok(summary)
    }

    async fn like_post(&self, post_id: &PostId, user_id: &UserId) -> Result<LikeOutcome, Error> {
        self.require_post(post_id).await?;
        let newly_liked = self.posts.add_like(post_id, user_id).await?;
        let like_count = self.posts.like_count(post_id).await?;
        debug!(post_id = %post_id, user_id = %user_id, newly_liked, "recorded like");
        Ok(LikeOutcome {
            newly_liked,
            like_count,
        })
    }

    async fn delete_post(&self, post_id: &PostId, user_id: &UserId) -> Result<(), Error> {
        in_transaction(self.uow.as_ref(), || async move {
            let post = self.require_post(post_id).await?;
            if post.author_id != *user_id {
                return Err(Error::forbidden("only the author may delete a post"));
            }
            let removed_comments = self.comments.delete_for_post(post_id).await?;
            if !self.posts.delete(post_id).await? {
                return Err(Error::not_found(format!("post {post_id} does not exist")));
            }
            debug!(post_id = %post_id, removed_comments, "deleted post");
            Ok(())
        })
        .await?;
        info!(post_id = %post_id, "post removed by author");
        Ok(())
    }
}

#[async_trait]
impl<P, T, U, C, W> PostQuery for PostService<P, T, U, C, W>
where
    P: PostRepository,
    T: TagRepository,
    U: UserRepository,
    C: CommentRepository,
    W: UnitOfWork,
{
    async fn list_posts(
        &self,
        keywords: Keywords,
        pagination: Pagination,
    ) -> Result<Page<PostSummary>, Error> {
        Ok(self.posts.list(&keywords, pagination).await?)
    }

    async fn posts_by_author(
        &self,
        author_id: &UserId,
        pagination: Pagination,
    ) -> Result<Page<PostSummary>, Error> {
        self.require_user(author_id).await?;
        Ok(self.posts.list_by_author(author_id, pagination).await?)
    }
}

#[cfg(test)]
#[path = "post_service_tests.rs"]
mod tests;
