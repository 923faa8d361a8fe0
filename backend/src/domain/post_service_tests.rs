//! Tests for the post service.

use std::sync::Arc;

use chrono::Utc;
use mockall::Sequence;
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    FixtureUnitOfWork, MockCommentRepository, MockPostRepository, MockTagRepository,
    MockUserRepository, TagPersistenceError,
};
use crate::domain::{Email, ErrorCode, Password, PasswordDigest, Role, Username};

type TestService = PostService<
    MockPostRepository,
    MockTagRepository,
    MockUserRepository,
    MockCommentRepository,
    FixtureUnitOfWork,
>;

struct Mocks {
    posts: MockPostRepository,
    tags: MockTagRepository,
    users: MockUserRepository,
    comments: MockCommentRepository,
}

#[fixture]
fn mocks() -> Mocks {
    Mocks {
        posts: MockPostRepository::new(),
        tags: MockTagRepository::new(),
        users: MockUserRepository::new(),
        comments: MockCommentRepository::new(),
    }
}

fn build(mocks: Mocks) -> (TestService, Arc<FixtureUnitOfWork>) {
    let uow = Arc::new(FixtureUnitOfWork::default());
    let service = PostService::new(
        Arc::new(mocks.posts),
        Arc::new(mocks.tags),
        Arc::new(mocks.users),
        Arc::new(mocks.comments),
        Arc::clone(&uow),
    );
    (service, uow)
}

fn author(id: UserId) -> User {
    let now = Utc::now();
    User {
        id,
        username: Username::new("ada").expect("valid username"),
        email: Email::new("ada@example.com").expect("valid email"),
        password_digest: PasswordDigest::derive("ada@example.com", &Password::new("pw")),
        age: None,
        address_id: None,
        role: Role::Normal,
        created_at: now,
        updated_at: now,
    }
}

fn post_from(new_post: &NewPost) -> Post {
    let now = Utc::now();
    Post {
        id: new_post.id,
        author_id: new_post.author_id,
        image_url: new_post.image_url.clone(),
        content: new_post.content.clone(),
        created_at: now,
        updated_at: now,
    }
}

fn stored_post(author_id: UserId) -> Post {
    post_from(&NewPost {
        id: PostId::random(),
        author_id,
        image_url: None,
        content: "hello".to_owned(),
    })
}

fn tag(name: &str) -> Tag {
    Tag {
        id: TagId::random(),
        name: name.to_owned(),
    }
}

#[rstest]
#[tokio::test]
async fn create_if_not_exist_only_inserts_missing_tags(mut mocks: Mocks) {
    let mut seq = Sequence::new();
    let existing = tag("rust");
    mocks
        .tags
        .expect_find_by_names()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_| Ok(vec![existing]));
    mocks
        .tags
        .expect_create_all()
        .withf(|tags| tags.len() == 1 && tags.first().map(|t| t.name.as_str()) == Some("async"))
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(()));
    mocks
        .tags
        .expect_find_by_names()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(vec![tag("rust"), tag("async")]));

    let (service, uow) = build(mocks);
    let tags = service
        .create_if_not_exist(&TagNames::from_raw(["async", "rust"]))
        .await
        .expect("tags resolved");

    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["async", "rust"]);
    assert_eq!(uow.runs(), 1);
}

#[rstest]
#[tokio::test]
async fn create_if_not_exist_returns_rows_stored_by_a_concurrent_writer(mut mocks: Mocks) {
    let mut seq = Sequence::new();
    let winner = tag("rust");
    let winner_id = winner.id;
    mocks
        .tags
        .expect_find_by_names()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(Vec::new()));
    mocks
        .tags
        .expect_create_all()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(()));
    mocks
        .tags
        .expect_find_by_names()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_| Ok(vec![winner]));

    let (service, _) = build(mocks);
    let tags = service
        .create_if_not_exist(&TagNames::from_raw(["rust"]))
        .await
        .expect("tags resolved");

    let ids: Vec<TagId> = tags.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![winner_id]);
}

#[rstest]
#[tokio::test]
async fn create_if_not_exist_skips_storage_for_empty_input(mut mocks: Mocks) {
    mocks.tags.expect_find_by_names().never();
    let (service, uow) = build(mocks);

    let tags = service
        .create_if_not_exist(&TagNames::default())
        .await
        .expect("no tags");
    assert!(tags.is_empty());
    assert_eq!(uow.runs(), 0);
}

#[rstest]
#[tokio::test]
async fn create_post_links_tags_inside_one_outer_unit_of_work(mut mocks: Mocks) {
    let author_id = UserId::random();
    mocks
        .users
        .expect_find_by_id()
        .with(eq(author_id))
        .return_once(move |id| Ok(Some(author(*id))));
    let mut seq = Sequence::new();
    mocks
        .tags
        .expect_find_by_names()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(Vec::new()));
    mocks
        .tags
        .expect_create_all()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(()));
    mocks
        .tags
        .expect_find_by_names()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(vec![tag("async"), tag("rust")]));
    mocks
        .posts
        .expect_create()
        .times(1)
        .returning(|new_post| Ok(post_from(new_post)));
    mocks
        .posts
        .expect_attach_tags()
        .withf(|_, tag_ids| tag_ids.len() == 2)
        .times(1)
        .return_once(|_, _| Ok(()));

    let (service, uow) = build(mocks);
    let summary = service
        .create_post(PublishPost {
            author_id,
            content: "hello".to_owned(),
            image_url: None,
            tags: TagNames::from_raw(["rust", "async"]),
        })
        .await
        .expect("post published");

    assert_eq!(summary.post.author_id, author_id);
    assert_eq!(summary.author_username.as_ref(), "ada");
    assert_eq!(summary.tags.len(), 2);
    assert_eq!(summary.like_count, 0);
    // outer post transaction plus the nested tag transaction
    assert_eq!(uow.runs(), 2);
}

#[rstest]
#[tokio::test]
async fn create_post_propagates_tag_failures_without_inserting(mut mocks: Mocks) {
    mocks
        .users
        .expect_find_by_id()
        .returning(|id| Ok(Some(author(*id))));
    mocks
        .tags
        .expect_find_by_names()
        .return_once(|_| Err(TagPersistenceError::query("boom")));
    mocks.posts.expect_create().never();

    let (service, _) = build(mocks);
    let err = service
        .create_post(PublishPost {
            author_id: UserId::random(),
            content: "hello".to_owned(),
            image_url: None,
            tags: TagNames::from_raw(["rust"]),
        })
        .await
        .expect_err("tag lookup fails");
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn create_post_requires_known_author(mut mocks: Mocks) {
    mocks.users.expect_find_by_id().return_once(|_| Ok(None));
    mocks.posts.expect_create().never();

    let (service, uow) = build(mocks);
    let err = service
        .create_post(PublishPost {
            author_id: UserId::random(),
            content: "hello".to_owned(),
            image_url: None,
            tags: TagNames::default(),
        })
        .await
        .expect_err("unknown author");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(uow.runs(), 0);
}

#[rstest]
#[case::first_like(true, 1)]
#[case::repeated_like(false, 1)]
#[tokio::test]
async fn like_post_is_idempotent(
    mut mocks: Mocks,
    #[case] newly_liked: bool,
    #[case] like_count: u64,
) {
    let post = stored_post(UserId::random());
    let post_id = post.id;
    mocks
        .posts
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(post)));
    mocks
        .posts
        .expect_add_like()
        .return_once(move |_, _| Ok(newly_liked));
    mocks
        .posts
        .expect_like_count()
        .return_once(move |_| Ok(like_count));

    let (service, _) = build(mocks);
    let outcome = service
        .like_post(&post_id, &UserId::random())
        .await
        .expect("like recorded");
    assert_eq!(
        outcome,
        LikeOutcome {
            newly_liked,
            like_count
        }
    );
}

#[rstest]
#[tokio::test]
async fn like_post_rejects_unknown_post(mut mocks: Mocks) {
    mocks.posts.expect_find_by_id().return_once(|_| Ok(None));
    mocks.posts.expect_add_like().never();

    let (service, _) = build(mocks);
    let err = service
        .like_post(&PostId::random(), &UserId::random())
        .await
        .expect_err("unknown post");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn delete_post_is_limited_to_the_author(mut mocks: Mocks) {
    let post = stored_post(UserId::random());
    let post_id = post.id;
    mocks
        .posts
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(post)));
    mocks.comments.expect_delete_for_post().never();
    mocks.posts.expect_delete().never();

    let (service, _) = build(mocks);
    let err = service
        .delete_post(&post_id, &UserId::random())
        .await
        .expect_err("not the author");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn delete_post_removes_comments_before_the_post(mut mocks: Mocks) {
    let author_id = UserId::random();
    let post = stored_post(author_id);
    let post_id = post.id;
    let mut sequence = mockall::Sequence::new();
    mocks
        .posts
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(post)));
    mocks
        .comments
        .expect_delete_for_post()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_| Ok(3));
    mocks
        .posts
        .expect_delete()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_| Ok(true));

    let (service, uow) = build(mocks);
    service
        .delete_post(&post_id, &author_id)
        .await
        .expect("post deleted");
    assert_eq!(uow.runs(), 1);
}

#[rstest]
#[tokio::test]
async fn posts_by_author_requires_known_author(mut mocks: Mocks) {
    mocks.users.expect_find_by_id().return_once(|_| Ok(None));
    mocks.posts.expect_list_by_author().never();

    let (service, _) = build(mocks);
    let pagination = Pagination::new(0, 10).expect("valid pagination");
    let err = service
        .posts_by_author(&UserId::random(), pagination)
        .await
        .expect_err("unknown author");
    assert_eq!(err.code(), ErrorCode::NotFound);
}
