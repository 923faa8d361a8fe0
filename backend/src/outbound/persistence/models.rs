//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types live next
//! to the rows so repositories stay focused on queries.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Address, AddressId, City, CityId, Comment, CommentId, Email, NewComment, NewPost, NewUser,
    PasswordDigest, Post, PostId, Role, Tag, TagId, User, UserId, Username,
};

use super::schema::{addresses, cities, comments, post_likes, post_tags, posts, tags, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_digest: String,
    pub age: Option<i32>,
    pub address_id: Option<Uuid>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_digest: String,
    pub age: Option<i32>,
    pub address_id: Option<Uuid>,
    pub role: String,
}

impl From<&NewUser> for NewUserRow {
    fn from(user: &NewUser) -> Self {
        Self {
            id: *user.id.as_uuid(),
            username: user.username.as_ref().to_owned(),
            email: user.email.as_ref().to_owned(),
            password_digest: user.password_digest.as_str().to_owned(),
            age: user.age,
            address_id: user.address_id.map(|id| *id.as_uuid()),
            role: user.role.as_str().to_owned(),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            username: Username::new(&row.username).map_err(|err| err.to_string())?,
            email: Email::new(&row.email).map_err(|err| err.to_string())?,
            password_digest: PasswordDigest::from_stored(row.password_digest),
            age: row.age,
            address_id: row.address_id.map(AddressId::from_uuid),
            role: Role::parse(&row.role).map_err(|err| err.to_string())?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CityRow {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cities)]
pub(crate) struct NewCityRow {
    pub id: Uuid,
    pub name: String,
}

impl From<CityRow> for City {
    fn from(row: CityRow) -> Self {
        Self {
            id: CityId::from_uuid(row.id),
            name: row.name,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = addresses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AddressRow {
    pub id: Uuid,
    pub city_id: Uuid,
    pub street: String,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::from_uuid(row.id),
            city_id: CityId::from_uuid(row.city_id),
            street: row.street,
        }
    }
}

impl From<&Address> for AddressRow {
    fn from(address: &Address) -> Self {
        Self {
            id: *address.id.as_uuid(),
            city_id: *address.city_id.as_uuid(),
            street: address.street.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TagRow {
    pub id: Uuid,
    pub name: String,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: TagId::from_uuid(row.id),
            name: row.name,
        }
    }
}

impl From<&Tag> for TagRow {
    fn from(tag: &Tag) -> Self {
        Self {
            id: *tag.id.as_uuid(),
            name: tag.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PostRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub image_url: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
pub(crate) struct NewPostRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub image_url: Option<String>,
    pub content: String,
}

impl From<&NewPost> for NewPostRow {
    fn from(post: &NewPost) -> Self {
        Self {
            id: *post.id.as_uuid(),
            author_id: *post.author_id.as_uuid(),
            image_url: post.image_url.clone(),
            content: post.content.clone(),
        }
    }
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: PostId::from_uuid(row.id),
            author_id: UserId::from_uuid(row.author_id),
            image_url: row.image_url,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = post_tags)]
pub(crate) struct PostTagRow {
    pub post_id: Uuid,
    pub tag_id: Uuid,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = post_likes)]
pub(crate) struct NewPostLikeRow {
    pub post_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
}

impl From<&NewComment> for NewCommentRow {
    fn from(comment: &NewComment) -> Self {
        Self {
            id: *comment.id.as_uuid(),
            post_id: *comment.post_id.as_uuid(),
            user_id: *comment.user_id.as_uuid(),
            parent_id: comment.parent_id.map(|id| *id.as_uuid()),
            content: comment.content.clone(),
        }
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: CommentId::from_uuid(row.id),
            post_id: PostId::from_uuid(row.post_id),
            user_id: UserId::from_uuid(row.user_id),
            parent_id: row.parent_id.map(CommentId::from_uuid),
            content: row.content,
            created_at: row.created_at,
        }
    }
}
