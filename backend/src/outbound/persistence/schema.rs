//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/sql/schema.sql`. Keep both in step
//! when a column changes; `diesel print-schema` against a live database
//! regenerates this file.

diesel::table! {
    /// Reference list of cities. Names are unique.
    cities (id) {
        id -> Uuid,
        name -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Street addresses attached to user accounts.
    addresses (id) {
        id -> Uuid,
        city_id -> Uuid,
        street -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// User accounts. `email` is unique; `role` is `normal` or `admin`.
    users (id) {
        id -> Uuid,
        username -> Text,
        email -> Text,
        password_digest -> Text,
        age -> Nullable<Int4>,
        address_id -> Nullable<Uuid>,
        role -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Posts written by users.
    posts (id) {
        id -> Uuid,
        author_id -> Uuid,
        image_url -> Nullable<Text>,
        content -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tags. Names are unique.
    tags (id) {
        id -> Uuid,
        name -> Text,
    }
}

diesel::table! {
    /// Post to tag links.
    post_tags (post_id, tag_id) {
        post_id -> Uuid,
        tag_id -> Uuid,
    }
}

diesel::table! {
    /// One row per user who liked a post.
    post_likes (post_id, user_id) {
        post_id -> Uuid,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Comments; `parent_id` points at the comment being replied to.
    comments (id) {
        id -> Uuid,
        post_id -> Uuid,
        user_id -> Uuid,
        parent_id -> Nullable<Uuid>,
        content -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(addresses -> cities (city_id));
diesel::joinable!(users -> addresses (address_id));
diesel::joinable!(posts -> users (author_id));
diesel::joinable!(post_tags -> posts (post_id));
diesel::joinable!(post_tags -> tags (tag_id));
diesel::joinable!(post_likes -> posts (post_id));
diesel::joinable!(comments -> posts (post_id));
diesel::joinable!(comments -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    addresses, cities, comments, post_likes, post_tags, posts, tags, users,
);
