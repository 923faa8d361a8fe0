//! Posts, tags, and the list views built from them.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::{PostId, TagId, UserId, Username};

/// Tag attached to posts. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// Normalised, de-duplicated tag names from user input.
///
/// Names are trimmed; blanks are dropped; the first spelling of a repeated
/// name wins and input order is kept.
///
/// # Examples
/// ```
/// use social_backend::domain::TagNames;
///
/// let names = TagNames::from_raw(["rust", " rust ", "", "async"]);
/// assert_eq!(names.as_slice(), ["rust".to_owned(), "async".to_owned()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagNames(Vec<String>);

impl TagNames {
    /// Normalise raw tag names.
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = BTreeSet::new();
        let names = raw
            .into_iter()
            .filter_map(|name| {
                let trimmed = name.as_ref().trim();
                (!trimmed.is_empty() && seen.insert(trimmed.to_owned())).then(|| trimmed.to_owned())
            })
            .collect();
        Self(names)
    }

    /// Names in input order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// True when no usable names were supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names not covered by `existing`, preserving order.
    pub fn missing_from<'a>(&'a self, existing: &[Tag]) -> Vec<&'a str> {
        self.0
            .iter()
            .filter(|name| !existing.iter().any(|tag| &tag.name == *name))
            .map(String::as_str)
            .collect()
    }
}

/// Stored post.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub image_url: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values required to insert a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub id: PostId,
    pub author_id: UserId,
    pub image_url: Option<String>,
    pub content: String,
}

/// Request to publish a post with tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPost {
    pub author_id: UserId,
    pub content: String,
    pub image_url: Option<String>,
    pub tags: TagNames,
}

/// Post enriched for list views.
#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    pub post: Post,
    pub author_username: Username,
    pub tags: Vec<Tag>,
    pub like_count: u64,
}

/// Case-insensitive search terms; a post matches when any term does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keywords(Vec<String>);

impl Keywords {
    /// Split a comma separated query value into trimmed, non-empty terms.
    ///
    /// # Examples
    /// ```
    /// use social_backend::domain::Keywords;
    ///
    /// let keywords = Keywords::parse("rust, ,async");
    /// assert_eq!(keywords.terms(), ["rust".to_owned(), "async".to_owned()]);
    /// ```
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    /// Individual terms.
    pub fn terms(&self) -> &[String] {
        &self.0
    }

    /// True when no terms were supplied; every post matches.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
