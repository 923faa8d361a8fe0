//! Strongly typed UUID identifiers for persisted entities.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raised when an identifier string is not a valid UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} id must be a valid UUID")]
pub struct InvalidId {
    entity: &'static str,
}

impl InvalidId {
    /// Name of the entity whose identifier failed to parse.
    pub fn entity(&self) -> &'static str {
        self.entity
    }
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident => $entity:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse an identifier from its hyphenated string form.
            pub fn parse(raw: &str) -> Result<Self, InvalidId> {
                Uuid::parse_str(raw.trim())
                    .map(Self)
                    .map_err(|_| InvalidId { entity: $entity })
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Identifier of a registered user.
    UserId => "user"
);
define_id!(
    /// Identifier of a city in the reference data.
    CityId => "city"
);
define_id!(
    /// Identifier of a postal address.
    AddressId => "address"
);
define_id!(
    /// Identifier of a post.
    PostId => "post"
);
define_id!(
    /// Identifier of a tag.
    TagId => "tag"
);
define_id!(
    /// Identifier of a comment.
    CommentId => "comment"
);
