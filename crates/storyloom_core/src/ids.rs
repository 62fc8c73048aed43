//! Identifier types for story records.
//!
//! Identifiers are opaque strings. Fresh ones are UUIDv7, which sort by
//! creation time; identifiers loaded from older documents (millisecond
//! timestamps) are accepted as-is.

use serde::{Deserialize, Serialize};

macro_rules! story_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
            derive_more::Display,
            derive_more::From,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh, time-ordered identifier.
            pub fn generate() -> Self {
                Self(uuid::Uuid::now_v7().to_string())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

story_id!(
    /// Identifies a story segment within a book.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyloom_core::SegmentId;
    ///
    /// let a = SegmentId::generate();
    /// let b = SegmentId::generate();
    /// assert_ne!(a, b);
    /// assert_eq!(SegmentId::from("1712000000000").as_str(), "1712000000000");
    /// ```
    SegmentId
);

story_id!(
    /// Identifies a segment summary within a book.
    SummaryId
);

story_id!(
    /// Identifies a chapter within a book.
    ChapterId
);
