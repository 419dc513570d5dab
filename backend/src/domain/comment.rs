//! Comment data model.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{DisplayName, UserId};

/// Minimum length of comment text when present.
pub const COMMENT_CONTENT_MIN: usize = 5;

/// Validation errors returned by comment constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentValidationError {
    RatingOutOfRange,
    ContentTooShort { min: usize },
    ContentInvalidCharacters,
}

impl fmt::Display for CommentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RatingOutOfRange => write!(f, "rating must be between 1 and 5"),
            Self::ContentTooShort { min } => {
                write!(f, "comment must be at least {min} characters")
            }
            Self::ContentInvalidCharacters => write!(
                f,
                "comment may only contain letters, digits, whitespace, and basic punctuation",
            ),
        }
    }
}

impl std::error::Error for CommentValidationError {}

/// Star rating between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct Rating(i16);

impl Rating {
    /// Validate and construct a [`Rating`].
    pub fn new(value: i16) -> Result<Self, CommentValidationError> {
        if !(1..=5).contains(&value) {
            return Err(CommentValidationError::RatingOutOfRange);
        }
        Ok(Self(value))
    }

    /// The rating value.
    pub fn value(self) -> i16 {
        self.0
    }
}

impl TryFrom<i16> for Rating {
    type Error = CommentValidationError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i16 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

static CONTENT_RE: OnceLock<Regex> = OnceLock::new();

fn content_regex() -> &'static Regex {
    CONTENT_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        let pattern = r#"^[A-Za-zÁÉÍÓÚáéíóúÑñÜü0-9\s.,:;()'"¡!¿?-]+$"#;
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("comment content regex failed to compile: {error}"))
    })
}

/// Optional free-text body of a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommentContent(String);

impl CommentContent {
    /// Validate and construct a [`CommentContent`] from owned input.
    pub fn new(content: impl Into<String>) -> Result<Self, CommentValidationError> {
        let content = content.into();
        let trimmed = content.trim();
        if trimmed.chars().count() < COMMENT_CONTENT_MIN {
            return Err(CommentValidationError::ContentTooShort {
                min: COMMENT_CONTENT_MIN,
            });
        }
        if !content_regex().is_match(trimmed) {
            return Err(CommentValidationError::ContentInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CommentContent {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<CommentContent> for String {
    fn from(value: CommentContent) -> Self {
        value.0
    }
}

impl TryFrom<String> for CommentContent {
    type Error = CommentValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A user's rating of a book, optionally with text.
///
/// At most one comment exists per `(user, book)` pair; the database enforces
/// this with a unique index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    id: Uuid,
    #[schema(value_type = String, format = "uuid")]
    user_id: UserId,
    book_id: Uuid,
    #[schema(value_type = i16, minimum = 1, maximum = 5)]
    rating: Rating,
    #[schema(value_type = Option<String>)]
    content: Option<CommentContent>,
    created_at: DateTime<Utc>,
}

impl Comment {
    /// Build a new comment created now.
    pub fn new(user_id: UserId, book_id: Uuid, rating: Rating, content: Option<CommentContent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            book_id,
            rating,
            content,
            created_at: Utc::now(),
        }
    }

    /// Rehydrate a comment from stored fields.
    pub fn from_parts(
        id: Uuid,
        user_id: UserId,
        book_id: Uuid,
        rating: Rating,
        content: Option<CommentContent>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            book_id,
            rating,
            content,
            created_at,
        }
    }

    /// Stable comment identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The commenting user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The commented book.
    pub fn book_id(&self) -> Uuid {
        self.book_id
    }

    /// Star rating.
    pub fn rating(&self) -> Rating {
        self.rating
    }

    /// Free-text body, when present.
    pub fn content(&self) -> Option<&CommentContent> {
        self.content.as_ref()
    }

    /// Record creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Comment joined with the author's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithAuthor {
    pub comment: Comment,
    #[schema(value_type = String)]
    pub author: DisplayName,
}
