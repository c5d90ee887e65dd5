//! Post entity and its validated construction input.

use crate::domain::{PostId, TimeMs};
use serde::Serialize;
use thiserror::Error;

/// Maximum username length in characters.
pub const USERNAME_MAX_LEN: usize = 100;

/// Display format for post timestamps, e.g. `Mar 05, 2024, 02:07 PM`.
const TIME_FORMAT: &str = "%b %d, %Y, %I:%M %p";

/// Page bucket for a post number: floor to the nearest multiple of ten.
pub fn page_of(number: i64) -> i64 {
    number.div_euclid(10) * 10
}

/// A persisted forum post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: PostId,
    pub username: String,
    pub number: i64,
    pub content: String,
    /// Creation time, assigned by the server at insert.
    pub timestamp: TimeMs,
}

impl Post {
    pub fn page(&self) -> i64 {
        page_of(self.number)
    }

    /// Timestamp formatted for display (UTC).
    pub fn format_time(&self) -> String {
        self.timestamp.to_datetime().format(TIME_FORMAT).to_string()
    }
}

/// Input validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {field}")]
    Missing { field: &'static str },
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// A post that passed validation and is ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    username: String,
    number: i64,
    content: String,
}

impl NewPost {
    pub fn new(username: String, number: i64, content: String) -> Result<Self, ValidationError> {
        if username.trim().is_empty() {
            return Err(ValidationError::Empty { field: "username" });
        }
        if username.chars().count() > USERNAME_MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "username",
                max: USERNAME_MAX_LEN,
            });
        }
        Ok(NewPost {
            username,
            number,
            content,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn number(&self) -> i64 {
        self.number
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(number: i64, ms: i64) -> Post {
        Post {
            id: PostId::new(1),
            username: "a".to_string(),
            number,
            content: "hi".to_string(),
            timestamp: TimeMs::new(ms),
        }
    }

    #[test]
    fn test_page_of_floors_to_tens() {
        assert_eq!(page_of(23), 20);
        assert_eq!(page_of(9), 0);
        assert_eq!(page_of(100), 100);
        assert_eq!(page_of(0), 0);
        assert_eq!(page_of(19), 10);
    }

    #[test]
    fn test_page_of_negative_uses_floor_division() {
        assert_eq!(page_of(-3), -10);
        assert_eq!(page_of(-10), -10);
        assert_eq!(page_of(-11), -20);
    }

    #[test]
    fn test_post_page() {
        assert_eq!(post(42, 0).page(), 40);
    }

    #[test]
    fn test_format_time() {
        // 2024-03-05T14:07:00Z
        let p = post(1, 1_709_647_620_000);
        assert_eq!(p.format_time(), "Mar 05, 2024, 02:07 PM");
    }

    #[test]
    fn test_format_time_morning() {
        // 2023-11-14T09:05:00Z
        let p = post(1, 1_699_952_700_000);
        assert_eq!(p.format_time(), "Nov 14, 2023, 09:05 AM");
    }

    #[test]
    fn test_new_post_accepts_valid_input() {
        let p = NewPost::new("alice".into(), 15, "hello".into()).unwrap();
        assert_eq!(p.username(), "alice");
        assert_eq!(p.number(), 15);
        assert_eq!(p.content(), "hello");
    }

    #[test]
    fn test_new_post_rejects_blank_username() {
        let err = NewPost::new("  ".into(), 1, "x".into()).unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "username" });
    }

    #[test]
    fn test_new_post_rejects_long_username() {
        let name = "x".repeat(USERNAME_MAX_LEN + 1);
        let err = NewPost::new(name, 1, "x".into()).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { field: "username", .. }));
    }

    #[test]
    fn test_new_post_allows_max_length_username() {
        let name = "é".repeat(USERNAME_MAX_LEN);
        assert!(NewPost::new(name, 1, "x".into()).is_ok());
    }
}
