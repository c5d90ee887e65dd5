//! Domain types for the forum.
//!
//! This module provides:
//! - Domain primitives: TimeMs, PostId
//! - The Post entity with its derived page and display time
//! - Validated post input (NewPost)
//! - BBCode rendering for post content

pub mod bbcode;
pub mod post;
pub mod primitives;

pub use bbcode::Rendered;
pub use post::{page_of, NewPost, Post, ValidationError};
pub use primitives::{PostId, TimeMs};
