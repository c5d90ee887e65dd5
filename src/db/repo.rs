//! Repository layer for post storage.
//!
//! Every write runs inside its own transaction: begin, write, then commit on
//! success or roll back on failure. A post is either fully stored or absent.

use crate::domain::{NewPost, Post, PostId, TimeMs};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};
use thiserror::Error;
use tracing::{info, warn};

/// Storage failure.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A uniqueness rule rejected the write. Carries the engine's diagnostic.
    #[error("{0}")]
    ConstraintViolation(String),
    #[error("post {0} not found")]
    NotFound(PostId),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepoError {
    fn from_write(err: sqlx::Error) -> Self {
        match err.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                RepoError::ConstraintViolation(db_err.message().to_string())
            }
            _ => RepoError::Database(err),
        }
    }
}

/// Repository for post operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Insert a post, assigning its id and timestamp.
    ///
    /// # Errors
    /// Returns `ConstraintViolation` if another post already has the same content.
    pub async fn create_post(&self, new_post: &NewPost) -> Result<Post, RepoError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO posts (username, number, content, created_at_ms)
            VALUES (?, ?, ?, ?)
            RETURNING id, username, number, content, created_at_ms
            "#,
        )
        .bind(new_post.username())
        .bind(new_post.number())
        .bind(new_post.content())
        .bind(TimeMs::now().as_i64())
        .fetch_one(&mut *tx)
        .await;

        match inserted {
            Ok(row) => {
                tx.commit().await?;
                let post = post_from_row(&row);
                info!(id = %post.id, username = %post.username, "Created post");
                Ok(post)
            }
            Err(err) => {
                rollback(tx).await;
                let err = RepoError::from_write(err);
                if let RepoError::ConstraintViolation(ref msg) = err {
                    warn!(username = %new_post.username(), error = %msg, "Rejected duplicate post");
                }
                Err(err)
            }
        }
    }

    /// Fetch a single post by id.
    pub async fn get_post(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        let row = sqlx::query(
            "SELECT id, username, number, content, created_at_ms FROM posts WHERE id = ?",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(post_from_row))
    }

    /// Delete a post by id.
    ///
    /// # Errors
    /// Returns `NotFound` and leaves storage untouched if no post has this id.
    pub async fn delete_post(&self, id: PostId) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM posts WHERE id = ?")
            .bind(id.as_i64())
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            rollback(tx).await;
            return Err(RepoError::NotFound(id));
        }

        let deleted = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await;
        match deleted {
            Ok(_) => {
                tx.commit().await?;
                info!(id = %id, "Deleted post");
                Ok(())
            }
            Err(err) => {
                rollback(tx).await;
                Err(RepoError::Database(err))
            }
        }
    }

    /// All posts, newest first. Posts created in the same millisecond keep insert order.
    pub async fn list_posts(&self) -> Result<Vec<Post>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, number, content, created_at_ms
            FROM posts
            ORDER BY created_at_ms DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    pub async fn count_posts(&self) -> Result<i64, RepoError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}

/// Roll back after a failed write. A rollback failure is logged and dropped so
/// the caller still sees the error that caused it.
async fn rollback(tx: Transaction<'_, Sqlite>) {
    if let Err(err) = tx.rollback().await {
        warn!(error = %err, "Rollback failed");
    }
}

fn post_from_row(row: &SqliteRow) -> Post {
    Post {
        id: PostId::new(row.get("id")),
        username: row.get("username"),
        number: row.get("number"),
        content: row.get("content"),
        timestamp: TimeMs::new(row.get("created_at_ms")),
    }
}
