use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use maud::Markup;
use serde::{Deserialize, Serialize};

use crate::api::{pages, AppState};
use crate::domain::{NewPost, Post, PostId, ValidationError};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub username: Option<String>,
    pub number: Option<i64>,
    pub content: Option<String>,
}

impl CreatePostRequest {
    pub fn validate(self) -> Result<NewPost, ValidationError> {
        let username = self
            .username
            .ok_or(ValidationError::Missing { field: "username" })?;
        let number = self
            .number
            .ok_or(ValidationError::Missing { field: "number" })?;
        let content = self
            .content
            .ok_or(ValidationError::Missing { field: "content" })?;
        NewPost::new(username, number, content)
    }
}

/// Unknown fields (e.g. the page script's `accessCode`) are ignored.
#[derive(Debug, Deserialize)]
pub struct DeletePostRequest {
    pub id: Option<i64>,
}

impl DeletePostRequest {
    pub fn validate(self) -> Result<PostId, ValidationError> {
        self.id
            .map(PostId::new)
            .ok_or(ValidationError::Missing { field: "id" })
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    fn success() -> Json<Self> {
        Json(MessageResponse { message: "success" })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: i64,
    pub username: String,
    pub number: i64,
    pub page: i64,
    pub content: String,
    pub timestamp: String,
    pub formatted_time: String,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        PostDto {
            id: post.id.as_i64(),
            page: post.page(),
            formatted_time: post.format_time(),
            timestamp: post.timestamp.to_datetime().to_rfc3339(),
            username: post.username,
            number: post.number,
            content: post.content,
        }
    }
}

/// `GET /`: the rendered list of posts, newest first.
pub async fn index(State(state): State<AppState>) -> Result<Markup, AppError> {
    let posts = state.repo.list_posts().await?;
    Ok(pages::render_index(&posts))
}

/// `GET /posts`: the same list as JSON.
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostDto>>, AppError> {
    let posts = state.repo.list_posts().await?;
    Ok(Json(posts.into_iter().map(PostDto::from).collect()))
}

/// `POST /create`
pub async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(request) = payload?;
    let new_post = request.validate()?;

    state.repo.create_post(&new_post).await?;
    Ok(MessageResponse::success())
}

/// `POST /delete`. No ownership check: any caller may delete any post.
pub async fn delete_post(
    State(state): State<AppState>,
    payload: Result<Json<DeletePostRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(request) = payload?;
    let id = request.validate()?;

    state.repo.delete_post(id).await?;
    Ok(MessageResponse::success())
}
