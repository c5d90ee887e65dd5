use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Deserialize;

use crate::domain::{bbcode, Rendered, ValidationError};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub content: Option<String>,
}

/// `POST /preview`: render BBCode without storing anything.
pub async fn preview(
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<Json<Rendered>, AppError> {
    let Json(request) = payload?;
    let content = request
        .content
        .ok_or(ValidationError::Missing { field: "content" })?;
    Ok(Json(bbcode::render(&content)))
}
