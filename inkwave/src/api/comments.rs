// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{CommentRequest, LikesResponse};
use super::{ApiError, require_requester};
use crate::app_state::AppState;
use crate::posts::{CommentResponse, comment_response};
use crate::security::{MAX_COMMENT_CHARS, validate_required_text};
use actix_web::{HttpRequest, HttpResponse, web};

/// GET /api/posts/{id}/comments
pub async fn list_comments(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let comments: Vec<CommentResponse> = state
        .blog
        .read(|data| {
            data.comments_for(&path)
                .into_iter()
                .map(|comment| comment_response(comment, data))
                .collect()
        })
        .map_err(|e| ApiError::from_store("Error fetching comments", e))?;
    Ok(HttpResponse::Ok().json(comments))
}

/// POST /api/posts/{id}/comments
pub async fn add_comment(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
    body: web::Json<CommentRequest>,
) -> Result<HttpResponse, ApiError> {
    let requester = require_requester(&req)?;
    let content = validate_required_text(
        "Comment content",
        body.content.as_deref().unwrap_or_default(),
        MAX_COMMENT_CHARS,
    )
    .map_err(ApiError::invalid)?;

    let comment = state
        .blog
        .add_comment(&path, &requester.id, &content)
        .await
        .map_err(|e| ApiError::from_store("Error adding comment", e))?;
    let response = state
        .blog
        .read(|data| comment_response(&comment, data))
        .map_err(|e| ApiError::from_store("Error adding comment", e))?;
    Ok(HttpResponse::Created().json(response))
}

/// POST /api/posts/{id}/like
pub async fn like_post(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let requester = require_requester(&req)?;
    let likes = state
        .blog
        .like_post(&path, &requester.id)
        .await
        .map_err(|e| ApiError::from_store("Error liking post", e))?;
    Ok(HttpResponse::Ok().json(LikesResponse { likes }))
}

/// DELETE /api/posts/{id}/like
pub async fn unlike_post(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let requester = require_requester(&req)?;
    let likes = state
        .blog
        .unlike_post(&path, &requester.id)
        .await
        .map_err(|e| ApiError::from_store("Error unliking post", e))?;
    Ok(HttpResponse::Ok().json(LikesResponse { likes }))
}
