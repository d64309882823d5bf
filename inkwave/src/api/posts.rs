// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{
    MessageResponse, PostDetailResponse, PostPatchRequest, PostRequest, SearchQuery,
    SearchResponse,
};
use super::{ApiError, require_requester};
use crate::app_state::AppState;
use crate::iam::AuthRequest;
use crate::posts::{aggregate_posts, comment_response, post_response, search_posts};
use crate::security::{
    MAX_CONTENT_CHARS, MAX_TITLE_CHARS, validate_optional_url, validate_required_text,
    validate_text_limit,
};
use crate::store::{PostChanges, PostDraft, StoreError};
use actix_web::{HttpRequest, HttpResponse, web};

fn required_fields(
    title: Option<&str>,
    content: Option<&str>,
) -> Result<(String, String), ApiError> {
    let title = title.map(str::trim).unwrap_or_default();
    let content = content.map(str::trim).unwrap_or_default();
    if title.is_empty() || content.is_empty() {
        return Err(ApiError::validation(
            "Missing required fields",
            "Title and content are required",
        ));
    }
    validate_text_limit("Title", title, MAX_TITLE_CHARS).map_err(ApiError::invalid)?;
    validate_text_limit("Content", content, MAX_CONTENT_CHARS).map_err(ApiError::invalid)?;
    Ok((title.to_string(), content.to_string()))
}

fn checked_image(image: Option<String>) -> Result<Option<String>, ApiError> {
    if let Some(image) = &image {
        validate_optional_url("Image", image).map_err(ApiError::invalid)?;
    }
    Ok(image)
}

/// GET /api/posts
pub async fn list_posts(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let requester = req.requester();
    let posts = state
        .blog
        .read(|data| {
            aggregate_posts(
                data.posts_newest_first(),
                data,
                requester.as_ref().map(|r| r.id.as_str()),
            )
        })
        .map_err(|e| ApiError::from_store("Error fetching posts", e))?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/search?q=
pub async fn search(
    query: web::Query<SearchQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    log::debug!("Searching posts for '{}'", query.q);
    let results: SearchResponse = state
        .blog
        .read(|data| {
            search_posts(data.posts_newest_first(), &query.q)
                .into_iter()
                .map(|post| post_response(post, data))
                .collect()
        })
        .map_err(|e| ApiError::from_store("Error searching posts", e))?;
    Ok(HttpResponse::Ok().json(results))
}

/// POST /api/posts
pub async fn create_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<PostRequest>,
) -> Result<HttpResponse, ApiError> {
    let requester = require_requester(&req)?;
    let body = body.into_inner();
    let (title, content) = required_fields(body.title.as_deref(), body.content.as_deref())?;
    let draft = PostDraft {
        title,
        content,
        tags: body.tags,
        image: checked_image(body.image)?,
    };

    let post = state
        .blog
        .create_post(&requester.id, draft)
        .await
        .map_err(|e| ApiError::from_store("Error creating post", e))?;
    let response = state
        .blog
        .read(|data| post_response(&post, data))
        .map_err(|e| ApiError::from_store("Error creating post", e))?;
    Ok(HttpResponse::Created().json(response))
}

/// GET /api/posts/{id}
pub async fn get_post(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let post_id = path.into_inner();
    let requester = req.requester();
    let detail = state
        .blog
        .read(|data| {
            let post = data.post(&post_id)?;
            let mut aggregated = aggregate_posts(
                [post],
                data,
                requester.as_ref().map(|r| r.id.as_str()),
            );
            let comments = data
                .comments_for(&post_id)
                .into_iter()
                .map(|comment| comment_response(comment, data))
                .collect();
            aggregated.pop().map(|post| PostDetailResponse { post, comments })
        })
        .map_err(|e| ApiError::from_store("Error fetching post", e))?;

    match detail {
        Some(detail) => Ok(HttpResponse::Ok().json(detail)),
        None => Err(ApiError::not_found("Post not found")),
    }
}

/// Missing posts and other authors' posts are refused before the body is looked at.
fn ensure_editable(state: &AppState, post_id: &str, requester_id: &str) -> Result<(), ApiError> {
    let post = state
        .blog
        .get_post(post_id)
        .map_err(|e| ApiError::from_store("Error updating post", e))?
        .ok_or_else(|| StoreError::PostNotFound(post_id.to_string()))?;
    if post.author != requester_id {
        return Err(StoreError::NotOwner(post_id.to_string()).into());
    }
    Ok(())
}

async fn save_changes(
    state: &AppState,
    post_id: &str,
    requester_id: &str,
    changes: PostChanges,
) -> Result<HttpResponse, ApiError> {
    let post = state
        .blog
        .update_post(post_id, requester_id, changes)
        .await
        .map_err(|e| ApiError::from_store("Error updating post", e))?;
    let response = state
        .blog
        .read(|data| post_response(&post, data))
        .map_err(|e| ApiError::from_store("Error updating post", e))?;
    Ok(HttpResponse::Ok().json(response))
}

/// PUT /api/posts/{id}
///
/// Replaces title, content, tags and image. Omitted tags or image are cleared.
pub async fn replace_post(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
    body: web::Json<PostRequest>,
) -> Result<HttpResponse, ApiError> {
    let requester = require_requester(&req)?;
    ensure_editable(&state, &path, &requester.id)?;
    let body = body.into_inner();
    let (title, content) = required_fields(body.title.as_deref(), body.content.as_deref())?;
    let changes = PostChanges {
        title: Some(title),
        content: Some(content),
        tags: Some(body.tags),
        image: Some(checked_image(body.image)?),
    };
    save_changes(&state, &path, &requester.id, changes).await
}

/// PATCH /api/posts/{id}
pub async fn patch_post(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
    body: web::Json<PostPatchRequest>,
) -> Result<HttpResponse, ApiError> {
    let requester = require_requester(&req)?;
    ensure_editable(&state, &path, &requester.id)?;
    let body = body.into_inner();
    let title = body
        .title
        .map(|title| validate_required_text("Title", &title, MAX_TITLE_CHARS))
        .transpose()
        .map_err(ApiError::invalid)?;
    let content = body
        .content
        .map(|content| validate_required_text("Content", &content, MAX_CONTENT_CHARS))
        .transpose()
        .map_err(ApiError::invalid)?;
    let image = match body.image {
        Some(image) => Some(checked_image(Some(image))?),
        None => None,
    };
    let changes = PostChanges {
        title,
        content,
        tags: body.tags,
        image,
    };
    save_changes(&state, &path, &requester.id, changes).await
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let requester = require_requester(&req)?;
    state
        .blog
        .delete_post(&path, &requester.id)
        .await
        .map_err(|e| ApiError::from_store("Error deleting post", e))?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Post deleted".to_string(),
    }))
}
