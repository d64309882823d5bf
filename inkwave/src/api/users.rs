// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{BookmarksResponse, ProfileRequest, ProfileResponse};
use super::{ApiError, require_requester};
use crate::app_state::AppState;
use crate::iam::AuthRequest;
use crate::posts::aggregate_posts;
use crate::security::{
    MAX_BIO_CHARS, validate_and_sanitize_user_name, validate_optional_url, validate_text_limit,
};
use crate::store::{Post, ProfileUpdate};
use actix_web::{HttpRequest, HttpResponse, web};

/// Profile of `user_id` with their posts, personalised for `viewer_id`.
fn profile(
    state: &AppState,
    user_id: &str,
    viewer_id: Option<&str>,
) -> Result<ProfileResponse, ApiError> {
    state
        .blog
        .read(|data| {
            let user = data.user(user_id)?.clone();
            let posts = aggregate_posts(data.posts_by_author(user_id), data, viewer_id);
            Some(ProfileResponse { user, posts })
        })
        .map_err(|e| ApiError::from_store("Error fetching profile", e))?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// GET /api/user/me
pub async fn my_profile(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let requester = require_requester(&req)?;
    let response = profile(&state, &requester.id, Some(requester.id.as_str()))?;
    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/user/{id}
pub async fn user_profile(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let viewer = req.requester();
    let response = profile(&state, &path, viewer.as_ref().map(|v| v.id.as_str()))?;
    Ok(HttpResponse::Ok().json(response))
}

fn profile_update(body: ProfileRequest) -> Result<ProfileUpdate, ApiError> {
    let name = body
        .name
        .map(|name| validate_and_sanitize_user_name(&name))
        .transpose()
        .map_err(ApiError::invalid)?;
    let profile_picture = match body.profile_picture {
        Some(picture) => {
            validate_optional_url("Profile picture", &picture).map_err(ApiError::invalid)?;
            Some(picture.trim().to_string())
        }
        None => None,
    };
    let bio = match body.bio {
        Some(bio) => {
            let bio = bio.trim().to_string();
            validate_text_limit("Bio", &bio, MAX_BIO_CHARS).map_err(ApiError::invalid)?;
            Some(bio)
        }
        None => None,
    };
    Ok(ProfileUpdate {
        name,
        profile_picture,
        bio,
    })
}

/// PUT /api/user/me
///
/// Responds with the updated user. The profile counts as complete once the
/// bio is non-empty.
pub async fn update_my_profile(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<ProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    let requester = require_requester(&req)?;
    let update = profile_update(body.into_inner())?;
    let user = state
        .blog
        .update_profile(&requester.id, update)
        .await
        .map_err(|e| ApiError::from_store("Error updating profile", e))?;
    Ok(HttpResponse::Ok().json(user))
}

/// GET /api/user/me/bookmarks
///
/// Bookmarked posts in bookmark order. Ids whose post is gone are skipped.
pub async fn my_bookmarks(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let requester = require_requester(&req)?;
    let bookmarks = state
        .blog
        .read(|data| {
            let user = data.user(&requester.id)?;
            let posts: Vec<&Post> = user
                .bookmarks
                .iter()
                .filter_map(|post_id| data.post(post_id))
                .collect();
            Some(aggregate_posts(posts, data, Some(requester.id.as_str())))
        })
        .map_err(|e| ApiError::from_store("Error fetching bookmarks", e))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(HttpResponse::Ok().json(bookmarks))
}

/// POST /api/user/bookmarks/{post_id}
pub async fn add_bookmark(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let requester = require_requester(&req)?;
    let bookmarks = state
        .blog
        .add_bookmark(&requester.id, &path)
        .await
        .map_err(|e| ApiError::from_store("Error bookmarking post", e))?;
    Ok(HttpResponse::Ok().json(BookmarksResponse { bookmarks }))
}

/// DELETE /api/user/bookmarks/{post_id}
pub async fn remove_bookmark(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let requester = require_requester(&req)?;
    let bookmarks = state
        .blog
        .remove_bookmark(&requester.id, &path)
        .await
        .map_err(|e| ApiError::from_store("Error removing bookmark", e))?;
    Ok(HttpResponse::Ok().json(BookmarksResponse { bookmarks }))
}
