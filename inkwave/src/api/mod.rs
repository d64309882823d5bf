// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod comments;
mod error;
mod posts;
pub mod types;
mod users;

pub use error::{ApiError, ErrorBody, ErrorDetailMiddlewareFactory};

use crate::iam::{AuthRequest, Requester};
use actix_web::{HttpRequest, web};

/// Requester for endpoints that need a session. A request without a token
/// and one whose token failed verification get different messages.
pub fn require_requester(req: &HttpRequest) -> Result<Requester, ApiError> {
    if let Some(requester) = req.requester() {
        return Ok(requester);
    }
    match req.token_rejection() {
        Some(rejection) => Err(ApiError::unauthorized(
            "Token is not valid",
            Some(rejection.reason),
        )),
        None => Err(ApiError::unauthorized(
            "No token, authorization denied",
            None,
        )),
    }
}

fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    log::warn!("Rejected request body: {}", err);
    ApiError::validation("Invalid request body", err.to_string()).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(
            web::scope("/api/posts")
                .route("", web::get().to(posts::list_posts))
                .route("", web::post().to(posts::create_post))
                .route("/search", web::get().to(posts::search))
                .route("/{id}", web::get().to(posts::get_post))
                .route("/{id}", web::put().to(posts::replace_post))
                .route("/{id}", web::patch().to(posts::patch_post))
                .route("/{id}", web::delete().to(posts::delete_post))
                .route("/{id}/comments", web::get().to(comments::list_comments))
                .route("/{id}/comments", web::post().to(comments::add_comment))
                .route("/{id}/like", web::post().to(comments::like_post))
                .route("/{id}/like", web::delete().to(comments::unlike_post)),
        )
        .service(
            web::scope("/api/user")
                .route("/me", web::get().to(users::my_profile))
                .route("/me", web::put().to(users::update_my_profile))
                .route("/me/bookmarks", web::get().to(users::my_bookmarks))
                .route("/bookmarks/{post_id}", web::post().to(users::add_bookmark))
                .route(
                    "/bookmarks/{post_id}",
                    web::delete().to(users::remove_bookmark),
                )
                .route("/{id}", web::get().to(users::user_profile)),
        );
}
