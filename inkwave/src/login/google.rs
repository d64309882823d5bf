// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::OAUTH_STATE_COOKIE;
use super::types::{CallbackQuery, LoginError, LogoutResponse};
use crate::api::ApiError;
use crate::app_state::AppState;
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header::LOCATION;
use actix_web::{HttpRequest, HttpResponse, web};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use openssl::rand::rand_bytes;

const STATE_BYTES: usize = 24;
const STATE_MAX_AGE_MINUTES: i64 = 10;

fn generate_state() -> Result<String, ApiError> {
    let mut bytes = [0u8; STATE_BYTES];
    rand_bytes(&mut bytes)
        .map_err(|e| ApiError::internal("Error starting login", e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn state_cookie<'a>(value: String, secure: bool) -> Cookie<'a> {
    Cookie::build(OAUTH_STATE_COOKIE, value)
        .path("/api/auth")
        .secure(secure)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::minutes(STATE_MAX_AGE_MINUTES))
        .finish()
}

fn clear_state_cookie<'a>(secure: bool) -> Cookie<'a> {
    Cookie::build(OAUTH_STATE_COOKIE, "")
        .path("/api/auth")
        .secure(secure)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(0))
        .finish()
}

fn redirect(location: &str) -> actix_web::HttpResponseBuilder {
    let mut builder = HttpResponse::Found();
    builder.insert_header((LOCATION, location.to_string()));
    builder
}

/// GET /api/auth/google
pub async fn begin_login(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let oauth_state = generate_state()?;
    let location = state.identity_provider.authorization_url(&oauth_state);
    Ok(redirect(&location)
        .cookie(state_cookie(oauth_state, state.jwt_service.secure_cookies()))
        .finish())
}

fn check_callback(req: &HttpRequest, query: &CallbackQuery) -> Result<String, LoginError> {
    if let Some(error) = &query.error {
        return Err(LoginError::ProviderDenied(error.clone()));
    }
    let expected = req.cookie(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    match (&expected, &query.state) {
        (Some(expected), Some(actual)) if !expected.is_empty() && expected == actual => {}
        _ => return Err(LoginError::StateMismatch),
    }
    query
        .code
        .as_ref()
        .filter(|code| !code.is_empty())
        .cloned()
        .ok_or(LoginError::MissingCode)
}

/// GET /api/auth/google/callback
///
/// New users land on the profile setup page, returning users on the feed.
/// Any failure sends the browser back to the client root without a session.
pub async fn complete_login(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let secure = state.jwt_service.secure_cookies();
    let client = state.config.client.origin().to_string();
    let failure = |reason: String| {
        log::warn!("Google login failed: {}", reason);
        redirect(&format!("{}/", client))
            .cookie(clear_state_cookie(secure))
            .finish()
    };

    let code = match check_callback(&req, &query) {
        Ok(code) => code,
        Err(err) => return failure(err.to_string()),
    };

    let profile = match state.identity_provider.exchange_code(&code).await {
        Ok(profile) => profile,
        Err(err) => return failure(err.to_string()),
    };

    let (user, created) = match state.blog.upsert_oauth_user(profile).await {
        Ok(result) => result,
        Err(err) => return failure(err.to_string()),
    };

    let token = match state.jwt_service.create_token(&user) {
        Ok(token) => token,
        Err(err) => return failure(err.to_string()),
    };

    log::info!("User {} signed in (new: {})", user.id, created);
    let target = if created {
        format!("{}/setup", client)
    } else {
        format!("{}/", client)
    };
    redirect(&target)
        .cookie(state.jwt_service.create_auth_cookie(&token))
        .cookie(clear_state_cookie(secure))
        .finish()
}

/// GET /api/auth/logout
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(state.jwt_service.create_logout_cookie())
        .json(LogoutResponse {
            message: "Logged out".to_string(),
        })
}
