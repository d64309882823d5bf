// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::AUTHORIZATION;
use actix_web::web::Data;
use actix_web::{HttpMessage, HttpRequest};
use std::future::{Ready, ready};
use std::pin::Pin;
use std::rc::Rc;

use super::types::{Requester, TokenRejection};
use crate::app_state::AppState;

/// Trait to add authentication methods to HttpRequest
pub trait AuthRequest {
    fn requester(&self) -> Option<Requester>;
    fn token_rejection(&self) -> Option<TokenRejection>;
}

impl AuthRequest for HttpRequest {
    fn requester(&self) -> Option<Requester> {
        self.extensions().get::<Requester>().cloned()
    }

    fn token_rejection(&self) -> Option<TokenRejection> {
        self.extensions().get::<TokenRejection>().cloned()
    }
}

/// Session cookie first, then `Authorization: Bearer <token>`.
fn extract_token(req: &ServiceRequest, cookie_name: &str) -> Option<String> {
    if let Some(cookie) = req.cookie(cookie_name)
        && !cookie.value().is_empty()
    {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

// JWT Authentication Middleware
//
// Never rejects a request itself: a verified token attaches `Requester`, a
// bad one attaches `TokenRejection`. Handlers decide whether
// authentication is required.
pub struct JwtAuthMiddlewareFactory;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(app_state) = req.app_data::<Data<AppState>>().cloned() {
            let jwt_service = &app_state.jwt_service;
            if let Some(token) = extract_token(&req, jwt_service.cookie_name()) {
                match jwt_service.verify_token(&token) {
                    Ok(claims) => {
                        log::debug!("Authenticated request for user {}", claims.sub);
                        req.extensions_mut().insert(Requester::from(&claims));
                    }
                    Err(err) => {
                        log::warn!("Rejected session token on {}: {}", req.path(), err);
                        req.extensions_mut().insert(TokenRejection {
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::AppState;
    use crate::store::{BlogData, MemoryBlogStore, User};
    use crate::util::TestConfigBuilder;
    use actix_web::cookie::Cookie;
    use actix_web::{App, HttpResponse, test, web};
    use chrono::Utc;
    use std::sync::Arc;

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match (req.requester(), req.token_rejection()) {
            (Some(requester), _) => HttpResponse::Ok().body(requester.id),
            (None, Some(_)) => HttpResponse::Ok().body("rejected"),
            (None, None) => HttpResponse::Ok().body("anonymous"),
        }
    }

    fn user() -> User {
        let now = Utc::now();
        User {
            id: "user-1".to_string(),
            google_id: "g-1".to_string(),
            name: "Test".to_string(),
            email: "t@example.com".to_string(),
            profile_picture: String::new(),
            bio: String::new(),
            has_completed_profile: false,
            bookmarks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    async fn state() -> Data<AppState> {
        let config = Arc::new(TestConfigBuilder::new().build());
        let store = Arc::new(MemoryBlogStore::new(BlogData::default()));
        Data::new(AppState::for_tests(config, store).expect("state"))
    }

    #[actix_web::test]
    async fn cookie_and_bearer_tokens_authenticate() {
        let state = state().await;
        let token = state.jwt_service.create_token(&user()).expect("token");
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .wrap(JwtAuthMiddlewareFactory)
                .route("/", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new("token", token.clone()))
            .to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "user-1");

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "user-1");
    }

    #[actix_web::test]
    async fn missing_and_invalid_tokens_are_distinguished() {
        let state = state().await;
        let app = test::init_service(
            App::new()
                .app_data(state)
                .wrap(JwtAuthMiddlewareFactory)
                .route("/", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "anonymous");

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((AUTHORIZATION, "Bearer garbage"))
            .to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "rejected");
    }
}
