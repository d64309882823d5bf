// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::ValidatedConfig;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use actix_web::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_METHOD,
    CACHE_CONTROL, CONTENT_SECURITY_POLICY, HeaderMap, HeaderName, HeaderValue, ORIGIN, PRAGMA,
    STRICT_TRANSPORT_SECURITY, VARY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
};
use actix_web::{Error, HttpResponse};
use futures_util::future::{Ready, ok};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

const API_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";
const API_CONTENT_SECURITY_POLICY: &str = "default-src 'none'; frame-ancestors 'none'";
const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";
const CORS_MAX_AGE_SECONDS: &str = "600";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";

/// Security headers on every response, plus CORS for the configured client
/// origin (credentials allowed so the session cookie travels with API calls).
/// CORS preflight requests are answered here with 204.
pub struct Headers {
    config: Arc<ValidatedConfig>,
}

impl Headers {
    pub fn new(config: Arc<ValidatedConfig>) -> Self {
        Headers { config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Headers
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = HeadersMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(HeadersMiddleware {
            service: Arc::new(service),
            config: self.config.clone(),
        })
    }
}

pub struct HeadersMiddleware<S> {
    service: Arc<S>,
    config: Arc<ValidatedConfig>,
}

impl<S, B> Service<ServiceRequest> for HeadersMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(
        &self,
        cx: &mut core::task::Context<'_>,
    ) -> core::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let allowed_origin = allowed_origin(req.headers(), &self.config);
        let is_preflight = req.method() == Method::OPTIONS
            && req.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD);
        let is_development = self.config.is_development();

        if is_preflight {
            let (http_req, _payload) = req.into_parts();
            let mut res = ServiceResponse::new(http_req, HttpResponse::NoContent().finish());
            if let Some(origin) = &allowed_origin {
                apply_cors_headers(res.headers_mut(), origin);
                res.headers_mut().insert(
                    ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static(CORS_ALLOW_METHODS),
                );
                res.headers_mut().insert(
                    ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(CORS_ALLOW_HEADERS),
                );
                res.headers_mut().insert(
                    ACCESS_CONTROL_MAX_AGE,
                    HeaderValue::from_static(CORS_MAX_AGE_SECONDS),
                );
            } else {
                log::debug!("Preflight from disallowed origin ignored");
            }
            apply_security_headers(res.headers_mut(), is_development);
            return Box::pin(async move { Ok(res.map_into_right_body()) });
        }

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;

            if let Some(origin) = &allowed_origin {
                apply_cors_headers(res.headers_mut(), origin);
            }
            apply_security_headers(res.headers_mut(), is_development);

            Ok(res.map_into_left_body())
        })
    }
}

/// Echoes the request Origin only when it is the configured client origin.
fn allowed_origin(headers: &HeaderMap, config: &ValidatedConfig) -> Option<HeaderValue> {
    let origin = headers.get(ORIGIN)?;
    let origin_str = origin.to_str().ok()?;
    if origin_str.trim_end_matches('/') == config.client.origin() {
        Some(origin.clone())
    } else {
        None
    }
}

fn apply_cors_headers(headers: &mut HeaderMap, origin: &HeaderValue) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.append(VARY, HeaderValue::from_static("Origin"));
}

fn apply_security_headers(headers: &mut HeaderMap, is_development: bool) {
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "accelerometer=(), camera=(), geolocation=(), gyroscope=(), magnetometer=(), microphone=(), payment=(), usb=()",
        ),
    );
    headers.insert(
        CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(API_CONTENT_SECURITY_POLICY),
    );
    if is_development {
        headers.remove(STRICT_TRANSPORT_SECURITY);
    } else {
        headers.insert(STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS_VALUE));
    }
    // Redirects and JSON both carry per-user state.
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(API_CACHE_CONTROL));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::util::{TestConfigBuilder, test_config};
    use actix_web::{App, test, web};

    async fn handler() -> HttpResponse {
        HttpResponse::Ok().body("ok")
    }

    #[actix_web::test]
    async fn test_default_security_headers() {
        let app = test::init_service(
            App::new()
                .wrap(Headers::new(Arc::new(test_config())))
                .route("/api/posts", web::get().to(handler)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/posts").to_request();
        let resp = test::call_service(&app, req).await;
        let headers = resp.headers();
        assert_eq!(headers.get(X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert_eq!(headers.get(X_FRAME_OPTIONS).unwrap(), "DENY");
        assert_eq!(headers.get(CACHE_CONTROL).unwrap(), API_CACHE_CONTROL);
        assert_eq!(headers.get(STRICT_TRANSPORT_SECURITY).unwrap(), HSTS_VALUE);
        assert!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[actix_web::test]
    async fn test_no_hsts_in_development() {
        let config = TestConfigBuilder::new()
            .with_environment(Environment::Development)
            .build();
        let app = test::init_service(
            App::new()
                .wrap(Headers::new(Arc::new(config)))
                .route("/", web::get().to(handler)),
        )
        .await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert!(resp.headers().get(STRICT_TRANSPORT_SECURITY).is_none());
    }

    #[actix_web::test]
    async fn test_cors_for_client_origin() {
        let app = test::init_service(
            App::new()
                .wrap(Headers::new(Arc::new(test_config())))
                .route("/api/posts", web::get().to(handler)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/posts")
            .insert_header((ORIGIN, "http://localhost:5173"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            resp.headers().get(ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );

        let req = test::TestRequest::get()
            .uri("/api/posts")
            .insert_header((ORIGIN, "https://evil.example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[actix_web::test]
    async fn test_preflight_short_circuits() {
        let app = test::init_service(
            App::new()
                .wrap(Headers::new(Arc::new(test_config())))
                .route("/api/posts", web::post().to(handler)),
        )
        .await;

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/posts")
            .insert_header((ORIGIN, "http://localhost:5173"))
            .insert_header((ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NO_CONTENT);
        let methods = resp
            .headers()
            .get(ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(methods.contains("DELETE"));
        assert_eq!(
            resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
    }
}
