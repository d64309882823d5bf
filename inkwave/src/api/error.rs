// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::app_state::AppState;
use crate::store::StoreError;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{Error, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};
use std::pin::Pin;
use std::rc::Rc;

/// Failure of an API handler, rendered as `{"message": ...}` with the
/// matching status. The optional detail is only exposed in development.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Validation {
        message: String,
        detail: Option<String>,
    },
    Unauthorized {
        message: String,
        detail: Option<String>,
    },
    Forbidden {
        message: String,
    },
    NotFound {
        message: String,
    },
    Internal {
        message: String,
        detail: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiError {
    pub fn validation(message: &str, detail: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.to_string(),
            detail: Some(detail.into()),
        }
    }

    /// Input rejected by field validation; the message is shown as is.
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            detail: None,
        }
    }

    pub fn unauthorized(message: &str, detail: Option<String>) -> Self {
        ApiError::Unauthorized {
            message: message.to_string(),
            detail,
        }
    }

    pub fn forbidden(message: &str) -> Self {
        ApiError::Forbidden {
            message: message.to_string(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        ApiError::NotFound {
            message: message.to_string(),
        }
    }

    pub fn internal(message: &str, detail: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.to_string(),
            detail: detail.into(),
        }
    }

    /// Maps a store failure, using `context` as the message for internal errors.
    pub fn from_store(context: &str, err: StoreError) -> Self {
        match err {
            StoreError::UserNotFound(_) => ApiError::not_found("User not found"),
            StoreError::PostNotFound(_) => ApiError::not_found("Post not found"),
            StoreError::NotOwner(_) => ApiError::forbidden("Unauthorized"),
            StoreError::Conflict(msg) => ApiError::validation(context, msg),
            other => {
                log::error!("{}: {}", context, other);
                ApiError::internal(context, other.to_string())
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation { message, .. }
            | ApiError::Unauthorized { message, .. }
            | ApiError::Forbidden { message }
            | ApiError::NotFound { message }
            | ApiError::Internal { message, .. } => message,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Validation { detail, .. } | ApiError::Unauthorized { detail, .. } => {
                detail.as_deref()
            }
            ApiError::Internal { detail, .. } => Some(detail.as_str()),
            ApiError::Forbidden { .. } | ApiError::NotFound { .. } => None,
        }
    }

    fn body(&self, with_detail: bool) -> ErrorBody {
        ErrorBody {
            message: self.message().to_string(),
            error: if with_detail {
                self.detail().map(str::to_string)
            } else {
                None
            },
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::from_store("Internal server error", err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "{}: {}", self.message(), detail),
            None => write!(f, "{}", self.message()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body(false))
    }
}

// Error detail middleware
//
// In development, re-renders `ApiError` responses with the `error` detail
// field. Other environments pass responses through untouched.
pub struct ErrorDetailMiddlewareFactory;

impl<S, B> Transform<S, ServiceRequest> for ErrorDetailMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorDetailMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorDetailMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct ErrorDetailMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ErrorDetailMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let is_development = req
            .app_data::<Data<AppState>>()
            .map(|state| state.config.is_development())
            .unwrap_or(false);
        let service = self.service.clone();

        Box::pin(async move {
            let res = service.call(req).await?;
            if !is_development {
                return Ok(res.map_into_left_body());
            }

            let detailed = res
                .response()
                .error()
                .and_then(|err| err.as_error::<ApiError>())
                .filter(|api_error| api_error.detail().is_some())
                .cloned();

            match detailed {
                Some(api_error) => {
                    let (http_req, _) = res.into_parts();
                    let response = HttpResponse::build(api_error.status_code())
                        .json(api_error.body(true));
                    Ok(ServiceResponse::new(http_req, response).map_into_right_body())
                }
                None => Ok(res.map_into_left_body()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert_eq!(
            ApiError::validation("Missing required fields", "x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthorized("No token", None).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::forbidden("Unauthorized").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::not_found("Post not found").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::internal("Error fetching posts", "boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_errors_map_to_api_errors() {
        assert_eq!(
            ApiError::from_store("x", StoreError::PostNotFound("p".into())),
            ApiError::not_found("Post not found")
        );
        assert_eq!(
            ApiError::from_store("x", StoreError::NotOwner("p".into())),
            ApiError::forbidden("Unauthorized")
        );
        assert!(matches!(
            ApiError::from_store("Error saving", StoreError::FileError("disk".into())),
            ApiError::Internal { .. }
        ));
    }

    #[test]
    fn default_body_omits_detail() {
        let body = ApiError::internal("Error fetching posts", "boom").body(false);
        let json = serde_json::to_value(&body).expect("json");
        assert_eq!(json, serde_json::json!({"message": "Error fetching posts"}));
    }
}
