// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{Claims, JwtError};
use crate::config::ValidatedConfig;
use crate::store::User;
use actix_web::cookie::time::{Duration as CookieDuration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

/// Issues and verifies HS256 session tokens and builds the cookies carrying them.
pub struct JwtService {
    secret: String,
    issuer: String,
    audience: String,
    expiration_hours: u64,
    cookie_name: String,
    secure_cookies: bool,
}

impl JwtService {
    pub fn new(config: &ValidatedConfig) -> Result<Self, JwtError> {
        let jwt_config = &config.jwt;
        if jwt_config.secret.trim().is_empty() {
            return Err(JwtError::ConfigurationError(
                "JWT secret must not be empty".to_string(),
            ));
        }

        Ok(JwtService {
            secret: jwt_config.secret.clone(),
            issuer: jwt_config.issuer.clone(),
            audience: jwt_config.audience.clone(),
            expiration_hours: jwt_config.expiration_hours,
            cookie_name: jwt_config.cookie_name.clone(),
            // Browsers drop Secure cookies on plain-http development origins.
            secure_cookies: !config.is_development(),
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    /// Create a JWT token for a user
    pub fn create_token(&self, user: &User) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::hours(self.expiration_hours as i64);

        let claims = Claims {
            sub: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| JwtError::TokenCreationError(e.to_string()))
    }

    /// Verify a JWT token and return claims. Tokens without a subject are rejected.
    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map_err(|e| JwtError::TokenVerificationError(e.to_string()))?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(JwtError::TokenVerificationError(
                "Invalid token format".to_string(),
            ));
        }

        Ok(token_data.claims)
    }

    /// HTTP-only, SameSite=Lax cookie carrying the session token.
    pub fn create_auth_cookie<'a>(&self, token: &str) -> Cookie<'a> {
        let expiration = Utc::now() + Duration::hours(self.expiration_hours as i64);

        let expires = match OffsetDateTime::from_unix_timestamp(expiration.timestamp()) {
            Ok(val) => val,
            Err(e) => {
                log::error!(
                    "Failed to convert expiration timestamp for auth cookie: {}",
                    e
                );
                OffsetDateTime::UNIX_EPOCH
            }
        };

        Cookie::build(self.cookie_name.clone(), token.to_string())
            .path("/")
            .secure(self.secure_cookies)
            .http_only(true)
            .same_site(SameSite::Lax)
            .expires(expires)
            .finish()
    }

    /// Create a cookie for logout (removes the JWT)
    pub fn create_logout_cookie<'a>(&self) -> Cookie<'a> {
        Cookie::build(self.cookie_name.clone(), "")
            .path("/")
            .secure(self.secure_cookies)
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::seconds(0))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::util::TestConfigBuilder;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: "user-1".to_string(),
            google_id: "g-1".to_string(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            profile_picture: String::new(),
            bio: String::new(),
            has_completed_profile: false,
            bookmarks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn service() -> JwtService {
        JwtService::new(&TestConfigBuilder::new().build()).expect("jwt service")
    }

    #[test]
    fn token_round_trip_carries_identity() {
        let service = service();
        let token = service.create_token(&sample_user()).expect("token");
        let claims = service.verify_token(&token).expect("claims");
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.name, "Test User");
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.exp - claims.iat, 168 * 3600);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = JwtService::new(&TestConfigBuilder::new().with_jwt_secret("other").build())
            .expect("jwt service");
        let token = other.create_token(&sample_user()).expect("token");
        assert!(matches!(
            service().verify_token(&token),
            Err(JwtError::TokenVerificationError(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = service();
        let now = Utc::now();
        let claims = Claims {
            sub: "user-1".to_string(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            iat: (now - Duration::hours(200)).timestamp(),
            exp: (now - Duration::hours(32)).timestamp(),
            iss: "inkwave".to_string(),
            aud: "inkwave-users".to_string(),
            jti: "jti".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test-secret".as_ref()),
        )
        .expect("encode");
        assert!(service.verify_token(&token).is_err());
    }

    #[test]
    fn expiry_follows_configured_hours() {
        let service =
            JwtService::new(&TestConfigBuilder::new().with_expiration_hours(2).build())
                .expect("jwt service");
        let token = service.create_token(&sample_user()).expect("token");
        let claims = service.verify_token(&token).expect("claims");
        assert_eq!(claims.exp - claims.iat, 2 * 3600);
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(service().verify_token("not-a-jwt").is_err());
    }

    #[test]
    fn cookies_follow_environment() {
        let production = service();
        let cookie = production.create_auth_cookie("abc");
        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));

        let development = JwtService::new(
            &TestConfigBuilder::new()
                .with_environment(Environment::Development)
                .build(),
        )
        .expect("jwt service");
        assert_eq!(development.create_auth_cookie("abc").secure(), Some(false));

        let logout = production.create_logout_cookie();
        assert_eq!(logout.value(), "");
        assert_eq!(logout.max_age(), Some(CookieDuration::seconds(0)));
    }
}
