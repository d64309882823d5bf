// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use async_trait::async_trait;
use inkwave::api::ErrorDetailMiddlewareFactory;
use inkwave::app_state::AppState;
use inkwave::config::{Environment, ValidatedConfig};
use inkwave::headers::Headers;
use inkwave::iam::JwtAuthMiddlewareFactory;
use inkwave::login::{IdentityProvider, LoginError};
use inkwave::runtime_paths::RuntimePaths;
use inkwave::store::{FileBlogStore, OAuthProfile, User};
use inkwave::util::TestConfigBuilder;
use inkwave::util::test_fixtures::TestFixtureRoot;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const FAKE_AUTHORIZE_URL: &str = "https://accounts.test/o/oauth2/auth";

/// Identity provider that resolves authorization codes from a fixed table.
#[derive(Default)]
pub struct FakeIdentityProvider {
    profiles: Mutex<HashMap<String, OAuthProfile>>,
}

impl FakeIdentityProvider {
    pub fn register(&self, code: &str, profile: OAuthProfile) {
        if let Ok(mut profiles) = self.profiles.lock() {
            profiles.insert(code.to_string(), profile);
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn authorization_url(&self, state: &str) -> String {
        format!("{}?state={}", FAKE_AUTHORIZE_URL, state)
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthProfile, LoginError> {
        self.profiles
            .lock()
            .map_err(|_| LoginError::Exchange("profile table poisoned".to_string()))?
            .get(code)
            .cloned()
            .ok_or_else(|| LoginError::Exchange(format!("unknown code {}", code)))
    }
}

pub struct AuthSession {
    pub user: User,
    pub token: String,
    pub cookie: Cookie<'static>,
}

pub struct TestHarness {
    pub fixture: TestFixtureRoot,
    pub config: Arc<ValidatedConfig>,
    pub runtime_paths: RuntimePaths,
    pub app_state: web::Data<AppState>,
    pub provider: Arc<FakeIdentityProvider>,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_config(TestConfigBuilder::new().build()).await
    }

    pub async fn development() -> Self {
        Self::with_config(
            TestConfigBuilder::new()
                .with_environment(Environment::Development)
                .build(),
        )
        .await
    }

    pub async fn with_config(config: ValidatedConfig) -> Self {
        let fixture = TestFixtureRoot::new_unique("inkwave-api").expect("fixture root");
        let config = Arc::new(config);
        let runtime_paths = fixture.runtime_paths(&config).expect("runtime paths");
        let provider = Arc::new(FakeIdentityProvider::default());
        let store =
            Arc::new(FileBlogStore::new(runtime_paths.store_file.clone()).expect("store"));
        let app_state = AppState::new(config.clone(), store, provider.clone()).expect("app state");

        Self {
            fixture,
            config,
            runtime_paths,
            app_state: web::Data::new(app_state),
            provider,
        }
    }

    /// Creates (or finds) the user for `subject` and signs a session for it.
    pub async fn sign_in(&self, subject: &str, name: &str) -> AuthSession {
        let profile = OAuthProfile {
            subject: subject.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", subject),
            picture: format!("https://images.example.com/{}.png", subject),
        };
        let (user, _) = self
            .app_state
            .blog
            .upsert_oauth_user(profile)
            .await
            .expect("upsert user");
        let token = self
            .app_state
            .jwt_service
            .create_token(&user)
            .expect("session token");
        let cookie = self
            .app_state
            .jwt_service
            .create_auth_cookie(&token)
            .into_owned();
        AuthSession {
            user,
            token,
            cookie,
        }
    }
}

pub fn build_test_app(
    harness: &TestHarness,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody + use<>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .app_data(harness.app_state.clone())
        .wrap(ErrorDetailMiddlewareFactory)
        .wrap(JwtAuthMiddlewareFactory)
        .wrap(Headers::new(harness.config.clone()))
        .configure(inkwave::routes)
}

pub fn with_session(req: test::TestRequest, session: &AuthSession) -> test::TestRequest {
    req.cookie(session.cookie.clone())
}

pub fn post_body(title: &str, content: &str, tags: Value) -> Value {
    serde_json::json!({
        "title": title,
        "content": content,
        "tags": tags,
    })
}

pub fn as_str<'a>(value: &'a Value, key: &str) -> &'a str {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("missing string field {} in {}", key, value))
}
