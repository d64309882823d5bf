// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use crate::config::{
    AppConfig, ClientConfig, Environment, GoogleConfig, JwtConfig, LoggingConfig, ServerConfig,
    StorageConfig, ValidatedConfig,
};

#[derive(Debug, Clone)]
pub struct TestConfigBuilder {
    config: ValidatedConfig,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ValidatedConfig {
                server: ServerConfig {
                    host: "127.0.0.1".to_string(),
                    port: 5466,
                    workers: 1,
                },
                app: AppConfig {
                    name: "Test InkWave".to_string(),
                    description: "Test Description".to_string(),
                    environment: Environment::Production,
                },
                jwt: JwtConfig {
                    secret: "test-secret".to_string(),
                    issuer: "inkwave".to_string(),
                    audience: "inkwave-users".to_string(),
                    expiration_hours: 168,
                    cookie_name: "token".to_string(),
                },
                google: GoogleConfig {
                    client_id: "test-client-id".to_string(),
                    client_secret: "test-client-secret".to_string(),
                    callback_url: "http://localhost:5466/api/auth/google/callback".to_string(),
                    scope: "openid email profile".to_string(),
                    authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
                    token_url: "https://oauth2.googleapis.com/token".to_string(),
                    userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
                },
                client: ClientConfig {
                    url: "http://localhost:5173".to_string(),
                },
                logging: LoggingConfig {
                    level: "info".to_string(),
                },
                storage: StorageConfig::default(),
            },
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.config.app.environment = environment;
        self
    }

    pub fn with_client_url(mut self, url: &str) -> Self {
        self.config.client.url = url.to_string();
        self
    }

    pub fn with_jwt_secret(mut self, secret: &str) -> Self {
        self.config.jwt.secret = secret.to_string();
        self
    }

    pub fn with_expiration_hours(mut self, hours: u64) -> Self {
        self.config.jwt.expiration_hours = hours;
        self
    }

    pub fn build(self) -> ValidatedConfig {
        self.config
    }
}

pub fn test_config() -> ValidatedConfig {
    TestConfigBuilder::new().build()
}
