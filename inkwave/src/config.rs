// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

fn default_environment() -> Environment {
    Environment::Production
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub auth: AuthConfig,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub jwt: JwtConfig,
    pub google: GoogleConfig,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
}

impl ValidatedConfig {
    pub fn is_development(&self) -> bool {
        self.app.environment == Environment::Development
    }

    pub fn is_localhost_client(&self) -> bool {
        let origin = self.client.origin();
        origin.starts_with("http://localhost") || origin.starts_with("http://127.0.0.1")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    4
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub name: String,
    pub description: String,
    #[serde(default = "default_environment")]
    pub environment: Environment,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
    pub google: GoogleConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_jwt_issuer")]
    pub issuer: String,
    #[serde(default = "default_jwt_audience")]
    pub audience: String,
    #[serde(default = "default_jwt_expiration_hours")]
    pub expiration_hours: u64,
    #[serde(default = "default_jwt_cookie_name")]
    pub cookie_name: String,
}

fn default_jwt_issuer() -> String {
    "inkwave".to_string()
}

fn default_jwt_audience() -> String {
    "inkwave-users".to_string()
}

fn default_jwt_expiration_hours() -> u64 {
    24 * 7
}

fn default_jwt_cookie_name() -> String {
    "token".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    #[serde(default = "default_google_scope")]
    pub scope: String,
    #[serde(default = "default_google_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_google_token_url")]
    pub token_url: String,
    #[serde(default = "default_google_userinfo_url")]
    pub userinfo_url: String,
}

fn default_google_scope() -> String {
    "openid email profile".to_string()
}

fn default_google_authorize_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_google_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_google_userinfo_url() -> String {
    "https://openidconnect.googleapis.com/v1/userinfo".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClientConfig {
    pub url: String,
}

impl ClientConfig {
    /// Client URL without a trailing slash, as sent in the Origin header.
    pub fn origin(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_file_name")]
    pub file_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            file_name: default_storage_file_name(),
        }
    }
}

fn default_storage_file_name() -> String {
    "inkwave.json".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// 366 days.
const MAX_JWT_EXPIRATION_HOURS: u64 = 24 * 366;

impl Config {
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join("config.yaml");
        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Self::parse(&config_content).map_err(|e| match e {
            ConfigError::LoadError(msg) => ConfigError::LoadError(format!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// Loads and validates configuration at startup. If validation fails, the application should not start.
    pub fn load_and_validate(root: &Path) -> Result<ValidatedConfig, ConfigError> {
        Self::load(root)?.validate()
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let jwt = self.auth.jwt;
        if jwt.secret.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.jwt.secret must not be empty".to_string(),
            ));
        }
        if !(1..=MAX_JWT_EXPIRATION_HOURS).contains(&jwt.expiration_hours) {
            return Err(ConfigError::ValidationError(format!(
                "auth.jwt.expiration_hours must be between 1 and {}, got: {}",
                MAX_JWT_EXPIRATION_HOURS, jwt.expiration_hours
            )));
        }
        if jwt.cookie_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.jwt.cookie_name must not be empty".to_string(),
            ));
        }

        let google = self.auth.google;
        for (label, value) in [
            ("client_id", &google.client_id),
            ("client_secret", &google.client_secret),
            ("callback_url", &google.callback_url),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "auth.google.{} must not be empty",
                    label
                )));
            }
        }

        if !self.client.url.starts_with("http://") && !self.client.url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "client.url must be an http(s) URL, got: {}",
                self.client.url
            )));
        }

        Self::validate_logging(&self.logging)?;

        let file_name = self.storage.file_name.trim();
        if file_name.is_empty() || file_name.contains('/') || file_name.contains('\\') {
            return Err(ConfigError::ValidationError(format!(
                "storage.file_name must be a plain file name, got: {}",
                self.storage.file_name
            )));
        }

        if self.server.workers == 0 {
            return Err(ConfigError::ValidationError(
                "server.workers must be at least 1".to_string(),
            ));
        }

        Ok(ValidatedConfig {
            server: self.server,
            app: self.app,
            jwt,
            google,
            client: self.client,
            logging: self.logging,
            storage: self.storage,
        })
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let level = logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {}, got: {}",
                LOG_LEVELS.join(", "),
                logging.level
            )));
        }
        Ok(())
    }
}
