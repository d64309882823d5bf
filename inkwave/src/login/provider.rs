// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{LoginError, TokenResponse, UserInfo};
use crate::config::GoogleConfig;
use crate::security::{validate_and_sanitize_user_name, validate_email_field};
use crate::store::OAuthProfile;
use async_trait::async_trait;
use reqwest::Client;

/// External identity provider used for sign-in. Built once at startup from
/// configuration and shared through the application state.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Where to send the browser to start a login carrying `state`.
    fn authorization_url(&self, state: &str) -> String;

    /// Trades an authorization code for the signed-in user's profile.
    async fn exchange_code(&self, code: &str) -> Result<OAuthProfile, LoginError>;
}

pub struct GoogleIdentityProvider {
    client: Client,
    config: GoogleConfig,
}

impl GoogleIdentityProvider {
    pub fn new(config: GoogleConfig) -> Result<Self, LoginError> {
        let client = Client::builder()
            .user_agent("inkwave-oauth")
            .build()
            .map_err(|e| LoginError::Exchange(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    async fn fetch_access_token(&self, code: &str) -> Result<String, LoginError> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.callback_url.as_str()),
            ("grant_type", "authorization_code"),
        ];
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| LoginError::Exchange(e.to_string()))?
            .error_for_status()
            .map_err(|e| LoginError::Exchange(e.to_string()))?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| LoginError::Exchange(format!("Malformed token response: {}", e)))?;
        Ok(token.access_token)
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<UserInfo, LoginError> {
        self.client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| LoginError::Exchange(e.to_string()))?
            .error_for_status()
            .map_err(|e| LoginError::Exchange(e.to_string()))?
            .json()
            .await
            .map_err(|e| LoginError::InvalidProfile(format!("Malformed userinfo: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
            self.config.authorize_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.callback_url),
            urlencoding::encode(&self.config.scope),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthProfile, LoginError> {
        let access_token = self.fetch_access_token(code).await?;
        let info = self.fetch_user_info(&access_token).await?;
        profile_from_user_info(info)
    }
}

/// Validates the provider's userinfo. An unusable display name falls back to
/// the local part of the email address.
pub(crate) fn profile_from_user_info(info: UserInfo) -> Result<OAuthProfile, LoginError> {
    if info.sub.trim().is_empty() {
        return Err(LoginError::InvalidProfile("missing subject".to_string()));
    }
    let email = info.email.unwrap_or_default().trim().to_string();
    validate_email_field(&email).map_err(LoginError::InvalidProfile)?;

    let local_part = email.split('@').next().unwrap_or_default().to_string();
    let name = info
        .name
        .as_deref()
        .and_then(|raw| validate_and_sanitize_user_name(raw).ok())
        .unwrap_or(local_part);

    Ok(OAuthProfile {
        subject: info.sub,
        name,
        email,
        picture: info.picture.unwrap_or_default(),
    })
}
