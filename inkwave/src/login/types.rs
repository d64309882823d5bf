// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
}

/// Subset of the OpenID Connect userinfo document we rely on.
#[derive(Debug, Deserialize)]
pub(crate) struct UserInfo {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    StateMismatch,
    ProviderDenied(String),
    MissingCode,
    Exchange(String),
    InvalidProfile(String),
}

impl std::fmt::Display for LoginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoginError::StateMismatch => write!(f, "OAuth state mismatch"),
            LoginError::ProviderDenied(reason) => write!(f, "Provider denied login: {}", reason),
            LoginError::MissingCode => write!(f, "Callback is missing the authorization code"),
            LoginError::Exchange(msg) => write!(f, "Token exchange failed: {}", msg),
            LoginError::InvalidProfile(msg) => write!(f, "Invalid provider profile: {}", msg),
        }
    }
}

impl std::error::Error for LoginError {}
