// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::sync::Arc;

use crate::config::ValidatedConfig;
use crate::iam::{JwtError, JwtService};
use crate::login::IdentityProvider;
use crate::store::{BlogService, BlogStore, StoreError};

/// Shared services handed to every worker as `web::Data<AppState>`.
pub struct AppState {
    pub config: Arc<ValidatedConfig>,
    pub blog: BlogService,
    pub jwt_service: Arc<JwtService>,
    pub identity_provider: Arc<dyn IdentityProvider>,
}

#[derive(Debug)]
pub enum AppStateError {
    Store(StoreError),
    Jwt(JwtError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppStateError::Store(err) => write!(f, "Failed to open blog store: {}", err),
            AppStateError::Jwt(err) => write!(f, "Failed to set up session tokens: {}", err),
        }
    }
}

impl std::error::Error for AppStateError {}

impl From<StoreError> for AppStateError {
    fn from(err: StoreError) -> Self {
        AppStateError::Store(err)
    }
}

impl From<JwtError> for AppStateError {
    fn from(err: JwtError) -> Self {
        AppStateError::Jwt(err)
    }
}

impl AppState {
    /// Loads the store and starts the blog service. Must be called inside a
    /// Tokio runtime.
    pub fn new(
        config: Arc<ValidatedConfig>,
        store: Arc<dyn BlogStore>,
        identity_provider: Arc<dyn IdentityProvider>,
    ) -> Result<Self, AppStateError> {
        let jwt_service = Arc::new(JwtService::new(&config)?);
        let blog = BlogService::new(store)?;
        Ok(Self {
            config,
            blog,
            jwt_service,
            identity_provider,
        })
    }
}

#[cfg(test)]
impl AppState {
    pub fn for_tests(
        config: Arc<ValidatedConfig>,
        store: Arc<crate::store::MemoryBlogStore>,
    ) -> Result<Self, AppStateError> {
        Self::new(config, store, Arc::new(test_support::RejectingProvider))
    }
}
