// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::web;

mod google;
mod provider;
pub mod types;

pub use provider::{GoogleIdentityProvider, IdentityProvider};
pub use types::LoginError;

pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// Configure `/api/auth` routes: Google sign-in, its callback and logout.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/google", web::get().to(google::begin_login))
            .route("/google/callback", web::get().to(google::complete_login))
            .route("/logout", web::get().to(google::logout)),
    );
}
