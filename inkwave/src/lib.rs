// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod api;
pub mod app_state;
pub mod bootstrap;
pub mod config;
pub mod headers;
pub mod iam;
pub mod login;
pub mod posts;
pub mod runtime_paths;
pub mod security;
pub mod store;
pub mod util;

use actix_web::web;

/// Every HTTP route the server exposes: the auth handshake and the REST API.
pub fn routes(cfg: &mut web::ServiceConfig) {
    login::configure(cfg);
    api::configure(cfg);
}
