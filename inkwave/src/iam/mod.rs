// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod jwt;
pub mod middleware;
mod types;

pub use jwt::{Claims, JwtError, JwtService};
pub use middleware::{AuthRequest, JwtAuthMiddlewareFactory};
pub use types::{Requester, TokenRejection};
