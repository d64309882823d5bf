// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::jwt::Claims;

/// Identity of an authenticated caller, taken from a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&Claims> for Requester {
    fn from(claims: &Claims) -> Self {
        Requester {
            id: claims.sub.clone(),
            name: claims.name.clone(),
            email: claims.email.clone(),
        }
    }
}

/// Recorded when a request carried a token that failed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRejection {
    pub reason: String,
}
