// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod validation;

pub use validation::{
    MAX_BIO_CHARS, MAX_COMMENT_CHARS, MAX_CONTENT_CHARS, MAX_EMAIL_CHARS, MAX_NAME_CHARS,
    MAX_TITLE_CHARS, MAX_URL_CHARS, validate_and_sanitize_user_name, validate_email_field,
    validate_optional_url, validate_required_text, validate_text_limit,
};
