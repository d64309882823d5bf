// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use validator::ValidateEmail;

pub const MAX_EMAIL_CHARS: usize = 128;
pub const MAX_NAME_CHARS: usize = 256;
pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CONTENT_CHARS: usize = 100_000;
pub const MAX_COMMENT_CHARS: usize = 5_000;
pub const MAX_BIO_CHARS: usize = 1_000;
pub const MAX_URL_CHARS: usize = 2_048;

/// Validate user email input
pub fn validate_email_field(email: &str) -> Result<(), String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err("Email is required".to_string());
    }
    if trimmed.chars().count() > MAX_EMAIL_CHARS {
        return Err(format!(
            "Email must be at most {} characters",
            MAX_EMAIL_CHARS
        ));
    }
    if !trimmed.validate_email() {
        return Err("Email format is invalid".to_string());
    }
    Ok(())
}

/// Rejects missing or whitespace-only text and text longer than `max_chars`
/// after trimming. Returns the trimmed value.
pub fn validate_required_text(field: &str, value: &str, max_chars: usize) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} is required", field));
    }
    validate_text_limit(field, trimmed, max_chars)?;
    Ok(trimmed.to_string())
}

pub fn validate_text_limit(field: &str, value: &str, max_chars: usize) -> Result<(), String> {
    if value.chars().count() > max_chars {
        return Err(format!(
            "{} must be at most {} characters",
            field, max_chars
        ));
    }
    Ok(())
}

/// Image and avatar links: empty is allowed, anything else must be an
/// absolute http(s) URL without whitespace.
pub fn validate_optional_url(field: &str, value: &str) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    validate_text_limit(field, trimmed, MAX_URL_CHARS)?;
    let has_scheme = trimmed.starts_with("https://") || trimmed.starts_with("http://");
    if !has_scheme || trimmed.chars().any(char::is_whitespace) {
        return Err(format!("{} must be an http(s) URL", field));
    }
    Ok(())
}

/// Validate and sanitize user names for display safety
/// Allows letters, numbers, spaces, apostrophes, hyphens, and periods
/// Replaces invalid characters with spaces and collapses multiple spaces
/// Trims leading/trailing spaces and enforces length limits
pub fn validate_and_sanitize_user_name(name: &str) -> Result<String, String> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    // Replace invalid characters with spaces
    let sanitized = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '\'' || c == '-' || c == '.' {
                c
            } else {
                ' '
            }
        })
        .collect::<String>();

    // Collapse multiple consecutive spaces into single space
    let sanitized = sanitized
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ");

    // Check length after sanitization
    let sanitized_len = sanitized.chars().count();
    if !(2..=MAX_NAME_CHARS).contains(&sanitized_len) {
        return Err(format!(
            "Name must be between 2 and {} characters",
            MAX_NAME_CHARS
        ));
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required_text() {
        assert_eq!(
            validate_required_text("Title", "  Hello  ", MAX_TITLE_CHARS).unwrap(),
            "Hello"
        );
        assert_eq!(
            validate_required_text("Title", "   ", MAX_TITLE_CHARS).unwrap_err(),
            "Title is required"
        );
        assert!(validate_required_text("Title", &"x".repeat(MAX_TITLE_CHARS + 1), MAX_TITLE_CHARS).is_err());
        assert!(validate_required_text("Title", &"x".repeat(MAX_TITLE_CHARS), MAX_TITLE_CHARS).is_ok());
    }

    #[test]
    fn test_validate_optional_url() {
        assert!(validate_optional_url("Image", "").is_ok());
        assert!(validate_optional_url("Image", "https://img.example.com/a.png").is_ok());
        assert!(validate_optional_url("Image", "javascript:alert(1)").is_err());
        assert!(validate_optional_url("Image", "https://a b").is_err());
        let long = format!("https://{}", "a".repeat(MAX_URL_CHARS));
        assert!(validate_optional_url("Image", &long).is_err());
    }

    #[test]
    fn test_validate_email_field() {
        assert!(validate_email_field("user@example.com").is_ok());
        assert!(validate_email_field("").is_err());
        assert!(validate_email_field("not-an-email").is_err());
        let long_email = format!("{}@example.com", "a".repeat(MAX_EMAIL_CHARS));
        assert!(validate_email_field(&long_email).is_err());
    }

    #[test]
    fn test_validate_and_sanitize_user_name() {
        // Valid names
        assert_eq!(
            validate_and_sanitize_user_name("John Doe").unwrap(),
            "John Doe"
        );
        assert_eq!(
            validate_and_sanitize_user_name("Mary O'Connor").unwrap(),
            "Mary O'Connor"
        );
        assert_eq!(
            validate_and_sanitize_user_name("Jean-Pierre").unwrap(),
            "Jean-Pierre"
        );
        assert_eq!(
            validate_and_sanitize_user_name("Dr. Smith").unwrap(),
            "Dr. Smith"
        );
        assert_eq!(
            validate_and_sanitize_user_name("  Alice  ").unwrap(),
            "Alice"
        );
        assert_eq!(
            validate_and_sanitize_user_name("Renée Élodie").unwrap(),
            "Renée Élodie"
        );

        // Sanitization tests
        assert_eq!(
            validate_and_sanitize_user_name("John@Doe").unwrap(),
            "John Doe"
        );
        assert_eq!(
            validate_and_sanitize_user_name("Mary&Bob").unwrap(),
            "Mary Bob"
        );
        assert_eq!(
            validate_and_sanitize_user_name("Test<script>").unwrap(),
            "Test script"
        );
        assert_eq!(
            validate_and_sanitize_user_name("John   Multiple   Spaces").unwrap(),
            "John Multiple Spaces"
        );
        assert_eq!(
            validate_and_sanitize_user_name("User123").unwrap(),
            "User123"
        );

        // Edge cases
        assert!(validate_and_sanitize_user_name("").is_err());
        assert!(validate_and_sanitize_user_name("   ").is_err());
        assert!(validate_and_sanitize_user_name("A").is_err()); // Too short after trim
        assert!(validate_and_sanitize_user_name(&"A".repeat(257)).is_err()); // Too long

        // Special characters that should be preserved
        assert_eq!(
            validate_and_sanitize_user_name("O'Reilly-Jones").unwrap(),
            "O'Reilly-Jones"
        );
        assert_eq!(
            validate_and_sanitize_user_name("Prof. Dr. Smith").unwrap(),
            "Prof. Dr. Smith"
        );
    }
}
