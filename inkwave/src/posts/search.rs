// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::store::Post;

/// Case-insensitive substring filter over title and tags. The query is
/// trimmed; an empty query matches every post. Input order is kept.
pub fn search_posts<'a>(
    posts: impl IntoIterator<Item = &'a Post>,
    query: &str,
) -> Vec<&'a Post> {
    let needle = query.trim().to_lowercase();
    posts
        .into_iter()
        .filter(|post| {
            needle.is_empty()
                || post.title.to_lowercase().contains(&needle)
                || post.tags.to_lowercase().contains(&needle)
        })
        .collect()
}
