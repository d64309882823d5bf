// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Post read/write shaping: tag normalization, per-requester aggregation
//! and the title/tag search filter.

pub mod aggregate;
pub mod search;
pub mod tags;

pub use aggregate::{
    AggregatedPost, AuthorSummary, CommentResponse, PostResponse, aggregate_posts,
    comment_response, post_response,
};
pub use search::search_posts;
pub use tags::{TagInput, normalize_tags, tags_array};
