// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::posts::{AggregatedPost, CommentResponse, PostResponse, TagInput};
use crate::store::User;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/posts` and `PUT /api/posts/{id}`.
#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub tags: TagInput,
    pub image: Option<String>,
}

/// Body of `PATCH /api/posts/{id}`; absent fields are left unchanged and an
/// empty image removes it.
#[derive(Debug, Deserialize)]
pub struct PostPatchRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<TagInput>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub post: AggregatedPost,
    pub comments: Vec<CommentResponse>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    pub posts: Vec<AggregatedPost>,
}

#[derive(Debug, Serialize)]
pub struct LikesResponse {
    pub likes: usize,
}

#[derive(Debug, Serialize)]
pub struct BookmarksResponse {
    pub bookmarks: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub type SearchResponse = Vec<PostResponse>;
