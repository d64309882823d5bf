// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod file;
mod service;
mod types;

pub use file::{BlogStore, FileBlogStore};
#[cfg(test)]
pub use file::MemoryBlogStore;
pub use service::BlogService;
pub use types::{
    BlogData, Comment, OAuthProfile, Post, PostChanges, PostDraft, ProfileUpdate, StoreError,
    User,
};
