// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::posts::tags::TagInput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub google_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub profile_picture: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub has_completed_profile: bool,
    #[serde(default)]
    pub bookmarks: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub author: String,
    pub title: String,
    pub content: String,
    /// Canonical tag string: lowercase tokens joined by single spaces.
    #[serde(default)]
    pub tags: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub likes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub post: String,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The whole persisted document set. Posts and comments keep insertion order.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct BlogData {
    #[serde(default)]
    pub users: BTreeMap<String, User>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl BlogData {
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    pub fn user_by_google_id(&self, google_id: &str) -> Option<&User> {
        self.users.values().find(|user| user.google_id == google_id)
    }

    pub fn post(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    pub(crate) fn post_mut(&mut self, id: &str) -> Option<&mut Post> {
        self.posts.iter_mut().find(|post| post.id == id)
    }

    /// All posts, newest first. Posts created at the same instant keep
    /// reverse insertion order.
    pub fn posts_newest_first(&self) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().rev().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    pub fn posts_by_author(&self, author_id: &str) -> Vec<&Post> {
        self.posts_newest_first()
            .into_iter()
            .filter(|post| post.author == author_id)
            .collect()
    }

    /// Comments on a post in the order they were written.
    pub fn comments_for(&self, post_id: &str) -> Vec<&Comment> {
        self.comments
            .iter()
            .filter(|comment| comment.post == post_id)
            .collect()
    }
}

/// Identity returned by the external provider after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthProfile {
    pub subject: String,
    pub name: String,
    pub email: String,
    pub picture: String,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub tags: TagInput,
    pub image: Option<String>,
}

/// Field changes for an existing post. `None` leaves the field as is, so a
/// full update sets every field and a patch only the supplied ones.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<TagInput>,
    pub image: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    UserNotFound(String),
    PostNotFound(String),
    NotOwner(String),
    Conflict(String),
    ServiceNotInitialized,
    FileError(String),
    ParseError(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::UserNotFound(id) => write!(f, "User not found: {}", id),
            StoreError::PostNotFound(id) => write!(f, "Post not found: {}", id),
            StoreError::NotOwner(id) => write!(f, "Not the author of post {}", id),
            StoreError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            StoreError::ServiceNotInitialized => write!(f, "Blog service not initialized"),
            StoreError::FileError(msg) => write!(f, "File error: {}", msg),
            StoreError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

// Mutation commands for the background task
#[derive(Debug)]
pub(crate) enum BlogMutation {
    UpsertOAuthUser {
        profile: OAuthProfile,
    },
    UpdateProfile {
        user_id: String,
        update: ProfileUpdate,
    },
    AddBookmark {
        user_id: String,
        post_id: String,
    },
    RemoveBookmark {
        user_id: String,
        post_id: String,
    },
    CreatePost {
        author_id: String,
        draft: PostDraft,
    },
    UpdatePost {
        post_id: String,
        requester_id: String,
        changes: PostChanges,
    },
    DeletePost {
        post_id: String,
        requester_id: String,
    },
    AddComment {
        post_id: String,
        author_id: String,
        content: String,
    },
    Like {
        post_id: String,
        user_id: String,
    },
    Unlike {
        post_id: String,
        user_id: String,
    },
}

#[derive(Debug)]
pub(crate) enum BlogMutationResult {
    UserUpserted { user: User, created: bool },
    UserUpdated(User),
    Bookmarks(Vec<String>),
    PostSaved(Post),
    PostDeleted,
    CommentAdded(Comment),
    Likes(usize),
}
