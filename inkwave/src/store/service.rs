// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::file::BlogStore;
use super::types::{
    BlogData, BlogMutation, BlogMutationResult, Comment, OAuthProfile, Post, PostChanges,
    PostDraft, ProfileUpdate, StoreError, User,
};
use crate::posts::tags::normalize_tags;
use chrono::Utc;
use std::sync::{Arc, RwLock};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

type MutationRequest = (
    BlogMutation,
    oneshot::Sender<Result<BlogMutationResult, StoreError>>,
);
type MutationSender = mpsc::UnboundedSender<MutationRequest>;
type MutationReceiver = mpsc::UnboundedReceiver<MutationRequest>;

/// Owns the in-memory snapshot of all documents.
///
/// Reads borrow the snapshot under a read lock. Writes are queued to a single
/// background task which applies each one to a copy, persists the copy and
/// only then swaps it in, so a failed save leaves memory untouched and
/// concurrent toggles on the same document are applied one at a time.
#[derive(Clone)]
pub struct BlogService {
    data: Arc<RwLock<BlogData>>,
    mutation_sender: MutationSender,
    store: Arc<dyn BlogStore>,
}

impl BlogService {
    /// Loads the store and starts the mutation task. Must be called inside a Tokio runtime.
    pub fn new(store: Arc<dyn BlogStore>) -> Result<Self, StoreError> {
        let initial = store.load()?;
        log::info!(
            "Loaded {} user(s), {} post(s), {} comment(s)",
            initial.users.len(),
            initial.posts.len(),
            initial.comments.len()
        );
        let data = Arc::new(RwLock::new(initial));

        let (mutation_sender, mut mutation_receiver): (MutationSender, MutationReceiver) =
            mpsc::unbounded_channel();

        let data_clone = data.clone();
        let store_clone = store.clone();

        tokio::spawn(async move {
            while let Some((mutation, response_sender)) = mutation_receiver.recv().await {
                let result = Self::handle_mutation(mutation, &data_clone, &store_clone);
                let _ = response_sender.send(result);
            }
        });

        Ok(BlogService {
            data,
            mutation_sender,
            store,
        })
    }

    fn reload_from_store(
        data: &Arc<RwLock<BlogData>>,
        store: &Arc<dyn BlogStore>,
    ) -> Result<(), StoreError> {
        let fresh = store.load()?;
        let mut guard = match data.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("Blog data lock poisoned during reload; recovering");
                poisoned.into_inner()
            }
        };
        *guard = fresh;
        data.clear_poison();
        Ok(())
    }

    /// Runs `f` against a consistent snapshot of all documents.
    pub fn read<T>(&self, f: impl FnOnce(&BlogData) -> T) -> Result<T, StoreError> {
        match self.data.read() {
            Ok(guard) => Ok(f(&guard)),
            Err(_) => {
                log::error!("Blog data lock poisoned on read; reloading from disk");
                Self::reload_from_store(&self.data, &self.store)?;
                let guard = self.data.read().map_err(|_| {
                    StoreError::FileError("Blog data lock poisoned after recovery".to_string())
                })?;
                Ok(f(&guard))
            }
        }
    }

    fn with_data_write<T>(
        data: &Arc<RwLock<BlogData>>,
        store: &Arc<dyn BlogStore>,
        f: impl FnOnce(&mut BlogData) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = match data.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("Blog data lock poisoned on write; reloading from disk");
                let mut guard = poisoned.into_inner();
                *guard = store.load()?;
                data.clear_poison();
                guard
            }
        };

        f(&mut guard)
    }

    fn handle_mutation(
        mutation: BlogMutation,
        data: &Arc<RwLock<BlogData>>,
        store: &Arc<dyn BlogStore>,
    ) -> Result<BlogMutationResult, StoreError> {
        Self::with_data_write(data, store, |current| {
            let mut updated = current.clone();
            let result = apply_mutation(&mut updated, mutation)?;
            if let Err(err) = store.save(&updated) {
                log::error!("Failed to persist blog data: {}", err);
                return Err(err);
            }
            *current = updated;
            Ok(result)
        })
    }

    async fn submit(&self, mutation: BlogMutation) -> Result<BlogMutationResult, StoreError> {
        let (response_sender, response_receiver) = oneshot::channel();

        self.mutation_sender
            .send((mutation, response_sender))
            .map_err(|_| StoreError::ServiceNotInitialized)?;

        response_receiver
            .await
            .map_err(|_| StoreError::ServiceNotInitialized)?
    }

    pub fn get_post(&self, id: &str) -> Result<Option<Post>, StoreError> {
        self.read(|data| data.post(id).cloned())
    }

    /// Finds the user for an external identity, creating it on first login.
    /// Returns the user and whether it was created.
    pub async fn upsert_oauth_user(&self, profile: OAuthProfile) -> Result<(User, bool), StoreError> {
        match self.submit(BlogMutation::UpsertOAuthUser { profile }).await? {
            BlogMutationResult::UserUpserted { user, created } => Ok((user, created)),
            other => Err(unexpected(other)),
        }
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<User, StoreError> {
        let mutation = BlogMutation::UpdateProfile {
            user_id: user_id.to_string(),
            update,
        };
        match self.submit(mutation).await? {
            BlogMutationResult::UserUpdated(user) => Ok(user),
            other => Err(unexpected(other)),
        }
    }

    pub async fn add_bookmark(&self, user_id: &str, post_id: &str) -> Result<Vec<String>, StoreError> {
        let mutation = BlogMutation::AddBookmark {
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
        };
        match self.submit(mutation).await? {
            BlogMutationResult::Bookmarks(bookmarks) => Ok(bookmarks),
            other => Err(unexpected(other)),
        }
    }

    pub async fn remove_bookmark(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> Result<Vec<String>, StoreError> {
        let mutation = BlogMutation::RemoveBookmark {
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
        };
        match self.submit(mutation).await? {
            BlogMutationResult::Bookmarks(bookmarks) => Ok(bookmarks),
            other => Err(unexpected(other)),
        }
    }

    pub async fn create_post(&self, author_id: &str, draft: PostDraft) -> Result<Post, StoreError> {
        let mutation = BlogMutation::CreatePost {
            author_id: author_id.to_string(),
            draft,
        };
        match self.submit(mutation).await? {
            BlogMutationResult::PostSaved(post) => Ok(post),
            other => Err(unexpected(other)),
        }
    }

    /// Applies `changes` to a post owned by `requester_id`.
    pub async fn update_post(
        &self,
        post_id: &str,
        requester_id: &str,
        changes: PostChanges,
    ) -> Result<Post, StoreError> {
        let mutation = BlogMutation::UpdatePost {
            post_id: post_id.to_string(),
            requester_id: requester_id.to_string(),
            changes,
        };
        match self.submit(mutation).await? {
            BlogMutationResult::PostSaved(post) => Ok(post),
            other => Err(unexpected(other)),
        }
    }

    /// Deletes a post owned by `requester_id`, its comments, and every
    /// bookmark pointing at it.
    pub async fn delete_post(&self, post_id: &str, requester_id: &str) -> Result<(), StoreError> {
        let mutation = BlogMutation::DeletePost {
            post_id: post_id.to_string(),
            requester_id: requester_id.to_string(),
        };
        match self.submit(mutation).await? {
            BlogMutationResult::PostDeleted => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    pub async fn add_comment(
        &self,
        post_id: &str,
        author_id: &str,
        content: &str,
    ) -> Result<Comment, StoreError> {
        let mutation = BlogMutation::AddComment {
            post_id: post_id.to_string(),
            author_id: author_id.to_string(),
            content: content.to_string(),
        };
        match self.submit(mutation).await? {
            BlogMutationResult::CommentAdded(comment) => Ok(comment),
            other => Err(unexpected(other)),
        }
    }

    /// Adds `user_id` to the like set; returns the resulting like count.
    pub async fn like_post(&self, post_id: &str, user_id: &str) -> Result<usize, StoreError> {
        let mutation = BlogMutation::Like {
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
        };
        match self.submit(mutation).await? {
            BlogMutationResult::Likes(count) => Ok(count),
            other => Err(unexpected(other)),
        }
    }

    pub async fn unlike_post(&self, post_id: &str, user_id: &str) -> Result<usize, StoreError> {
        let mutation = BlogMutation::Unlike {
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
        };
        match self.submit(mutation).await? {
            BlogMutationResult::Likes(count) => Ok(count),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(result: BlogMutationResult) -> StoreError {
    StoreError::FileError(format!("Unexpected mutation result: {:?}", result))
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn trimmed_image(image: Option<String>) -> Option<String> {
    image
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Applies one mutation to `data`. Runs on the copy that is saved next.
fn apply_mutation(
    data: &mut BlogData,
    mutation: BlogMutation,
) -> Result<BlogMutationResult, StoreError> {
    let now = Utc::now();
    match mutation {
        BlogMutation::UpsertOAuthUser { profile } => {
            if let Some(existing) = data.user_by_google_id(&profile.subject) {
                return Ok(BlogMutationResult::UserUpserted {
                    user: existing.clone(),
                    created: false,
                });
            }
            if data.users.values().any(|user| user.email == profile.email) {
                return Err(StoreError::Conflict(format!(
                    "Email {} is already registered",
                    profile.email
                )));
            }

            let user = User {
                id: new_id(),
                google_id: profile.subject,
                name: profile.name,
                email: profile.email,
                profile_picture: profile.picture,
                bio: String::new(),
                has_completed_profile: false,
                bookmarks: Vec::new(),
                created_at: now,
                updated_at: now,
            };
            log::info!("Created user {} for {}", user.id, user.email);
            data.users.insert(user.id.clone(), user.clone());
            Ok(BlogMutationResult::UserUpserted {
                user,
                created: true,
            })
        }
        BlogMutation::UpdateProfile { user_id, update } => {
            let user = data
                .users
                .get_mut(&user_id)
                .ok_or_else(|| StoreError::UserNotFound(user_id.clone()))?;
            if let Some(name) = update.name {
                user.name = name;
            }
            if let Some(picture) = update.profile_picture {
                user.profile_picture = picture;
            }
            if let Some(bio) = update.bio {
                user.bio = bio;
            }
            user.has_completed_profile = !user.bio.trim().is_empty();
            user.updated_at = now;
            Ok(BlogMutationResult::UserUpdated(user.clone()))
        }
        BlogMutation::AddBookmark { user_id, post_id } => {
            if data.post(&post_id).is_none() {
                return Err(StoreError::PostNotFound(post_id));
            }
            let user = data
                .users
                .get_mut(&user_id)
                .ok_or_else(|| StoreError::UserNotFound(user_id.clone()))?;
            if !user.bookmarks.contains(&post_id) {
                user.bookmarks.push(post_id);
                user.updated_at = now;
            }
            Ok(BlogMutationResult::Bookmarks(user.bookmarks.clone()))
        }
        BlogMutation::RemoveBookmark { user_id, post_id } => {
            let user = data
                .users
                .get_mut(&user_id)
                .ok_or_else(|| StoreError::UserNotFound(user_id.clone()))?;
            let before = user.bookmarks.len();
            user.bookmarks.retain(|id| id != &post_id);
            if user.bookmarks.len() != before {
                user.updated_at = now;
            }
            Ok(BlogMutationResult::Bookmarks(user.bookmarks.clone()))
        }
        BlogMutation::CreatePost { author_id, draft } => {
            if data.user(&author_id).is_none() {
                return Err(StoreError::UserNotFound(author_id));
            }
            let post = Post {
                id: new_id(),
                author: author_id,
                title: draft.title.trim().to_string(),
                content: draft.content.trim().to_string(),
                tags: normalize_tags(&draft.tags),
                image: trimmed_image(draft.image),
                likes: Vec::new(),
                created_at: now,
                updated_at: now,
            };
            log::info!("Created post {} by {}", post.id, post.author);
            data.posts.push(post.clone());
            Ok(BlogMutationResult::PostSaved(post))
        }
        BlogMutation::UpdatePost {
            post_id,
            requester_id,
            changes,
        } => {
            let post = data
                .post_mut(&post_id)
                .ok_or_else(|| StoreError::PostNotFound(post_id.clone()))?;
            if post.author != requester_id {
                return Err(StoreError::NotOwner(post_id));
            }
            if let Some(title) = changes.title {
                post.title = title.trim().to_string();
            }
            if let Some(content) = changes.content {
                post.content = content.trim().to_string();
            }
            if let Some(tags) = changes.tags {
                post.tags = normalize_tags(&tags);
            }
            if let Some(image) = changes.image {
                post.image = trimmed_image(image);
            }
            post.updated_at = now;
            Ok(BlogMutationResult::PostSaved(post.clone()))
        }
        BlogMutation::DeletePost {
            post_id,
            requester_id,
        } => {
            let post = data
                .post(&post_id)
                .ok_or_else(|| StoreError::PostNotFound(post_id.clone()))?;
            if post.author != requester_id {
                return Err(StoreError::NotOwner(post_id));
            }
            data.posts.retain(|post| post.id != post_id);
            let before = data.comments.len();
            data.comments.retain(|comment| comment.post != post_id);
            for user in data.users.values_mut() {
                user.bookmarks.retain(|id| id != &post_id);
            }
            log::info!(
                "Deleted post {} and {} comment(s)",
                post_id,
                before - data.comments.len()
            );
            Ok(BlogMutationResult::PostDeleted)
        }
        BlogMutation::AddComment {
            post_id,
            author_id,
            content,
        } => {
            if data.post(&post_id).is_none() {
                return Err(StoreError::PostNotFound(post_id));
            }
            if data.user(&author_id).is_none() {
                return Err(StoreError::UserNotFound(author_id));
            }
            let comment = Comment {
                id: new_id(),
                post: post_id,
                author: author_id,
                content: content.trim().to_string(),
                created_at: now,
                updated_at: now,
            };
            data.comments.push(comment.clone());
            Ok(BlogMutationResult::CommentAdded(comment))
        }
        BlogMutation::Like { post_id, user_id } => {
            let post = data
                .post_mut(&post_id)
                .ok_or_else(|| StoreError::PostNotFound(post_id.clone()))?;
            if !post.likes.contains(&user_id) {
                post.likes.push(user_id);
            }
            Ok(BlogMutationResult::Likes(post.likes.len()))
        }
        BlogMutation::Unlike { post_id, user_id } => {
            let post = data
                .post_mut(&post_id)
                .ok_or_else(|| StoreError::PostNotFound(post_id.clone()))?;
            post.likes.retain(|id| id != &user_id);
            Ok(BlogMutationResult::Likes(post.likes.len()))
        }
    }
}
