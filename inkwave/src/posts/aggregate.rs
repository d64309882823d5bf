// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::tags::tags_array;
use crate::store::{BlogData, Comment, Post};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Author fields exposed alongside posts and comments.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub profile_picture: String,
}

/// A post with its author populated and tags expanded; `author` is null
/// when the author record no longer exists.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub author: Option<AuthorSummary>,
    pub title: String,
    pub content: String,
    pub tags: String,
    pub tags_array: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub likes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedPost {
    #[serde(flatten)]
    pub post: PostResponse,
    pub like_count: usize,
    pub comment_count: usize,
    pub liked: bool,
    pub bookmarked: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub post: String,
    pub author: Option<AuthorSummary>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn author_summary(data: &BlogData, user_id: &str) -> Option<AuthorSummary> {
    data.user(user_id).map(|user| AuthorSummary {
        id: user.id.clone(),
        name: user.name.clone(),
        profile_picture: user.profile_picture.clone(),
    })
}

pub fn post_response(post: &Post, data: &BlogData) -> PostResponse {
    PostResponse {
        id: post.id.clone(),
        author: author_summary(data, &post.author),
        title: post.title.clone(),
        content: post.content.clone(),
        tags: post.tags.clone(),
        tags_array: tags_array(&post.tags),
        image: post.image.clone(),
        likes: post.likes.clone(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

pub fn comment_response(comment: &Comment, data: &BlogData) -> CommentResponse {
    CommentResponse {
        id: comment.id.clone(),
        post: comment.post.clone(),
        author: author_summary(data, &comment.author),
        content: comment.content.clone(),
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}

/// Attaches like/comment counts and the requester's liked/bookmarked flags
/// to each post. Output order matches input order; nothing is filtered.
///
/// Comment counts are gathered in a single pass over the comment set. A
/// requester without a user record is treated as having no bookmarks.
pub fn aggregate_posts<'a>(
    posts: impl IntoIterator<Item = &'a Post>,
    data: &BlogData,
    requester_id: Option<&str>,
) -> Vec<AggregatedPost> {
    let posts: Vec<&Post> = posts.into_iter().collect();
    if posts.is_empty() {
        return Vec::new();
    }

    let wanted: HashSet<&str> = posts.iter().map(|post| post.id.as_str()).collect();
    let mut comment_counts: HashMap<&str, usize> = HashMap::new();
    for comment in &data.comments {
        if wanted.contains(comment.post.as_str()) {
            *comment_counts.entry(comment.post.as_str()).or_insert(0) += 1;
        }
    }

    let bookmarks: HashSet<&str> = requester_id
        .and_then(|id| data.user(id))
        .map(|user| user.bookmarks.iter().map(String::as_str).collect())
        .unwrap_or_default();

    posts
        .into_iter()
        .map(|post| {
            let liked = requester_id.is_some_and(|id| post.likes.iter().any(|like| like == id));
            let bookmarked = requester_id.is_some() && bookmarks.contains(post.id.as_str());
            AggregatedPost {
                like_count: post.likes.len(),
                comment_count: comment_counts.get(post.id.as_str()).copied().unwrap_or(0),
                liked,
                bookmarked,
                post: post_response(post, data),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::User;
    use chrono::Duration;

    fn user(id: &str, bookmarks: &[&str]) -> User {
        let now = Utc::now();
        User {
            id: id.to_string(),
            google_id: format!("g-{}", id),
            name: format!("User {}", id),
            email: format!("{}@example.com", id),
            profile_picture: format!("https://img.example.com/{}.png", id),
            bio: String::new(),
            has_completed_profile: false,
            bookmarks: bookmarks.iter().map(|b| b.to_string()).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    fn post(id: &str, author: &str, likes: &[&str], age_minutes: i64) -> Post {
        let created = Utc::now() - Duration::minutes(age_minutes);
        Post {
            id: id.to_string(),
            author: author.to_string(),
            title: format!("Title {}", id),
            content: "Body".to_string(),
            tags: "travel food".to_string(),
            image: None,
            likes: likes.iter().map(|l| l.to_string()).collect(),
            created_at: created,
            updated_at: created,
        }
    }

    fn comment(id: &str, post: &str, author: &str) -> Comment {
        let now = Utc::now();
        Comment {
            id: id.to_string(),
            post: post.to_string(),
            author: author.to_string(),
            content: "Nice".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn fixture() -> BlogData {
        let mut data = BlogData::default();
        for u in [user("alice", &["p2"]), user("bob", &[])] {
            data.users.insert(u.id.clone(), u);
        }
        data.posts = vec![
            post("p1", "alice", &["bob"], 10),
            post("p2", "bob", &["alice", "bob"], 5),
            post("p3", "ghost", &[], 1),
        ];
        data.comments = vec![
            comment("c1", "p1", "bob"),
            comment("c2", "p1", "alice"),
            comment("c3", "p2", "alice"),
        ];
        data
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let data = fixture();
        assert!(aggregate_posts(Vec::<&Post>::new(), &data, Some("alice")).is_empty());
    }

    #[test]
    fn counts_and_flags_for_requester() {
        let data = fixture();
        let result = aggregate_posts(&data.posts, &data, Some("alice"));
        let ids: Vec<&str> = result.iter().map(|p| p.post.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);

        assert_eq!(result[0].like_count, 1);
        assert_eq!(result[0].comment_count, 2);
        assert!(!result[0].liked);
        assert!(!result[0].bookmarked);

        assert_eq!(result[1].like_count, 2);
        assert_eq!(result[1].comment_count, 1);
        assert!(result[1].liked);
        assert!(result[1].bookmarked);

        assert_eq!(result[2].comment_count, 0);
        assert!(result[2].post.author.is_none());
    }

    #[test]
    fn anonymous_requester_gets_no_flags() {
        let data = fixture();
        let result = aggregate_posts(&data.posts, &data, None);
        assert!(result.iter().all(|p| !p.liked && !p.bookmarked));
        assert_eq!(result[1].like_count, 2);
    }

    #[test]
    fn unknown_requester_has_no_bookmarks() {
        let data = fixture();
        let result = aggregate_posts(&data.posts, &data, Some("nobody"));
        assert!(result.iter().all(|p| !p.bookmarked));
    }

    #[test]
    fn order_is_preserved() {
        let data = fixture();
        let reversed: Vec<&Post> = data.posts.iter().rev().collect();
        let result = aggregate_posts(reversed, &data, None);
        let ids: Vec<&str> = result.iter().map(|p| p.post.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p2", "p1"]);
    }

    #[test]
    fn serialized_shape_uses_client_field_names() {
        let data = fixture();
        let result = aggregate_posts(data.post("p2"), &data, Some("bob"));
        let value = serde_json::to_value(&result[0]).expect("serialize");
        assert_eq!(value["_id"], "p2");
        assert_eq!(value["likeCount"], 2);
        assert_eq!(value["commentCount"], 1);
        assert_eq!(value["liked"], true);
        assert_eq!(value["bookmarked"], false);
        assert_eq!(value["tagsArray"], serde_json::json!(["travel", "food"]));
        assert_eq!(value["author"]["name"], "User bob");
        assert_eq!(
            value["author"]["profilePicture"],
            "https://img.example.com/bob.png"
        );
        assert!(value.get("image").is_none());
    }

    #[test]
    fn comment_response_populates_author() {
        let data = fixture();
        let response = comment_response(&data.comments[0], &data);
        assert_eq!(response.author.map(|a| a.name), Some("User bob".to_string()));
    }
}
