// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{as_str, post_body, with_session};
use serde_json::{Value, json};

#[actix_web::test]
async fn comments_are_listed_with_their_authors() {
    let harness = common::TestHarness::new().await;
    let app = test::init_service(common::build_test_app(&harness)).await;
    let author = harness.sign_in("g-ada", "Ada Lovelace").await;
    let reader = harness.sign_in("g-grace", "Grace Hopper").await;

    let req = with_session(test::TestRequest::post().uri("/api/posts"), &author)
        .set_json(post_body("Engines", "Body", json!("history")))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = as_str(&created, "_id").to_string();
    let comments_uri = format!("/api/posts/{}/comments", post_id);

    for (session, text) in [(&reader, " First! "), (&author, "Thanks")] {
        let req = with_session(test::TestRequest::post().uri(&comments_uri), session)
            .set_json(json!({ "content": text }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let comment: Value = test::read_body_json(resp).await;
        assert_eq!(as_str(&comment, "post"), post_id);
        assert_eq!(comment["author"]["_id"], json!(session.user.id));
    }

    let req = test::TestRequest::get().uri(&comments_uri).to_request();
    let comments: Value = test::call_and_read_body_json(&app, req).await;
    let comments = comments.as_array().expect("comment array");
    assert_eq!(comments.len(), 2);
    assert_eq!(as_str(&comments[0], "content"), "First!");
    assert_eq!(comments[0]["author"]["name"], json!("Grace Hopper"));
    assert_eq!(as_str(&comments[1], "content"), "Thanks");

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let feed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(feed[0]["commentCount"], json!(2));

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", post_id))
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail["post"]["commentCount"], json!(2));
    assert_eq!(detail["comments"].as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn comment_needs_content_session_and_post() {
    let harness = common::TestHarness::new().await;
    let app = test::init_service(common::build_test_app(&harness)).await;
    let author = harness.sign_in("g-ada", "Ada Lovelace").await;

    let req = with_session(test::TestRequest::post().uri("/api/posts"), &author)
        .set_json(post_body("Engines", "Body", json!("")))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let comments_uri = format!("/api/posts/{}/comments", as_str(&created, "_id"));

    let req = with_session(test::TestRequest::post().uri(&comments_uri), &author)
        .set_json(json!({ "content": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(as_str(&body, "message"), "Comment content is required");

    let req = test::TestRequest::post()
        .uri(&comments_uri)
        .set_json(json!({ "content": "Anonymous" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = with_session(
        test::TestRequest::post().uri("/api/posts/missing/comments"),
        &author,
    )
    .set_json(json!({ "content": "Hello?" }))
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(as_str(&body, "message"), "Post not found");
}

#[actix_web::test]
async fn liking_twice_counts_once() {
    let harness = common::TestHarness::new().await;
    let app = test::init_service(common::build_test_app(&harness)).await;
    let author = harness.sign_in("g-ada", "Ada Lovelace").await;
    let reader = harness.sign_in("g-grace", "Grace Hopper").await;

    let req = with_session(test::TestRequest::post().uri("/api/posts"), &author)
        .set_json(post_body("Engines", "Body", json!("")))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let like_uri = format!("/api/posts/{}/like", as_str(&created, "_id"));

    for _ in 0..2 {
        let req = with_session(test::TestRequest::post().uri(&like_uri), &reader).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "likes": 1 }));
    }

    let req = with_session(test::TestRequest::post().uri(&like_uri), &author).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "likes": 2 }));

    let req = with_session(test::TestRequest::delete().uri(&like_uri), &reader).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "likes": 1 }));

    let req = with_session(test::TestRequest::delete().uri(&like_uri), &reader).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "likes": 1 }));
}

#[actix_web::test]
async fn liking_requires_session_and_existing_post() {
    let harness = common::TestHarness::new().await;
    let app = test::init_service(common::build_test_app(&harness)).await;
    let reader = harness.sign_in("g-grace", "Grace Hopper").await;

    let req = test::TestRequest::post()
        .uri("/api/posts/anything/like")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = with_session(
        test::TestRequest::delete().uri("/api/posts/missing/like"),
        &reader,
    )
    .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}
