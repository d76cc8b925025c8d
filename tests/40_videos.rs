mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn video(server: &common::TestServer, id: i64, token: Option<&str>) -> Result<Value> {
    let mut req = reqwest::Client::new().get(server.url(&format!("/api/videos/{}", id)));
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    let res = req.send().await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "video fetch failed: {}", res.status());
    let body: Value = res.json().await?;
    Ok(body["data"].clone())
}

#[tokio::test]
#[ignore = "needs DATABASE_URL; run with --include-ignored"]
async fn upload_synthesizes_seo_fields() -> Result<()> {
    let _db = common::database().await?;
    let server = common::ensure_server().await?;
    let creator = common::register_user(server).await?;

    let id = common::create_video(server, &creator, "Monsoon Ragas").await?;
    let detail = video(server, id, None).await?;
    assert_eq!(detail["creator_id"], creator.id);
    assert_eq!(detail["language"], "Hindi");
    assert!(detail["slug"].as_str().unwrap().starts_with("monsoon-ragas"));

    let res = reqwest::get(server.url(&format!("/api/videos/{}/seo", id))).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let seo: Value = res.json().await?;
    assert!(seo["data"]["seo_title"].as_str().unwrap().contains("Monsoon Ragas"));
    Ok(())
}

#[tokio::test]
#[ignore = "needs DATABASE_URL; run with --include-ignored"]
async fn upload_without_media_is_rejected() -> Result<()> {
    let _db = common::database().await?;
    let server = common::ensure_server().await?;
    let creator = common::register_user(server).await?;

    let res = reqwest::Client::new()
        .post(server.url("/api/videos"))
        .bearer_auth(&creator.token)
        .json(&json!({ "title": "No media" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Video file or URL is required");
    Ok(())
}

#[tokio::test]
#[ignore = "needs DATABASE_URL; run with --include-ignored"]
async fn likes_are_idempotent_and_never_negative() -> Result<()> {
    let _db = common::database().await?;
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let creator = common::register_user(server).await?;
    let viewer = common::register_user(server).await?;
    let id = common::create_video(server, &creator, "Like me").await?;
    let like_url = server.url(&format!("/api/videos/{}/like", id));

    for expected_change in [true, false] {
        let res = client.post(&like_url).bearer_auth(&viewer.token).send().await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await?;
        assert_eq!(body["data"]["changed"], expected_change);
        assert_eq!(body["data"]["likes_count"], 1);
    }

    let detail = video(server, id, Some(&viewer.token)).await?;
    assert_eq!(detail["is_liked"], true);

    for _ in 0..2 {
        let res = client.delete(&like_url).bearer_auth(&viewer.token).send().await?;
        let body: Value = res.json().await?;
        assert_eq!(body["data"]["likes_count"], 0);
    }
    Ok(())
}

#[tokio::test]
#[ignore = "needs DATABASE_URL; run with --include-ignored"]
async fn views_and_comments_move_counters() -> Result<()> {
    let _db = common::database().await?;
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let creator = common::register_user(server).await?;
    let id = common::create_video(server, &creator, "Counted").await?;

    // Anonymous views count
    for expected in 1..=2 {
        let res = client.post(server.url(&format!("/api/videos/{}/view", id))).send().await?;
        let body: Value = res.json().await?;
        assert_eq!(body["data"]["views_count"], expected);
    }

    let res = client
        .post(server.url(&format!("/api/videos/{}/comments", id)))
        .bearer_auth(&creator.token)
        .json(&json!({ "text": "First" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let parent: Value = res.json().await?;
    let parent_id = parent["data"]["id"].as_i64().unwrap();

    let res = client
        .post(server.url(&format!("/api/comments/{}", id)))
        .bearer_auth(&creator.token)
        .json(&json!({ "text": "Reply", "parentId": parent_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let reply: Value = res.json().await?;
    let reply_id = reply["data"]["id"].as_i64().unwrap();

    // Replies to replies are refused
    let res = client
        .post(server.url(&format!("/api/videos/{}/comments", id)))
        .bearer_auth(&creator.token)
        .json(&json!({ "text": "Too deep", "parent_id": reply_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert_eq!(video(server, id, None).await?["comments_count"], 2);

    // Deleting the parent takes the reply with it
    let res = client
        .delete(server.url(&format!("/api/comments/{}", parent_id)))
        .bearer_auth(&creator.token)
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["removed"], 2);
    assert_eq!(video(server, id, None).await?["comments_count"], 0);
    Ok(())
}

#[tokio::test]
#[ignore = "needs DATABASE_URL; run with --include-ignored"]
async fn partial_updates_respect_ownership() -> Result<()> {
    let _db = common::database().await?;
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let owner = common::register_user(server).await?;
    let stranger = common::register_user(server).await?;
    let id = common::create_video(server, &owner, "Owned").await?;
    let url = server.url(&format!("/api/videos/{}", id));

    let res = client
        .patch(&url)
        .bearer_auth(&stranger.token)
        .json(&json!({ "title": "Hijacked" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Unknown fields only: nothing to write, still a success
    let res = client
        .patch(&url)
        .bearer_auth(&owner.token)
        .json(&json!({ "views_count": 1000 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["updated"], false);

    let res = client
        .patch(&url)
        .bearer_auth(&owner.token)
        .json(&json!({ "title": "Renamed", "isFeatured": true, "description": null }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Title is NOT NULL: clearing it is a client error and writes nothing
    let res = client
        .patch(&url)
        .bearer_auth(&owner.token)
        .json(&json!({ "title": null, "isFeatured": false }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field_errors"]["title"], "cannot be null");

    let detail = video(server, id, None).await?;
    assert_eq!(detail["title"], "Renamed");
    assert_eq!(detail["is_featured"], 1);
    assert_eq!(detail["views_count"], 0);
    assert!(detail["description"].is_null());

    let res = client
        .delete(server.url("/api/videos/999999999"))
        .bearer_auth(&owner.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
