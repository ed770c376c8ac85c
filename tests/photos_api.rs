//! Photo upload, listing, editing, tagging and deletion over HTTP

#[macro_use]
mod common;

use axum::http::Method;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{body_id, Part, TestApp};

#[tokio::test]
async fn test_upload_stores_image_and_record() {
    let app = TestApp::new();
    let ann = app.user("ann").await;

    let photo = app.upload(&ann, Some("sunset, beach,,sunset")).await;
    assert_eq!(photo["user_id"], ann.id.to_string());
    assert_eq!(photo["tags"], json!(["beach", "sunset"]));
    assert!(photo["url"].as_str().unwrap().starts_with("memory://images/user_"));
    assert!(photo.get("public_id").is_none());
    assert_eq!(app.images.len().await, 1);

    let uri = format!("/api/images/{}", body_id(&photo));
    let (status, fetched) = app.get(&uri, Some(&ann.access_token)).await;
    assert_status!(status, fetched, 200);
    assert_eq!(fetched, photo);
}

#[tokio::test]
async fn test_upload_with_description() {
    let app = TestApp::new();
    let ann = app.user("ann").await;

    let (status, body) = app
        .multipart(
            Method::POST,
            "/api/images/upload_image",
            &ann.access_token,
            &[
                Part::image(b"png-bytes"),
                Part::text("description", "  Evening at the pier  "),
            ],
        )
        .await;
    assert_status!(status, body, 201);
    assert_eq!(body["description"], "Evening at the pier");
}

#[tokio::test]
async fn test_upload_rejects_missing_or_non_image_file() {
    let app = TestApp::new();
    let ann = app.user("ann").await;

    let (status, body) = app
        .multipart(
            Method::POST,
            "/api/images/upload_image",
            &ann.access_token,
            &[Part::text("description", "no file")],
        )
        .await;
    assert_api_error!(status, body, 400, "validation_error");

    let text_file = Part {
        name: "file",
        file_name: Some("notes.txt"),
        content_type: Some("text/plain"),
        data: b"hello",
    };
    let (status, body) = app
        .multipart(
            Method::POST,
            "/api/images/upload_image",
            &ann.access_token,
            &[text_file],
        )
        .await;
    assert_api_error!(status, body, 400, "validation_error");
    assert!(app.images.is_empty().await);
}

#[tokio::test]
async fn test_upload_rejects_six_tags() {
    let app = TestApp::new();
    let ann = app.user("ann").await;

    let (status, body) = app
        .multipart(
            Method::POST,
            "/api/images/upload_image",
            &ann.access_token,
            &[Part::image(b"png"), Part::text("tags", "a,b,c,d,e,f")],
        )
        .await;
    assert_api_error!(status, body, 400, "validation_error");
    assert!(app.images.is_empty().await);
}

#[tokio::test]
async fn test_upload_requires_authentication() {
    let app = TestApp::new();
    let (status, body) = app
        .multipart(Method::POST, "/api/images/upload_image", "", &[Part::image(b"png")])
        .await;
    assert_eq!(status.as_u16(), 401, "{}", body);
}

#[tokio::test]
async fn test_tag_limit_over_http() {
    let app = TestApp::new();
    let ann = app.user("ann").await;
    let photo = app.upload(&ann, Some("a,b,c,d,e")).await;
    let uri = format!("/api/images/{}/tags", body_id(&photo));

    // Re-attaching an existing tag is a no-op even at the limit
    let (status, body) = app
        .post(&uri, Some(&ann.access_token), json!({ "name": "c" }))
        .await;
    assert_status!(status, body, 200);
    assert_eq!(body["tags"].as_array().unwrap().len(), 5);

    let (status, body) = app
        .post(&uri, Some(&ann.access_token), json!({ "name": "f" }))
        .await;
    assert_api_error!(status, body, 400, "tag_limit_exceeded");

    let (status, body) = app
        .delete(&format!("{}/a", uri), Some(&ann.access_token))
        .await;
    assert_status!(status, body, 200);

    let (status, body) = app
        .post(&uri, Some(&ann.access_token), json!({ "name": "f" }))
        .await;
    assert_status!(status, body, 200);
    assert_eq!(body["tags"], json!(["b", "c", "d", "e", "f"]));
}

#[tokio::test]
async fn test_only_owner_or_admin_edits() {
    let app = TestApp::new();
    let admin = app.user("admin").await;
    let ann = app.user("ann").await;
    let bob = app.user("bob").await;

    let photo = app.upload(&ann, None).await;
    let uri = format!("/api/images/{}", body_id(&photo));

    let (status, body) = app
        .patch(&uri, Some(&bob.access_token), json!({ "description": "mine now" }))
        .await;
    assert_api_error!(status, body, 403, "forbidden");

    let (status, body) = app
        .patch(&uri, Some(&ann.access_token), json!({ "description": "by owner" }))
        .await;
    assert_status!(status, body, 200);
    assert_eq!(body["description"], "by owner");

    let (status, body) = app
        .patch(&uri, Some(&admin.access_token), json!({ "description": null }))
        .await;
    assert_status!(status, body, 200);
    assert_eq!(body["description"], serde_json::Value::Null);

    let (status, body) = app
        .post(&format!("{}/tags", uri), Some(&bob.access_token), json!({ "name": "x" }))
        .await;
    assert_api_error!(status, body, 403, "forbidden");
}

#[tokio::test]
async fn test_delete_removes_photo_comments_and_image() {
    let app = TestApp::new();
    let admin = app.user("admin").await;
    let ann = app.user("ann").await;
    let bob = app.user("bob").await;

    let photo = app.upload(&ann, None).await;
    let id = body_id(&photo);
    let (status, body) = app
        .post(
            &format!("/api/comments/{}", id),
            Some(&bob.access_token),
            json!({ "text": "nice" }),
        )
        .await;
    assert_status!(status, body, 201);

    let uri = format!("/api/images/{}", id);
    let (status, body) = app.delete(&uri, Some(&bob.access_token)).await;
    assert_api_error!(status, body, 403, "forbidden");

    let (status, body) = app.delete(&uri, Some(&admin.access_token)).await;
    assert_status!(status, body, 200);
    assert_eq!(body_id(&body), id);
    assert!(app.images.is_empty().await);

    let (status, body) = app.get(&uri, Some(&ann.access_token)).await;
    assert_api_error!(status, body, 404, "not_found");
    let (status, body) = app.get(&format!("/api/comments/all/{}", id), None).await;
    assert_api_error!(status, body, 404, "not_found");
}

#[tokio::test]
async fn test_missing_photo_is_404_for_everyone() {
    let app = TestApp::new();
    let _admin = app.user("admin").await;
    let bob = app.user("bob").await;

    let uri = format!("/api/images/{}", uuid::Uuid::new_v4());
    let (status, body) = app.delete(&uri, Some(&bob.access_token)).await;
    assert_api_error!(status, body, 404, "not_found");
}

#[tokio::test]
async fn test_list_filters_and_pages() {
    let app = TestApp::new();
    let ann = app.user("ann").await;
    let bob = app.user("bob").await;

    app.upload(&ann, Some("cats")).await;
    app.upload(&ann, Some("dogs")).await;
    let newest = app.upload(&bob, Some("cats")).await;

    let (status, all) = app.get("/api/images", Some(&ann.access_token)).await;
    assert_status!(status, all, 200);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (status, cats) = app.get("/api/images?tag=cats", Some(&ann.access_token)).await;
    assert_status!(status, cats, 200);
    assert_eq!(cats.as_array().unwrap().len(), 2);

    let uri = format!("/api/images?owner={}", ann.id);
    let (status, mine) = app.get(&uri, Some(&ann.access_token)).await;
    assert_status!(status, mine, 200);
    assert_eq!(mine.as_array().unwrap().len(), 2);

    let (status, first) = app
        .get("/api/images?limit=1&offset=0", Some(&ann.access_token))
        .await;
    assert_status!(status, first, 200);
    assert_eq!(first.as_array().unwrap().len(), 1);
    assert_eq!(first[0]["id"], newest["id"]);

    let (status, body) = app.get("/api/images?limit=0", Some(&ann.access_token)).await;
    assert_api_error!(status, body, 400, "validation_error");
}
