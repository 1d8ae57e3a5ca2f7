//! Integration tests for bundle correlation CRUD operations.

mod common;

use axum::http::StatusCode;
use common::{TestServer, json_request};
use serde_json::json;

#[tokio::test]
async fn test_create_corr_returns_assigned_id_and_defaults() {
    let server = TestServer::new().await;

    let body = json!({"bundle": "com.example.app", "project": "example", "platform": "android"});
    let (status, response) = json_request(
        &server.router,
        "POST",
        "/v1/correlations",
        Some(body),
        Some(server.api_key()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(response.get("id").and_then(|v| v.as_i64()).is_some());
    assert_eq!(response["bundle"], "com.example.app");
    assert_eq!(response["project"], "example");
    assert_eq!(response["platform"], "android");
}

#[tokio::test]
async fn test_create_corr_omitted_fields_default_to_empty() {
    let server = TestServer::new().await;

    let (status, response) = json_request(
        &server.router,
        "POST",
        "/v1/correlations",
        Some(json!({"bundle": "com.example.app"})),
        Some(server.api_key()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["project"], "");
    assert_eq!(response["platform"], "");
}

#[tokio::test]
async fn test_get_corr_roundtrip_and_missing_404() {
    let server = TestServer::new().await;

    let (_, created) = json_request(
        &server.router,
        "POST",
        "/v1/correlations",
        Some(json!({"bundle": "com.example.app", "project": "example", "platform": "ios"})),
        Some(server.api_key()),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = json_request(
        &server.router,
        "GET",
        &format!("/v1/correlations/{id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, _) =
        json_request(&server.router, "GET", "/v1/correlations/9999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_corr_applies_only_present_fields() {
    let server = TestServer::new().await;

    let (_, created) = json_request(
        &server.router,
        "POST",
        "/v1/correlations",
        Some(json!({"bundle": "com.example.app", "project": "example", "platform": "android"})),
        Some(server.api_key()),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = json_request(
        &server.router,
        "PUT",
        &format!("/v1/correlations/{id}"),
        Some(json!({"platform": "ios"})),
        Some(server.api_key()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["platform"], "ios");
    assert_eq!(updated["bundle"], "com.example.app");
    assert_eq!(updated["project"], "example");
}

#[tokio::test]
async fn test_delete_corr_then_get_is_404() {
    let server = TestServer::new().await;

    let (_, created) = json_request(
        &server.router,
        "POST",
        "/v1/correlations",
        Some(json!({"bundle": "com.example.doomed"})),
        Some(server.api_key()),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = json_request(
        &server.router,
        "DELETE",
        &format!("/v1/correlations/{id}"),
        None,
        Some(server.api_key()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = json_request(
        &server.router,
        "GET",
        &format!("/v1/correlations/{id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_corrs_envelope_and_total() {
    let server = TestServer::new().await;

    let (_, response) = json_request(&server.router, "GET", "/v1/correlations", None, None).await;
    assert_eq!(response["correlations"], json!([]));
    assert_eq!(response["total"], 0);

    for i in 0..3 {
        json_request(
            &server.router,
            "POST",
            "/v1/correlations",
            Some(json!({"bundle": format!("com.example.app{i}")})),
            Some(server.api_key()),
        )
        .await;
    }

    let (status, response) = json_request(
        &server.router,
        "GET",
        "/v1/correlations?skip=1&limit=1",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let correlations = response["correlations"].as_array().unwrap();
    assert_eq!(correlations.len(), 1);
    assert_eq!(correlations[0]["bundle"], "com.example.app1");
    assert_eq!(response["total"], 3);
}

#[tokio::test]
async fn test_get_corr_by_bundle_returns_lowest_id_match() {
    let server = TestServer::new().await;

    let (_, first) = json_request(
        &server.router,
        "POST",
        "/v1/correlations",
        Some(json!({"bundle": "com.example.dup", "project": "alpha"})),
        Some(server.api_key()),
    )
    .await;
    json_request(
        &server.router,
        "POST",
        "/v1/correlations",
        Some(json!({"bundle": "com.example.dup", "project": "beta"})),
        Some(server.api_key()),
    )
    .await;

    let (status, found) = json_request(
        &server.router,
        "GET",
        "/v1/correlations/by-bundle/com.example.dup",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["id"], first["id"]);
    assert_eq!(found["project"], "alpha");
}

#[tokio::test]
async fn test_get_corr_by_bundle_missing_is_404() {
    let server = TestServer::new().await;

    let (status, _) = json_request(
        &server.router,
        "GET",
        "/v1/correlations/by-bundle/com.example.nothing",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
