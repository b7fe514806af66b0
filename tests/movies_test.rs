mod common;

use axum::http::StatusCode;
use common::{spawn_app, TestApp};
use serde_json::{json, Value};
use std::collections::BTreeSet;

async fn create_movie(app: &TestApp, body: Value) -> String {
    app.server
        .post("/movies")
        .json(&body)
        .await
        .assert_status(StatusCode::OK);

    let title = body["title"].clone();
    let stored = app
        .documents
        .all()
        .into_iter()
        .find(|doc| doc["title"] == title)
        .expect("movie stored");
    stored["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn create_assigns_server_id() {
    let app = spawn_app();

    let response = app.server.post("/movies").json(&json!({"title": "Dune"})).await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.text(), "Movie data saved successfully");

    let documents = app.documents.all();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["title"], "Dune");
    let id = documents[0]["id"].as_str().unwrap();
    assert_eq!(id.len(), 32);
}

#[tokio::test]
async fn create_ignores_client_supplied_id() {
    let app = spawn_app();

    app.server
        .post("/movies")
        .json(&json!({"id": "chosen-by-client", "title": "Dune"}))
        .await
        .assert_status(StatusCode::OK);

    let documents = app.documents.all();
    assert_eq!(documents.len(), 1);
    assert_ne!(documents[0]["id"], "chosen-by-client");
    assert_eq!(documents[0]["title"], "Dune");
}

#[tokio::test]
async fn create_accepts_json_without_content_type() {
    let app = spawn_app();

    app.server
        .post("/movies")
        .text(r#"{"title":"Arrival","year":2016}"#)
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(app.documents.len(), 1);
}

#[tokio::test]
async fn create_rejects_malformed_json() {
    let app = spawn_app();

    let response = app.server.post("/movies").text("{title:").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Movie data must be sent as JSON");
    assert_eq!(app.documents.len(), 0);
}

#[tokio::test]
async fn create_rejects_non_object_json() {
    let app = spawn_app();

    let response = app.server.post("/movies").json(&json!(["Dune"])).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(app.documents.len(), 0);
}

#[tokio::test]
async fn create_storage_failure_is_internal_error() {
    let app = spawn_app();
    app.documents.fail_all();

    let response = app.server.post("/movies").json(&json!({"title": "Dune"})).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to save movie data");
}

#[tokio::test]
async fn get_returns_stored_record() {
    let app = spawn_app();
    let id = create_movie(&app, json!({"title": "Dune", "year": 2021, "thumb": "http://blobs.test/image/dune.jpg"})).await;

    let response = app.server.get(&format!("/movies/{id}")).await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({"id": id, "title": "Dune", "year": 2021, "thumb": "http://blobs.test/image/dune.jpg"})
    );
}

#[tokio::test]
async fn get_is_repeatable() {
    let app = spawn_app();
    let id = create_movie(&app, json!({"title": "Dune"})).await;

    let first = app.server.get(&format!("/movies/{id}")).await.text();
    let second = app.server.get(&format!("/movies/{id}")).await.text();

    assert_eq!(first, second);
}

#[tokio::test]
async fn get_unknown_id_is_not_found() {
    let app = spawn_app();

    let response = app.server.get("/movies/does-not-exist").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "Movie not found");
}

#[tokio::test]
async fn get_treats_quotes_in_id_as_plain_text() {
    let app = spawn_app();
    create_movie(&app, json!({"title": "Dune"})).await;

    let response = app.server.get("/movies/x'%20OR%20'1'='1").await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_does_not_trim_the_requested_id() {
    let app = spawn_app();
    let id = create_movie(&app, json!({"title": "Dune"})).await;

    app.server
        .get(&format!("/movies/%20{id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .get(&format!("/movies/{id}%20"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_blank_id_is_bad_request() {
    let app = spawn_app();

    let response = app.server.get("/movies/%20").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_empty_returns_message() {
    let app = spawn_app();

    let response = app.server.get("/movies").await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body, json!({"message": "No movies available"}));
}

#[tokio::test]
async fn list_returns_every_record() {
    let app = spawn_app();
    for title in ["Dune", "Arrival", "Sicario"] {
        create_movie(&app, json!({"title": title})).await;
    }

    let response = app.server.get("/movies").await;

    response.assert_status(StatusCode::OK);
    let body: Vec<Value> = response.json();
    assert_eq!(body.len(), 3);
    assert!(body.iter().all(|movie| movie["id"].is_string()));
}

#[tokio::test]
async fn list_pages_through_records() {
    let app = spawn_app();
    for title in ["Dune", "Arrival", "Sicario"] {
        create_movie(&app, json!({"title": title})).await;
    }

    let first: Value = app.server.get("/movies").add_query_param("limit", 2).await.json();
    assert_eq!(first["items"].as_array().unwrap().len(), 2);
    let cursor = first["nextCursor"].as_str().expect("cursor for full page").to_string();

    let second: Value = app
        .server
        .get("/movies")
        .add_query_param("limit", 2)
        .add_query_param("cursor", &cursor)
        .await
        .json();
    assert_eq!(second["items"].as_array().unwrap().len(), 1);
    assert!(second["nextCursor"].is_null());

    let mut seen: Vec<Value> = first["items"].as_array().unwrap().clone();
    seen.extend(second["items"].as_array().unwrap().iter().cloned());
    let ids: BTreeSet<&str> = seen.iter().map(|m| m["id"].as_str().unwrap()).collect();
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn paged_list_of_empty_collection_is_an_empty_page() {
    let app = spawn_app();

    let body: Value = app.server.get("/movies").add_query_param("limit", 10).await.json();

    assert_eq!(body, json!({"items": [], "nextCursor": null}));
}

#[tokio::test]
async fn list_rejects_out_of_range_limit() {
    let app = spawn_app();

    app.server
        .get("/movies")
        .add_query_param("limit", 0)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .get("/movies")
        .add_query_param("limit", "lots")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_storage_failure_is_internal_error() {
    let app = spawn_app();
    app.documents.fail_all();

    app.server
        .get("/movies")
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_is_ok() {
    let app = spawn_app();

    let response = app.server.get("/health").await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.text(), "ok");
}
