use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use server::{build_app, Settings};
use std::fs;
use tempfile::tempdir;
use tower::ServiceExt;

const DOCS: &str = r#"{"id": 1, "text": "curly cat curly tail", "ratings": [7, 2, 7]}
{"id": 2, "text": "curly dog and fancy collar", "ratings": [1, 2, 3]}
{"id": 3, "text": "big cat fancy collar", "ratings": [1, 2, 8]}
{"id": 4, "text": "big dog sparrow Eugene", "ratings": [1, 3, 2]}
{"id": 5, "text": "big dog sparrow Vasiliy", "ratings": [1, 1, 1]}
{"id": 6, "text": "big parrot", "status": "BANNED", "ratings": [9]}
"#;

fn build_pets_app(admin_token: Option<&str>) -> Router {
    let dir = tempdir().unwrap();
    let file = dir.path().join("pets.jsonl");
    fs::write(&file, DOCS).unwrap();
    let settings = Settings {
        documents: Some(file),
        stop_words: "and in at".into(),
        admin_token: admin_token.map(str::to_string),
        ..Settings::default()
    };
    build_app(settings).unwrap()
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    call(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

fn result_ids(json: &Value) -> Vec<i64> {
    json["results"].as_array().unwrap().iter().map(|r| r["document_id"].as_i64().unwrap()).collect()
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let app = build_pets_app(None);
    let (status, json) = get(&app, "/search?q=big%20dog").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result_ids(&json), vec![4, 5, 2, 3]);
    assert_eq!(json["total_hits"], 4);
    assert_eq!(json["results"][0]["rating"], 2);
}

#[tokio::test]
async fn search_filters_by_status_and_minus_words() {
    let app = build_pets_app(None);
    let (_, json) = get(&app, "/search?q=big&status=BANNED").await;
    assert_eq!(result_ids(&json), vec![6]);
    let (_, json) = get(&app, "/search?q=big%20-dog").await;
    assert_eq!(result_ids(&json), vec![3]);
}

#[tokio::test]
async fn malformed_query_is_bad_request() {
    let app = build_pets_app(None);
    let (status, json) = get(&app, "/search?q=cat%20--dog").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("double minus"));
}

#[tokio::test]
async fn match_reports_words_and_status() {
    let app = build_pets_app(None);
    let (status, json) = get(&app, "/match?q=big%20sparrow%20parrot&id=4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["words"], serde_json::json!(["big", "sparrow"]));
    assert_eq!(json["status"], "ACTUAL");
    let (status, _) = get(&app, "/match?q=big&id=99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn documents_are_listed_in_insertion_order() {
    let app = build_pets_app(None);
    let (_, json) = get(&app, "/documents").await;
    assert_eq!(json["count"], 6);
    assert_eq!(json["ids"], serde_json::json!([1, 2, 3, 4, 5, 6]));
    let (status, json) = get(&app, "/documents/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rating"], 5);
    assert_eq!(json["word_frequencies"]["curly"], 0.5);
}

#[tokio::test]
async fn stats_count_empty_searches() {
    let app = build_pets_app(None);
    get(&app, "/search?q=unicorn").await;
    get(&app, "/search?q=cat").await;
    let (_, json) = get(&app, "/stats").await;
    assert_eq!(json["requests"], 2);
    assert_eq!(json["no_result_requests"], 1);
    assert_eq!(json["window"], 1440);
}

fn post_documents(body: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/documents").header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("X-ADMIN-TOKEN", token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn adding_documents_requires_admin_token() {
    let app = build_pets_app(Some("secret"));
    let (status, _) = call(&app, post_documents(r#"{"id": 7, "text": "white parrot"}"#, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, json) = call(&app, post_documents(r#"{"id": 7, "text": "white parrot"}"#, Some("secret"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["added"], 1);
    let (_, json) = get(&app, "/search?q=white").await;
    assert_eq!(result_ids(&json), vec![7]);
}

#[tokio::test]
async fn failed_batch_leaves_index_unchanged() {
    let app = build_pets_app(Some("secret"));
    let batch = r#"[{"id": 8, "text": "grey goose"}, {"id": 1, "text": "duplicate"}]"#;
    let (status, _) = call(&app, post_documents(batch, Some("secret"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, json) = get(&app, "/documents").await;
    assert_eq!(json["count"], 6);

    let (status, _) = call(&app, post_documents(r#"{"id": -3, "text": "goose"}"#, Some("secret"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn batch_with_repeated_id_is_rejected_whole() {
    let app = build_pets_app(Some("secret"));
    let batch = r#"[{"id": 8, "text": "grey goose"}, {"id": 9, "text": "white goose"}, {"id": 8, "text": "black goose"}]"#;
    let (status, _) = call(&app, post_documents(batch, Some("secret"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, json) = get(&app, "/search?q=goose").await;
    assert!(result_ids(&json).is_empty());

    let batch = r#"[{"id": 8, "text": "grey goose"}, {"id": 9, "text": "white goose"}]"#;
    let (status, json) = call(&app, post_documents(batch, Some("secret"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["added"], 2);
    let (_, json) = get(&app, "/documents").await;
    assert_eq!(json["ids"], serde_json::json!([1, 2, 3, 4, 5, 6, 8, 9]));
}

#[tokio::test]
async fn search_config_is_loaded_from_file() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("pets.jsonl");
    fs::write(&docs, DOCS).unwrap();
    let config = dir.path().join("search.json");
    fs::write(&config, r#"{"max_result_count": 2}"#).unwrap();
    let app = build_app(Settings { documents: Some(docs), config: Some(config), stop_words: "and in at".into(), ..Settings::default() }).unwrap();

    let (_, json) = get(&app, "/config").await;
    assert_eq!(json["max_result_count"], 2);
    assert_eq!(json["relevance_epsilon"], 1e-6);
    assert_eq!(json["stop_words"], serde_json::json!(["and", "at", "in"]));
    let (_, json) = get(&app, "/search?q=big%20dog").await;
    assert_eq!(result_ids(&json), vec![4, 5]);
}

#[tokio::test]
async fn zero_max_results_still_returns_a_hit() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("pets.jsonl");
    fs::write(&docs, DOCS).unwrap();
    let app = build_app(Settings { documents: Some(docs), max_results: Some(0), ..Settings::default() }).unwrap();

    let (_, json) = get(&app, "/search?q=big%20dog").await;
    assert_eq!(result_ids(&json).len(), 1);
    let (_, json) = get(&app, "/stats").await;
    assert_eq!(json["no_result_requests"], 0);
}
