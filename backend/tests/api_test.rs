use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use chrono::NaiveDate;
use course_backend::api::router;
use course_backend::state::AppState;
use course_backend::store::memory::InMemoryCourseStore;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    let mut state = AppState::new(Arc::new(InMemoryCourseStore::new()));
    state.clock = Arc::new(|| NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
    router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .expect("request failed");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response is not json")
    };
    (status, value)
}

async fn create(app: &Router, body: Value) -> String {
    let (status, created) = send(app, Method::POST, "/api/courses", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    created["id"].as_str().expect("id in response").to_string()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, _) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_and_get() {
    let app = app();
    let id = create(
        &app,
        json!({
            "title": "Knife Skills",
            "priorityLevel": "high",
            "targetDate": "2026-11-01",
            "content": ["Claw grip", "Rock chop"]
        }),
    )
    .await;

    let (status, course) = send(&app, Method::GET, &format!("/api/courses/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(course["title"], "Knife Skills");
    assert_eq!(course["targetDate"], "2026-11-01");
    assert_eq!(course["content"], json!(["Claw grip", "Rock chop"]));
    assert_eq!(course["completed"], false);
    assert_eq!(course["archived"], false);
}

#[tokio::test]
async fn test_list_filters_and_pages() {
    let app = app();
    create(&app, json!({"title": "Knife Skills", "priorityLevel": "high"})).await;
    create(&app, json!({"title": "Bread", "priorityLevel": "high"})).await;
    create(&app, json!({"title": "Soup", "priorityLevel": "low"})).await;

    let (status, page) = send(&app, Method::GET, "/api/courses?title=KNIFE", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalElements"], 1);
    assert_eq!(page["content"][0]["title"], "Knife Skills");

    let (_, page) = send(
        &app,
        Method::GET,
        "/api/courses?priorityLevel=high&size=1&page=1&sort=title,desc",
        None,
    )
    .await;
    assert_eq!(page["totalElements"], 2);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["number"], 1);
    assert_eq!(page["size"], 1);
    assert_eq!(page["content"].as_array().unwrap().len(), 1);
    assert_eq!(page["content"][0]["title"], "Bread");
}

#[tokio::test]
async fn test_list_rejects_bad_input() {
    let app = app();
    for uri in [
        "/api/courses?targetDate=15-10-2026",
        "/api/courses?size=0",
        "/api/courses?page=-1",
        "/api/courses?sort=secret,asc",
        "/api/courses?sort=title,up",
        "/api/courses?page=abc",
        "/api/courses?includeArchived=maybe",
    ] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], "400 Bad Request", "{}", uri);
        assert!(body["message"].is_string());
    }
}

#[tokio::test]
async fn test_update_archive_complete_delete() {
    let app = app();
    let id = create(&app, json!({"title": "Soup", "summary": "hot"})).await;
    let path = format!("/api/courses/{}", id);

    let (status, course) = send(
        &app,
        Method::PUT,
        &path,
        Some(json!({"title": "Stock", "archived": true, "completed": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(course["title"], "Stock");
    assert_eq!(course["summary"], "");
    assert_eq!(course["archived"], false);
    assert_eq!(course["completed"], false);

    let (status, course) = send(&app, Method::PATCH, &format!("{}/archive", path), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(course["archived"], true);

    let (_, page) = send(&app, Method::GET, "/api/courses", None).await;
    assert_eq!(page["totalElements"], 0);
    let (_, page) = send(&app, Method::GET, "/api/courses?includeArchived=true", None).await;
    assert_eq!(page["totalElements"], 1);

    // completed defaults to true
    let (status, course) = send(&app, Method::PATCH, &format!("{}/complete", path), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(course["completed"], true);
    assert_eq!(course["completedDate"], "2026-10-15");

    let (_, course) = send(
        &app,
        Method::PATCH,
        &format!("{}/complete?completed=false", path),
        None,
    )
    .await;
    assert_eq!(course["completed"], false);
    assert_eq!(course["completedDate"], Value::Null);

    let (status, body) = send(&app, Method::DELETE, &path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Course deleted permanently");

    let (status, body) = send(&app, Method::GET, &path, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "404 Not Found");
}

#[tokio::test]
async fn test_missing_id_is_not_found() {
    let app = app();
    let path = "/api/courses/does-not-exist";

    let (status, _) = send(&app, Method::PUT, path, Some(json!({"title": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::PATCH, &format!("{}/archive", path), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::PATCH, &format!("{}/complete", path), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, path, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_weekly_completions() {
    let app = app();
    let id = create(&app, json!({"title": "Soup"})).await;
    send(&app, Method::PATCH, &format!("/api/courses/{}/complete", id), None).await;

    let (status, summary) = send(&app, Method::GET, "/api/stats/weekly-completions", None).await;
    assert_eq!(status, StatusCode::OK);
    let weeks = summary.as_array().unwrap();
    assert_eq!(weeks.len(), 6);
    assert_eq!(weeks[0]["weekStart"], "2026-09-07");
    assert_eq!(weeks[5]["weekStart"], "2026-10-12");
    assert_eq!(weeks[5]["count"], 1);

    let (status, _) = send(&app, Method::GET, "/api/stats/weekly-completions?weeks=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, Method::GET, "/api/stats/weekly-completions?weeks=53", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = send(&app, Method::GET, "/api/stats/weekly-completions?weeks=six", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_cors_headers() {
    let app = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/courses")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
