/// Integration tests for the task API
///
/// The router runs in-process over an in-memory store:
/// - Authentication short-circuits
/// - Create/update/delete validation and ownership probes
/// - Batch reposition atomicity, including the unchecked-ownership case
/// - Public config and health endpoints

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::{DateTime, Duration, Utc};
use common::{expiring_token_for, token_for, TestContext};
use serde_json::json;
use uuid::Uuid;

fn id_of(task: &serde_json::Value) -> String {
    task["id"].as_str().unwrap().to_string()
}

fn timestamp(task: &serde_json::Value, key: &str) -> DateTime<Utc> {
    task[key].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_requests_without_credentials_are_401() {
    let ctx = TestContext::new();
    let id = Uuid::new_v4();

    let cases = [
        (Method::GET, "/api/tasks".to_string(), None),
        (Method::POST, "/api/tasks".to_string(), Some(json!({ "title": "x" }))),
        (Method::PUT, format!("/api/tasks/{}", id), Some(json!({ "title": "x" }))),
        (Method::DELETE, format!("/api/tasks/{}", id), None),
        (Method::POST, "/api/tasks/positions".to_string(), Some(json!({ "updates": [] }))),
    ];

    for (method, uri, body) in cases {
        let response = ctx.send_as(None, method.clone(), &uri, body).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(response.body["error"], "unauthorized");
    }

    assert_eq!(ctx.store.calls(), 0);
}

#[tokio::test]
async fn test_invalid_token_is_401_before_validation() {
    let ctx = TestContext::new();

    let response = ctx
        .send_as(Some("garbage"), Method::POST, "/api/tasks", Some(json!({ "title": "" })))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.store.calls(), 0);
}

#[tokio::test]
async fn test_create_task_with_defaults() {
    let ctx = TestContext::new();
    let someone_else = Uuid::new_v4();

    let response = ctx
        .send(
            Method::POST,
            "/api/tasks",
            Some(json!({ "title": "Write spec", "userId": someone_else })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let task = &response.body;
    assert_eq!(task["title"], "Write spec");
    assert_eq!(task["status"], "todo");
    assert_eq!(task["position"], 0);
    assert_eq!(task["userId"], ctx.user_id.to_string());
    assert!(Uuid::parse_str(&id_of(task)).is_ok());
    assert_eq!(timestamp(task, "createdAt"), timestamp(task, "updatedAt"));
}

#[tokio::test]
async fn test_create_keeps_declared_status_and_position() {
    let ctx = TestContext::new();

    let task = ctx
        .create_task(&ctx.token, json!({ "title": "Ship", "status": "doing", "position": 4 }))
        .await;

    assert_eq!(task["status"], "doing");
    assert_eq!(task["position"], 4);
}

#[tokio::test]
async fn test_invalid_create_never_reaches_store() {
    let ctx = TestContext::new();
    let long_title = "x".repeat(201);

    let cases = [
        (json!({ "title": "" }), "title"),
        (json!({}), "title"),
        (json!({ "title": long_title }), "title"),
        (json!({ "title": "ok", "status": "blocked" }), "status"),
        (json!({ "title": "ok", "position": -1 }), "position"),
        (json!({ "title": null }), "title"),
        (json!({ "title": "ok", "status": null }), "status"),
    ];

    for (body, field) in cases {
        let response = ctx.send(Method::POST, "/api/tasks", Some(body.clone())).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(response.body["error"], "validation_error");
        assert_eq!(response.issue_fields(), vec![field.to_string()], "{}", body);
    }

    assert_eq!(ctx.store.writes(), 0);
    assert!(ctx.list(&ctx.token).await.is_empty());
}

#[tokio::test]
async fn test_title_of_exactly_200_chars_is_accepted() {
    let ctx = TestContext::new();
    let task = ctx.create_task(&ctx.token, json!({ "title": "é".repeat(200) })).await;
    assert_eq!(task["title"].as_str().unwrap().chars().count(), 200);
}

#[tokio::test]
async fn test_malformed_body_is_body_issue() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/tasks")
        .header(header::AUTHORIZATION, ctx.auth_header())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let response = ctx.dispatch(request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.issue_fields(), vec!["body".to_string()]);

    let wrong_type = ctx.send(Method::POST, "/api/tasks", Some(json!({ "title": 42 }))).await;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_type.issue_fields(), vec!["body".to_string()]);

    assert_eq!(ctx.store.writes(), 0);
}

#[tokio::test]
async fn test_write_spec_scenario() {
    let ctx = TestContext::new();

    let task = ctx
        .create_task(&ctx.token, json!({ "title": "Write spec", "status": "todo", "position": 0 }))
        .await;
    assert_eq!(task["status"], "todo");
    let id = id_of(&task);

    let updated = ctx
        .send(Method::PUT, &format!("/api/tasks/{}", id), Some(json!({ "status": "doing" })))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["status"], "doing");
    assert_eq!(updated.body["title"], "Write spec");

    let moved = ctx
        .send(
            Method::POST,
            "/api/tasks/positions",
            Some(json!({ "updates": [{ "id": id, "status": "done", "position": 0 }] })),
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK);
    assert_eq!(moved.body, json!({ "success": true }));

    let tasks = ctx.list(&ctx.token).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["status"], "done");
    assert_eq!(tasks[0]["position"], 0);
}

#[tokio::test]
async fn test_swap_within_column() {
    let ctx = TestContext::new();
    let a = ctx.create_task(&ctx.token, json!({ "title": "A", "position": 0 })).await;
    let b = ctx.create_task(&ctx.token, json!({ "title": "B", "position": 1 })).await;

    let response = ctx
        .send(
            Method::POST,
            "/api/tasks/positions",
            Some(json!({ "updates": [
                { "id": id_of(&a), "status": "todo", "position": 1 },
                { "id": id_of(&b), "status": "todo", "position": 0 },
            ] })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let titles: Vec<_> = ctx
        .list(&ctx.token)
        .await
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["B", "A"]);
}

#[tokio::test]
async fn test_reposition_ignores_ownership() {
    let ctx = TestContext::new();
    let other_user = Uuid::new_v4();
    let other_token = token_for(other_user);

    let foreign = ctx.create_task(&other_token, json!({ "title": "Not mine" })).await;

    let response = ctx
        .send(
            Method::POST,
            "/api/tasks/positions",
            Some(json!({ "updates": [{ "id": id_of(&foreign), "status": "done", "position": 7 }] })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let theirs = ctx.list(&other_token).await;
    assert_eq!(theirs[0]["status"], "done");
    assert_eq!(theirs[0]["position"], 7);
    assert_eq!(theirs[0]["userId"], other_user.to_string());
}

#[tokio::test]
async fn test_reposition_with_missing_id_changes_nothing() {
    let ctx = TestContext::new();
    let a = ctx.create_task(&ctx.token, json!({ "title": "A" })).await;

    let response = ctx
        .send(
            Method::POST,
            "/api/tasks/positions",
            Some(json!({ "updates": [
                { "id": id_of(&a), "status": "done", "position": 3 },
                { "id": Uuid::new_v4(), "status": "done", "position": 4 },
            ] })),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let tasks = ctx.list(&ctx.token).await;
    assert_eq!(tasks[0]["status"], "todo");
    assert_eq!(tasks[0]["position"], 0);
}

#[tokio::test]
async fn test_reposition_validation_paths() {
    let ctx = TestContext::new();
    let a = ctx.create_task(&ctx.token, json!({ "title": "A" })).await;
    let writes_before = ctx.store.writes();

    let response = ctx
        .send(
            Method::POST,
            "/api/tasks/positions",
            Some(json!({ "updates": [
                { "id": id_of(&a), "status": "done", "position": 0 },
                { "id": "nope", "status": "later", "position": -2 },
            ] })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.issue_fields(),
        vec!["updates[1].id", "updates[1].position", "updates[1].status"]
    );
    assert_eq!(ctx.store.writes(), writes_before);
}

#[tokio::test]
async fn test_empty_reposition_batch_succeeds() {
    let ctx = TestContext::new();
    let response = ctx
        .send(Method::POST, "/api/tasks/positions", Some(json!({ "updates": [] })))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
}

#[tokio::test]
async fn test_update_partial_and_empty() {
    let ctx = TestContext::new();
    let task = ctx
        .create_task(&ctx.token, json!({ "title": "Draft", "status": "doing", "position": 2 }))
        .await;
    let uri = format!("/api/tasks/{}", id_of(&task));

    let renamed = ctx.send(Method::PUT, &uri, Some(json!({ "title": "Final" }))).await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["title"], "Final");
    assert_eq!(renamed.body["status"], "doing");
    assert_eq!(renamed.body["position"], 2);

    let untouched = ctx.send(Method::PUT, &uri, Some(json!({}))).await;
    assert_eq!(untouched.status, StatusCode::OK);
    assert_eq!(untouched.body["title"], "Final");
    assert_eq!(untouched.body["status"], "doing");
    assert_eq!(untouched.body["position"], 2);
    assert_eq!(untouched.body["createdAt"], task["createdAt"]);
    assert!(timestamp(&untouched.body, "updatedAt") >= timestamp(&renamed.body, "updatedAt"));
}

#[tokio::test]
async fn test_update_rejects_invalid_fields() {
    let ctx = TestContext::new();
    let task = ctx.create_task(&ctx.token, json!({ "title": "Keep" })).await;
    let uri = format!("/api/tasks/{}", id_of(&task));
    let writes_before = ctx.store.writes();

    let response = ctx
        .send(Method::PUT, &uri, Some(json!({ "title": "", "status": "archived" })))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.issue_fields(), vec!["status", "title"]);
    assert_eq!(ctx.store.writes(), writes_before);
}

#[tokio::test]
async fn test_update_and_delete_missing_or_foreign_are_404() {
    let ctx = TestContext::new();
    let other_token = token_for(Uuid::new_v4());
    let foreign = ctx.create_task(&other_token, json!({ "title": "Theirs" })).await;
    let writes_before = ctx.store.writes();

    let targets = [
        format!("/api/tasks/{}", Uuid::new_v4()),
        format!("/api/tasks/{}", id_of(&foreign)),
        "/api/tasks/not-a-uuid".to_string(),
    ];

    for uri in &targets {
        let update = ctx.send(Method::PUT, uri, Some(json!({ "title": "Mine now" }))).await;
        assert_eq!(update.status, StatusCode::NOT_FOUND, "PUT {}", uri);
        assert_eq!(update.body["error"], "not_found");

        let delete = ctx.send(Method::DELETE, uri, None).await;
        assert_eq!(delete.status, StatusCode::NOT_FOUND, "DELETE {}", uri);
    }

    assert_eq!(ctx.store.writes(), writes_before);
    assert_eq!(ctx.list(&other_token).await[0]["title"], "Theirs");
}

#[tokio::test]
async fn test_delete_twice() {
    let ctx = TestContext::new();
    let task = ctx.create_task(&ctx.token, json!({ "title": "Temporary" })).await;
    let uri = format!("/api/tasks/{}", id_of(&task));

    let first = ctx.send(Method::DELETE, &uri, None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["id"], task["id"]);
    assert_eq!(first.body["title"], "Temporary");

    let second = ctx.send(Method::DELETE, &uri, None).await;
    assert_eq!(second.status, StatusCode::NOT_FOUND);

    assert!(ctx.list(&ctx.token).await.is_empty());
}

#[tokio::test]
async fn test_list_is_scoped_and_ordered() {
    let ctx = TestContext::new();
    let other_token = token_for(Uuid::new_v4());

    ctx.create_task(&ctx.token, json!({ "title": "todo-1", "status": "todo", "position": 1 })).await;
    ctx.create_task(&ctx.token, json!({ "title": "done-0", "status": "done", "position": 0 })).await;
    ctx.create_task(&ctx.token, json!({ "title": "todo-0", "status": "todo", "position": 0 })).await;
    ctx.create_task(&ctx.token, json!({ "title": "doing-5", "status": "doing", "position": 5 })).await;
    ctx.create_task(&other_token, json!({ "title": "foreign" })).await;

    let titles: Vec<_> = ctx
        .list(&ctx.token)
        .await
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(titles, vec!["doing-5", "done-0", "todo-0", "todo-1"]);
}

#[tokio::test]
async fn test_session_cookie_authenticates_and_refreshes() {
    let ctx = TestContext::new();

    let fresh = Request::builder()
        .uri("/api/tasks")
        .header(header::COOKIE, format!("taskboard_session={}", ctx.token))
        .body(Body::empty())
        .unwrap();
    let response = ctx.dispatch(fresh).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.headers.get(header::SET_COOKIE).is_none());

    let expiring = expiring_token_for(ctx.user_id, Duration::minutes(10));
    let request = Request::builder()
        .uri("/api/tasks")
        .header(header::COOKIE, format!("theme=dark; taskboard_session={}", expiring))
        .body(Body::empty())
        .unwrap();
    let response = ctx.dispatch(request).await;

    assert_eq!(response.status, StatusCode::OK);
    let set_cookie = response.headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("taskboard_session="));
    assert!(set_cookie.contains("Max-Age=86400"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_public_config() {
    let unset = TestContext::new();
    let response = unset.send_as(None, Method::GET, "/api/config", None).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "internal_error");

    let ctx = TestContext::with_vars(&[
        ("AUTH_URL", "https://auth.example.com"),
        ("AUTH_PUBLIC_KEY", "pk_test_123"),
    ]);
    let response = ctx.send_as(None, Method::GET, "/api/config", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({ "authUrl": "https://auth.example.com", "authPublicKey": "pk_test_123" })
    );
    assert_eq!(
        response.headers.get(header::CACHE_CONTROL).unwrap(),
        "public, s-maxage=3600, stale-while-revalidate=86400"
    );
}

#[tokio::test]
async fn test_health_is_public() {
    let ctx = TestContext::new();
    let response = ctx.send_as(None, Method::GET, "/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["store"], "connected");
    assert_eq!(response.headers.get("X-Content-Type-Options").unwrap(), "nosniff");
}
