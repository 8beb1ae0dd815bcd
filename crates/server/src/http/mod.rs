use axum::{Router, middleware::from_fn_with_state, routing::get};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utils_core::assets::upload_dir;

use crate::{AppState, routes};

pub mod auth;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(routes::users::protected_router())
        .merge(routes::workspaces::router(&state))
        .merge(routes::tasks::router(&state))
        .merge(routes::subtasks::router(&state))
        .merge(routes::documents::router(&state))
        .merge(routes::comments::router(&state))
        .merge(routes::notifications::router())
        .layer(from_fn_with_state(state.clone(), auth::require_auth));

    let api_routes = Router::new()
        .merge(routes::users::public_router())
        .merge(protected);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest_service("/uploads", ServeDir::new(upload_dir()))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::{AppState, test_support::test_state};

    async fn send(
        app: &axum::Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn register(app: &axum::Router, name: &str, email: &str) -> (String, String) {
        let (status, body) = send(
            app,
            "POST",
            "/api/users/register",
            None,
            Some(json!({ "name": name, "email": email, "password": "hunter22" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let token = body["data"]["token"].as_str().unwrap().to_string();
        let user_id = body["data"]["user"]["id"].as_str().unwrap().to_string();
        (token, user_id)
    }

    async fn setup() -> (AppState, axum::Router) {
        let state = test_state().await;
        let app = super::router(state.clone());
        (state, app)
    }

    #[tokio::test]
    async fn health_is_public() {
        let (_state, app) = setup().await;
        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let (_state, app) = setup().await;
        let (status, body) = send(&app, "GET", "/api/tasks", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Unauthorized"));
    }

    #[tokio::test]
    async fn register_login_profile_round_trip() {
        let (_state, app) = setup().await;
        let (_token, _) = register(&app, "Ada", "ada@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/users/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "hunter22" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["user"].get("password_hash").is_none());

        let token = body["data"]["token"].as_str().unwrap();
        let (status, body) = send(&app, "GET", "/api/users/profile", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], json!("ada@example.com"));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let (_state, app) = setup().await;
        register(&app, "Ada", "ada@example.com").await;

        let (status, _) = send(
            &app,
            "POST",
            "/api/users/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "wrong" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn workspace_detail_embeds_created_tasks() {
        let (_state, app) = setup().await;
        let (token, _) = register(&app, "Ada", "ada@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/workspaces",
            Some(&token),
            Some(json!({ "name": "Engineering" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let workspace_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "POST",
            "/api/tasks",
            Some(&token),
            Some(json!({ "workspace_id": workspace_id, "title": "Ship it" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["progress"], json!("To Do"));

        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/workspaces/{workspace_id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["tasks"][0]["title"], json!("Ship it"));
    }

    #[tokio::test]
    async fn out_of_range_priority_is_a_bad_request() {
        let (_state, app) = setup().await;
        let (token, _) = register(&app, "Ada", "ada@example.com").await;

        let (_, body) = send(
            &app,
            "POST",
            "/api/workspaces",
            Some(&token),
            Some(json!({ "name": "WS" })),
        )
        .await;
        let workspace_id = body["data"]["id"].as_str().unwrap();

        let (status, body) = send(
            &app,
            "POST",
            "/api/tasks",
            Some(&token),
            Some(json!({ "workspace_id": workspace_id, "title": "T", "priority": 7 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn only_the_author_may_edit_a_comment() {
        let (_state, app) = setup().await;
        let (author_token, _) = register(&app, "Ada", "ada@example.com").await;
        let (stranger_token, _) = register(&app, "Grace", "grace@example.com").await;

        let (_, body) = send(
            &app,
            "POST",
            "/api/workspaces",
            Some(&author_token),
            Some(json!({ "name": "WS" })),
        )
        .await;
        let workspace_id = body["data"]["id"].as_str().unwrap().to_string();
        let (_, body) = send(
            &app,
            "POST",
            "/api/tasks",
            Some(&author_token),
            Some(json!({ "workspace_id": workspace_id, "title": "T" })),
        )
        .await;
        let task_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "POST",
            "/api/comments",
            Some(&author_token),
            Some(json!({ "task_id": task_id, "content": "mine" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let comment_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/comments/{comment_id}"),
            Some(&stranger_token),
            Some(json!({ "content": "hijacked" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body["message"],
            json!("You can only modify your own comments")
        );

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/comments/{comment_id}"),
            Some(&author_token),
            Some(json!({ "content": "edited" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn assigning_a_task_notifies_the_assignee() {
        let (_state, app) = setup().await;
        let (actor_token, _) = register(&app, "Ada", "ada@example.com").await;
        let (assignee_token, assignee_id) = register(&app, "Grace", "grace@example.com").await;

        let (_, body) = send(
            &app,
            "POST",
            "/api/workspaces",
            Some(&actor_token),
            Some(json!({ "name": "WS" })),
        )
        .await;
        let workspace_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            "POST",
            "/api/tasks",
            Some(&actor_token),
            Some(json!({
                "workspace_id": workspace_id,
                "title": "Ship it",
                "assignees": [assignee_id]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            "GET",
            "/api/notifications",
            Some(&assignee_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"][0]["message"],
            json!("Ada assigned you a task: Ship it")
        );
        assert_eq!(body["data"][0]["notification_type"], json!("TASK_ASSIGNED"));
        assert_eq!(body["data"][0]["is_read"], json!(false));
    }

    #[tokio::test]
    async fn notifications_are_owner_scoped() {
        let (_state, app) = setup().await;
        let (actor_token, _) = register(&app, "Ada", "ada@example.com").await;
        let (assignee_token, assignee_id) = register(&app, "Grace", "grace@example.com").await;

        let (_, body) = send(
            &app,
            "POST",
            "/api/workspaces",
            Some(&actor_token),
            Some(json!({ "name": "WS" })),
        )
        .await;
        let workspace_id = body["data"]["id"].as_str().unwrap().to_string();
        send(
            &app,
            "POST",
            "/api/tasks",
            Some(&actor_token),
            Some(json!({
                "workspace_id": workspace_id,
                "title": "T",
                "assignees": [assignee_id]
            })),
        )
        .await;

        let (_, body) = send(
            &app,
            "GET",
            "/api/notifications",
            Some(&assignee_token),
            None,
        )
        .await;
        let notification_id = body["data"][0]["id"].as_str().unwrap().to_string();

        // The actor does not own this notification.
        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/notifications/{notification_id}/read"),
            Some(&actor_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/notifications/{notification_id}/read"),
            Some(&assignee_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_read"], json!(true));

        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/api/notifications/{notification_id}"),
            Some(&actor_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/api/notifications/{notification_id}"),
            Some(&assignee_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn unknown_task_returns_404() {
        let (_state, app) = setup().await;
        let (token, _) = register(&app, "Ada", "ada@example.com").await;

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/tasks/{}", uuid::Uuid::new_v4()),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn documents_are_not_owner_gated() {
        let (_state, app) = setup().await;
        let (author_token, _) = register(&app, "Ada", "ada@example.com").await;
        let (editor_token, _) = register(&app, "Grace", "grace@example.com").await;

        let (_, body) = send(
            &app,
            "POST",
            "/api/workspaces",
            Some(&author_token),
            Some(json!({ "name": "WS" })),
        )
        .await;
        let workspace_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "POST",
            "/api/documents",
            Some(&author_token),
            Some(json!({ "workspace_id": workspace_id, "title": "Notes" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let document_id = body["data"]["id"].as_str().unwrap().to_string();

        // Only comments are owner-gated; any authenticated user may edit.
        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/documents/{document_id}"),
            Some(&editor_token),
            Some(json!({ "title": "Shared notes" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], json!("Shared notes"));

        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/api/documents/{document_id}"),
            Some(&editor_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn register_accepts_a_multipart_form() {
        let (_state, app) = setup().await;

        let boundary = "form-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"name\"\r\n\r\nAda\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"email\"\r\n\r\nada@example.com\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"password\"\r\n\r\nhunter22\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"image\"; filename=\"avatar.png\"\r\n\
             Content-Type: image/png\r\n\r\nnot-really-a-png\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/users/register")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let image = body["data"]["user"]["image"].as_str().unwrap();
        assert!(image.starts_with("/uploads/"));
        assert!(image.ends_with(".png"));
        assert!(body["data"]["token"].as_str().is_some());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (_state, app) = setup().await;
        register(&app, "Ada", "ada@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/users/register",
            None,
            Some(json!({ "name": "Clone", "email": "ada@example.com", "password": "pw123456" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
    }
}
