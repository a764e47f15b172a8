// app.rs - Shared request state and the HTTP router

use std::sync::Arc;

use axum::{
    extract::State,
    handler::Handler,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::access::RoleSet;
use crate::auth::{Argon2Verifier, CredentialVerifier, TokenCodec};
use crate::config::AppConfig;
use crate::database::Stores;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{authenticate, require_roles};

/// Everything a handler needs, cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenCodec>,
    pub credentials: Arc<dyn CredentialVerifier>,
    pub stores: Stores,
}

impl AppState {
    pub fn new(tokens: TokenCodec, stores: Stores) -> Self {
        Self {
            tokens: Arc::new(tokens),
            credentials: Arc::new(Argon2Verifier::new()),
            stores,
        }
    }

    /// Builds the token codec from the configured secret and lifetime.
    pub fn from_config(config: &AppConfig, stores: Stores) -> anyhow::Result<Self> {
        let secret = config.jwt_secret()?;
        let tokens = TokenCodec::new(secret.as_bytes(), config.token_ttl()?)?;
        Ok(Self::new(tokens, stores))
    }
}

pub fn router(state: AppState, config: &AppConfig) -> Router {
    let authenticated = from_fn_with_state(state.tokens.clone(), authenticate);
    let any_role = from_fn_with_state(RoleSet::AUTHENTICATED, require_roles);
    let admin_only = from_fn_with_state(RoleSet::ADMIN, require_roles);
    let staff_only = from_fn_with_state(RoleSet::STAFF, require_roles);

    let admin = Router::new()
        .route("/api/users", get(elevated::user_list))
        .route("/api/users/:id", delete(elevated::user_delete))
        .route("/api/users/:id/role", put(elevated::user_role_put))
        .route_layer(admin_only.clone());

    let staff = Router::new()
        .route("/api/comments/:id", delete(protected::comment_delete))
        .route_layer(staff_only);

    let protected = Router::new()
        .route("/api/auth/me", get(protected::whoami_get))
        .route("/api/tickets", post(protected::ticket_create).get(protected::ticket_list))
        .route(
            "/api/tickets/:id",
            get(protected::ticket_get)
                .put(protected::ticket_update)
                .delete(protected::ticket_delete.layer(admin_only)),
        )
        .route(
            "/api/tickets/:id/comments",
            post(protected::comment_create).get(protected::comment_list),
        )
        .merge(admin)
        .merge(staff)
        .route_layer(any_role)
        .route_layer(authenticated);

    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/auth/register", post(public::register_post))
        .route("/api/auth/login", post(public::login_post))
        .merge(protected)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        app = app.layer(CorsLayer::permissive());
    }
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }
    app
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Helpdesk API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "health": "/health (public)",
                "auth": "/api/auth/register, /api/auth/login (public), /api/auth/me (authenticated)",
                "tickets": "/api/tickets[/:id] (authenticated, delete requires admin)",
                "comments": "/api/tickets/:id/comments (authenticated), /api/comments/:id (admin, operator)",
                "users": "/api/users[/:id[/role]] (admin)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.stores.health.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::access::Role;
    use crate::auth::Identity;
    use crate::database::models::NewUser;
    use crate::database::MemoryStore;

    struct TestApp {
        router: Router,
        state: AppState,
    }

    impl TestApp {
        fn new() -> Self {
            let tokens = TokenCodec::with_default_ttl(b"router-test-secret").unwrap();
            let state = AppState::new(tokens, Stores::from_backend(Arc::new(MemoryStore::new())));
            let router = router(state.clone(), &AppConfig::development());
            Self { router, state }
        }

        /// Inserts a user directly and returns (id, token).
        async fn seed(&self, name: &str, role: Role) -> (i64, String) {
            let user = self
                .state
                .stores
                .users
                .create(NewUser {
                    username: name.to_string(),
                    email: format!("{}@example.com", name),
                    password_hash: "unused".to_string(),
                    role,
                })
                .await
                .unwrap();
            let token = self.state.tokens.issue(&Identity::new(user.id, role)).unwrap();
            (user.id, token)
        }

        async fn send(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut request = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            let request = match body {
                Some(body) => request
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => request.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, json)
        }

        async fn create_ticket(&self, token: &str, title: &str) -> i64 {
            let (status, body) = self
                .send(
                    Method::POST,
                    "/api/tickets",
                    Some(token),
                    Some(json!({"title": title, "description": "details"})),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
            body["data"]["id"].as_i64().unwrap()
        }
    }

    #[tokio::test]
    async fn register_always_creates_plain_user_and_login_works() {
        let app = TestApp::new();

        let (status, body) = app
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({"username": "eve", "email": "eve@x.io", "password": "pw", "role": "admin"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["user"]["role"], "user");
        assert!(body["data"]["user"].get("password_hash").is_none());

        let token = body["data"]["token"].as_str().unwrap().to_string();
        let (status, _) = app.send(Method::GET, "/api/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"email": "eve@x.io", "password": "pw"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["user"]["username"], "eve");

        let (status, body) = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"email": "eve@x.io", "password": "wrong"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid credentials");

        let (status, body) = app
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({"username": "eve2", "email": "eve@x.io", "password": "pw"})),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "user already exists or invalid data");
    }

    #[tokio::test]
    async fn register_requires_all_fields() {
        let app = TestApp::new();
        let (status, body) = app
            .send(Method::POST, "/api/auth/register", None, Some(json!({"email": "a@b.c"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "username, email and password are required");
    }

    #[tokio::test]
    async fn protected_routes_require_a_valid_token() {
        let app = TestApp::new();
        let (_, token) = app.seed("al", Role::User).await;

        let (status, body) = app.send(Method::GET, "/api/tickets", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let forged = TokenCodec::with_default_ttl(b"someone-else")
            .unwrap()
            .issue(&Identity::new(1, Role::Admin))
            .unwrap();
        let (status, _) = app.send(Method::GET, "/api/users", Some(&forged), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = app.send(Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["role"], "user");
    }

    #[tokio::test]
    async fn users_only_see_their_own_tickets() {
        let app = TestApp::new();
        let (_, u1) = app.seed("u1", Role::User).await;
        let (_, u2) = app.seed("u2", Role::User).await;
        let (_, op) = app.seed("op", Role::Operator).await;

        let id = app.create_ticket(&u1, "Printer").await;

        let (status, body) = app.send(Method::GET, &format!("/api/tickets/{}", id), Some(&u2), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");

        let (_, body) = app.send(Method::GET, "/api/tickets", Some(&u2), None).await;
        assert_eq!(body["data"], json!([]));

        let (_, body) = app.send(Method::GET, "/api/tickets", Some(&op), None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, body) = app.send(Method::GET, &format!("/api/tickets/{}", id), Some(&u1), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "open");
        assert_eq!(body["data"]["priority"], "medium");
        assert_eq!(body["data"]["author_name"], "u1");

        let (status, _) = app.send(Method::GET, "/api/tickets/9999", Some(&u1), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = app.send(Method::GET, "/api/tickets/abc", Some(&u1), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid id");
    }

    #[tokio::test]
    async fn staff_read_any_ticket_with_every_field() {
        let app = TestApp::new();
        let (u1_id, u1) = app.seed("u1", Role::User).await;
        let (_, op) = app.seed("op", Role::Operator).await;
        let id = app.create_ticket(&u1, "Printer").await;

        let (status, body) = app.send(Method::GET, &format!("/api/tickets/{}", id), Some(&op), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let ticket = body["data"].as_object().unwrap();
        for field in [
            "id",
            "title",
            "description",
            "status",
            "priority",
            "author_id",
            "author_name",
            "assigned_to",
            "assignee_name",
            "created_at",
            "updated_at",
        ] {
            assert!(ticket.contains_key(field), "missing {}", field);
        }
        assert_eq!(ticket["id"], id);
        assert_eq!(ticket["title"], "Printer");
        assert_eq!(ticket["author_id"], u1_id);
        assert_eq!(ticket["author_name"], "u1");
        assert_eq!(ticket["status"], "open");
        assert_eq!(ticket["assigned_to"], Value::Null);
        assert_eq!(ticket["assignee_name"], Value::Null);
    }

    #[tokio::test]
    async fn other_users_cannot_edit_a_ticket() {
        let app = TestApp::new();
        let (_, u1) = app.seed("u1", Role::User).await;
        let (_, u2) = app.seed("u2", Role::User).await;
        let id = app.create_ticket(&u1, "Printer").await;
        let uri = format!("/api/tickets/{}", id);

        let (status, body) = app
            .send(Method::PUT, &uri, Some(&u2), Some(json!({"title": "mine now"})))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");

        let (_, body) = app.send(Method::GET, &uri, Some(&u1), None).await;
        assert_eq!(body["data"]["title"], "Printer");
    }

    #[tokio::test]
    async fn owner_status_text_is_ignored_even_when_unknown() {
        let app = TestApp::new();
        let (_, u1) = app.seed("u1", Role::User).await;
        let id = app.create_ticket(&u1, "Printer").await;

        let (status, body) = app
            .send(
                Method::PUT,
                &format!("/api/tickets/{}", id),
                Some(&u1),
                Some(json!({"title": "x", "status": "done", "assigned_to": 999})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "x");
        assert_eq!(body["data"]["status"], "open");
        assert_eq!(body["data"]["assigned_to"], Value::Null);
    }

    #[tokio::test]
    async fn owner_edits_stop_once_staff_moves_the_ticket() {
        let app = TestApp::new();
        let (_, u1) = app.seed("u1", Role::User).await;
        let (_, op) = app.seed("op", Role::Operator).await;
        let id = app.create_ticket(&u1, "Printer").await;
        let uri = format!("/api/tickets/{}", id);

        let (status, body) = app
            .send(Method::PUT, &uri, Some(&u1), Some(json!({"title": "Printer on fire", "status": "closed"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Printer on fire");
        assert_eq!(body["data"]["status"], "open");

        let (status, body) = app
            .send(Method::PUT, &uri, Some(&op), Some(json!({"status": "in_progress"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "in_progress");

        let (status, body) = app
            .send(Method::PUT, &uri, Some(&u1), Some(json!({"title": "Still burning"})))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "can only edit open tickets");

        // Owner gets the state error even when the body is malformed.
        let (status, _) = app
            .send(Method::PUT, &uri, Some(&u1), Some(json!({"priority": "urgent"})))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        for status_value in ["closed", "open"] {
            let (status, body) = app
                .send(Method::PUT, &uri, Some(&op), Some(json!({"status": status_value})))
                .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["status"], status_value);
        }

        let (status, _) = app
            .send(Method::PUT, &uri, Some(&u1), Some(json!({"description": "Reopened"})))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_update_changes_nothing() {
        let app = TestApp::new();
        let (_, op) = app.seed("op", Role::Operator).await;
        let id = app.create_ticket(&op, "Desk").await;
        let uri = format!("/api/tickets/{}", id);

        let (_, before) = app.send(Method::GET, &uri, Some(&op), None).await;
        let (status, after) = app.send(Method::PUT, &uri, Some(&op), Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        for field in ["title", "description", "status", "priority", "assigned_to"] {
            assert_eq!(before["data"][field], after["data"][field]);
        }
    }

    #[tokio::test]
    async fn staff_assign_and_unassign() {
        let app = TestApp::new();
        let (_, u1) = app.seed("u1", Role::User).await;
        let (op_id, op) = app.seed("op", Role::Operator).await;
        let id = app.create_ticket(&u1, "VPN").await;
        let uri = format!("/api/tickets/{}", id);

        let (status, body) = app
            .send(Method::PUT, &uri, Some(&op), Some(json!({"assigned_to": 424242})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field_errors"]["assigned_to"], "user does not exist");

        let (_, body) = app
            .send(Method::PUT, &uri, Some(&op), Some(json!({"assigned_to": op_id})))
            .await;
        assert_eq!(body["data"]["assigned_to"], op_id);
        assert_eq!(body["data"]["assignee_name"], "op");

        // Ignored for the owner.
        let (_, body) = app
            .send(Method::PUT, &uri, Some(&u1), Some(json!({"assigned_to": null})))
            .await;
        assert_eq!(body["data"]["assigned_to"], op_id);

        let (_, body) = app
            .send(Method::PUT, &uri, Some(&op), Some(json!({"assigned_to": null})))
            .await;
        assert_eq!(body["data"]["assigned_to"], Value::Null);
    }

    #[tokio::test]
    async fn create_ticket_validates_input() {
        let app = TestApp::new();
        let (_, u1) = app.seed("u1", Role::User).await;

        let (status, body) = app
            .send(Method::POST, "/api/tickets", Some(&u1), Some(json!({"title": "No description"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "title and description are required");

        let (status, _) = app
            .send(
                Method::POST,
                "/api/tickets",
                Some(&u1),
                Some(json!({"title": "t", "description": "d", "priority": "urgent"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .send(
                Method::POST,
                "/api/tickets",
                Some(&u1),
                Some(json!({"title": "t", "description": "d", "priority": "critical"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["priority"], "critical");
    }

    #[tokio::test]
    async fn ticket_delete_is_admin_only() {
        let app = TestApp::new();
        let (_, u1) = app.seed("u1", Role::User).await;
        let (_, op) = app.seed("op", Role::Operator).await;
        let (_, admin) = app.seed("root", Role::Admin).await;
        let id = app.create_ticket(&u1, "Old").await;
        let uri = format!("/api/tickets/{}", id);

        for token in [&u1, &op] {
            let (status, _) = app.send(Method::DELETE, &uri, Some(token), None).await;
            assert_eq!(status, StatusCode::FORBIDDEN);
        }

        let (status, body) = app.send(Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = app.send(Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn comments_follow_ticket_access() {
        let app = TestApp::new();
        let (_, u1) = app.seed("u1", Role::User).await;
        let (_, u2) = app.seed("u2", Role::User).await;
        let (_, op) = app.seed("op", Role::Operator).await;
        let id = app.create_ticket(&u1, "Mail").await;
        let uri = format!("/api/tickets/{}/comments", id);

        let (status, _) = app
            .send(Method::POST, &uri, Some(&u2), Some(json!({"content": "me too"})))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.send(Method::GET, &uri, Some(&u2), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");

        let (status, body) = app.send(Method::POST, &uri, Some(&u1), Some(json!({"content": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "content is required");

        let (status, body) = app
            .send(Method::POST, &uri, Some(&u1), Some(json!({"content": "any news?"})))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["username"], "u1");
        let comment_id = body["data"]["id"].as_i64().unwrap();

        let (_, body) = app.send(Method::GET, &uri, Some(&op), None).await;
        assert_eq!(body["data"][0]["content"], "any news?");

        let (status, _) = app
            .send(Method::GET, "/api/tickets/777/comments", Some(&op), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let comment_uri = format!("/api/comments/{}", comment_id);
        let (status, _) = app.send(Method::DELETE, &comment_uri, Some(&u1), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.send(Method::DELETE, &comment_uri, Some(&op), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = app.send(Method::DELETE, &comment_uri, Some(&op), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn admin_manages_users() {
        let app = TestApp::new();
        let (u1_id, u1) = app.seed("u1", Role::User).await;
        let (_, op) = app.seed("op", Role::Operator).await;
        let (_, admin) = app.seed("root", Role::Admin).await;

        let (status, _) = app.send(Method::GET, "/api/users", Some(&op), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.send(Method::GET, "/api/users", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 3);

        let role_uri = format!("/api/users/{}/role", u1_id);
        let (status, body) = app
            .send(Method::PUT, &role_uri, Some(&admin), Some(json!({"role": "superuser"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid role");

        let (status, body) = app
            .send(Method::PUT, &role_uri, Some(&admin), Some(json!({"role": "operator"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({"status": "ok"}));

        // The old token still carries the old role.
        let (_, body) = app.send(Method::GET, "/api/auth/me", Some(&u1), None).await;
        assert_eq!(body["data"]["role"], "user");

        let (status, _) = app
            .send(Method::DELETE, &format!("/api/users/{}", u1_id), Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.send(Method::DELETE, "/api/users/9999", Some(&admin), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn health_and_root_are_public() {
        let app = TestApp::new();
        let (status, body) = app.send(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");

        let (status, body) = app.send(Method::GET, "/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Helpdesk API");
    }
}
