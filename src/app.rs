use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::handlers;
use crate::middleware::{inject_context, must_login, require_numeric_id};

/// Everything the middleware chain hands to requests
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: PgPool,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let sessions = SessionStore::new(&config.session);
        Self {
            config: Arc::new(config),
            pool,
            sessions,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();
    let enable_cors = state.config.server.enable_cors;

    let router = Router::new()
        .merge(page_routes())
        .merge(account_routes())
        .merge(user_routes())
        // Static files must come last so every route above wins
        .fallback_service(ServeDir::new(static_dir))
        .layer(from_fn_with_state(state, inject_context))
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

fn page_routes() -> Router {
    Router::new()
        .route("/", get(handlers::get_home).post(handlers::get_home))
        .route("/health", get(handlers::health))
        .route("/submit", get(handlers::get_submit).post(handlers::post_submit))
        .route("/history", get(handlers::get_history).post(handlers::post_history))
        .route("/words", get(handlers::get_words).post(handlers::post_words))
        .route("/queuerater", get(handlers::get_curator).post(handlers::post_curator))
        .route("/about", get(handlers::get_about).post(handlers::post_about))
}

fn account_routes() -> Router {
    Router::new()
        .route("/signup", get(handlers::get_signup).post(handlers::post_signup))
        .route("/login", get(handlers::get_login).post(handlers::post_login))
        .route("/logout", get(handlers::get_logout).post(handlers::get_logout))
}

/// User mutation is the one route group behind the login gate. The id check
/// wraps the gate, so malformed ids are 404 whether or not anyone is logged in.
fn user_routes() -> Router {
    Router::new()
        .route(
            "/users/:id",
            post(handlers::post_put_delete_users_id)
                .put(handlers::post_put_delete_users_id)
                .delete(handlers::post_put_delete_users_id),
        )
        .route_layer(from_fn(must_login))
        .route_layer(from_fn(require_numeric_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::auth::Session;
    use crate::database::models::SessionUser;
    use crate::database::DatabaseManager;

    fn test_state() -> AppState {
        let mut config = AppConfig::development();
        // Nothing listens here; routes that reach the database fail fast
        config.database.url = "postgres://nobody@127.0.0.1:1/punocracy".to_string();
        config.database.connection_timeout = 1;
        config.server.static_dir = std::env::temp_dir().join("punocracy-static-missing");
        let pool = DatabaseManager::connect_lazy(&config.database).unwrap();
        AppState::new(config, pool)
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn session_cookie(state: &AppState, user_id: i64) -> String {
        let mut session = Session::new();
        session
            .set_user(&SessionUser { id: user_id, email: "someone@example.com".to_string() })
            .unwrap();
        let header = state.sessions.save(&session).unwrap();
        header.to_str().unwrap().split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn user_routes_require_login() {
        let app = router(test_state());

        for method in [Method::POST, Method::PUT, Method::DELETE] {
            let response = app
                .clone()
                .oneshot(Request::builder().method(method).uri("/users/1").body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let body = json_body(response).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["code"], "UNAUTHORIZED");
        }
    }

    #[tokio::test]
    async fn forged_session_is_rejected_by_gate() {
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/users/1")
                    .header(header::COOKIE, "punocracy-session=e30.deadbeef")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logged_in_user_cannot_touch_other_accounts() {
        let state = test_state();
        let cookie = session_cookie(&state, 5);
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/users/6")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn non_numeric_user_id_is_not_found() {
        let state = test_state();
        let cookie = session_cookie(&state, 5);
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri("/users/abc")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_numeric_user_id_is_not_found_before_login_gate() {
        let app = router(test_state());
        for method in [Method::POST, Method::PUT, Method::DELETE] {
            let response = app
                .clone()
                .oneshot(Request::builder().method(method).uri("/users/abc").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            let body = json_body(response).await;
            assert_eq!(body["code"], "NOT_FOUND");
        }
    }

    #[tokio::test]
    async fn about_answers_get_and_post() {
        let app = router(test_state());
        for method in [Method::GET, Method::POST] {
            let response = app
                .clone()
                .oneshot(Request::builder().method(method).uri("/about").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = json_body(response).await;
            assert_eq!(body["success"], true);
            assert_eq!(body["data"]["name"], "Punocracy");
        }
    }

    #[tokio::test]
    async fn logout_expires_cookie_on_get_and_post() {
        let app = router(test_state());
        for method in [Method::GET, Method::POST] {
            let response = app
                .clone()
                .oneshot(Request::builder().method(method).uri("/logout").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
            assert!(cookie.contains("Max-Age=0"));
        }

        let response = app
            .oneshot(Request::builder().method(Method::PATCH).uri("/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn submit_post_requires_login() {
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/submit")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"body":"a pun","words":["pair"]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn words_rejects_multi_character_letter() {
        let app = router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/words?letter=ab").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn signup_validation_happens_before_database() {
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/signup")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"email":"not-an-email","password":"short","password_again":"other"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["field_errors"]["email"].is_string());
        assert!(body["field_errors"]["password"].is_string());
    }

    #[tokio::test]
    async fn unknown_path_falls_through_to_static_files() {
        let app = router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/no-such-file.css").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
