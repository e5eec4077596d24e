use axum::{extract::Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{Session, SessionStore};
use crate::database::models::{SessionUser, User};
use crate::database::UserRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Db};

use super::signup::FormInfo;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// GET /login
pub async fn get_login(session: Session) -> ApiResult<FormInfo> {
    let user = session.user();
    Ok(ApiResponse::success(FormInfo {
        logged_in: user.is_some(),
        user,
        fields: vec!["email", "password"],
    }))
}

/// POST /login - check credentials and store the user in the session
pub async fn post_login(
    Extension(Db(pool)): Extension<Db>,
    Extension(store): Extension<SessionStore>,
    mut session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<User> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user = UserRepository::new(pool)
        .find_by_email_and_password(&payload.email, &payload.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Email or password is incorrect"))?;

    session.set_user(&SessionUser::from(&user))?;
    let cookie = store.save(&session)?;
    tracing::info!("User {} logged in", user.id);

    Ok(ApiResponse::success(user).with_cookie(cookie))
}

/// GET|POST /logout - drop the session cookie
pub async fn get_logout(
    Extension(store): Extension<SessionStore>,
    session: Session,
) -> ApiResult<Value> {
    if let Some(user) = session.user() {
        tracing::info!("User {} logged out", user.id);
    }
    Ok(ApiResponse::success(json!({ "logged_out": true })).with_cookie(store.expire()))
}
