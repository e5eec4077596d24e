use axum::{
    extract::{Extension, Path},
    http::Method,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{Session, SessionStore};
use crate::database::models::SessionUser;
use crate::database::UserRepository;
use crate::error::ApiError;
use crate::middleware::{is_user_id, ApiResponse, CurrentUser, Db};

use super::validation::{
    validate_email_format, validate_password, validate_password_again, FieldErrors,
};

#[derive(Debug, Default, Deserialize)]
pub struct UserUpdateRequest {
    /// Lets plain HTML forms, which can only POST, ask for PUT or DELETE
    #[serde(rename = "_method")]
    pub method: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_again: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum UserAction {
    Update,
    Delete,
}

/// POST|PUT|DELETE /users/:id - change or remove the caller's own account.
/// Sits behind `must_login`.
pub async fn post_put_delete_users_id(
    method: Method,
    Path(id): Path<String>,
    user: CurrentUser,
    Extension(Db(pool)): Extension<Db>,
    Extension(store): Extension<SessionStore>,
    body: Option<Json<UserUpdateRequest>>,
) -> Result<Response, ApiError> {
    let id = parse_user_id(&id)?;
    if id != user.id() {
        tracing::warn!("User {} tried to modify user {}", user.id(), id);
        return Err(ApiError::forbidden("You can only modify your own account"));
    }

    let request = body.map(|Json(b)| b).unwrap_or_default();
    let users = UserRepository::new(pool);

    match resolve_action(&method, request.method.as_deref())? {
        UserAction::Delete => {
            users.delete(id).await?;
            Ok(ApiResponse::success(json!({ "deleted": id }))
                .with_cookie(store.expire())
                .into_response())
        }
        UserAction::Update => {
            validate_update(&request)?;
            let updated = users
                .update_email_and_password(id, request.email.as_deref(), request.password.as_deref())
                .await?;

            // Keep the cookie in step with a changed email
            let mut session = Session::new();
            session.set_user(&SessionUser::from(&updated))?;
            let cookie = store.save(&session)?;

            Ok(ApiResponse::success(updated).with_cookie(cookie).into_response())
        }
    }
}

/// Only all-digit IDs name a user; anything else is not a route at all.
fn parse_user_id(raw: &str) -> Result<i64, ApiError> {
    if !is_user_id(raw) {
        return Err(ApiError::not_found(format!("no route for /users/{}", raw)));
    }
    raw.parse()
        .map_err(|_| ApiError::not_found(format!("user {} not found", raw)))
}

fn resolve_action(method: &Method, override_method: Option<&str>) -> Result<UserAction, ApiError> {
    let effective = match (method, override_method) {
        (&Method::POST, Some(m)) => m.trim().to_ascii_uppercase(),
        _ => method.as_str().to_string(),
    };

    match effective.as_str() {
        "POST" | "PUT" => Ok(UserAction::Update),
        "DELETE" => Ok(UserAction::Delete),
        other => Err(ApiError::bad_request(format!("Unsupported _method '{}'", other))),
    }
}

fn validate_update(request: &UserUpdateRequest) -> Result<(), ApiError> {
    if request.email.is_none() && request.password.is_none() {
        return Err(ApiError::bad_request("Nothing to update: send email and/or password"));
    }

    let mut errors = FieldErrors::new();
    if let Some(email) = &request.email {
        errors.check("email", validate_email_format(email));
    }
    if let Some(password) = &request.password {
        errors.check("password", validate_password(password));
        errors.check(
            "password_again",
            validate_password_again(password, request.password_again.as_deref().unwrap_or_default()),
        );
    }
    errors.into_result()
}
