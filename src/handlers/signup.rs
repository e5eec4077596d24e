use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{Session, SessionStore};
use crate::database::models::{SessionUser, User};
use crate::database::UserRepository;
use crate::middleware::{ApiResponse, ApiResult, Db};

use super::validation::{
    validate_email_format, validate_password, validate_password_again, FieldErrors,
};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub password_again: String,
}

/// What a client needs to render a signup or login form
#[derive(Debug, Serialize)]
pub struct FormInfo {
    pub logged_in: bool,
    pub user: Option<SessionUser>,
    pub fields: Vec<&'static str>,
}

/// GET /signup
pub async fn get_signup(session: Session) -> ApiResult<FormInfo> {
    let user = session.user();
    Ok(ApiResponse::success(FormInfo {
        logged_in: user.is_some(),
        user,
        fields: vec!["email", "password", "password_again"],
    }))
}

/// POST /signup - create the account and log it in
pub async fn post_signup(
    Extension(Db(pool)): Extension<Db>,
    Extension(store): Extension<SessionStore>,
    mut session: Session,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<User> {
    let mut errors = FieldErrors::new();
    errors.check("email", validate_email_format(&payload.email));
    errors.check("password", validate_password(&payload.password));
    errors.check(
        "password_again",
        validate_password_again(&payload.password, &payload.password_again),
    );
    errors.into_result()?;

    let user = UserRepository::new(pool)
        .signup(&payload.email, &payload.password)
        .await?;

    session.set_user(&SessionUser::from(&user))?;
    let cookie = store.save(&session)?;

    Ok(ApiResponse::created(user).with_cookie(cookie))
}
