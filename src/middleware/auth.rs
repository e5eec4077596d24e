use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::database::models::SessionUser;
use crate::error::ApiError;

use super::context::session_store;

/// Logged-in user taken from the session cookie
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser(pub SessionUser);

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

/// User IDs are all ASCII digits
pub fn is_user_id(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

/// 404s `/users/:id` paths whose id is not a number. Layered outside
/// `must_login` so a malformed path is never a login question.
pub async fn require_numeric_id(
    Path(id): Path<String>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !is_user_id(&id) {
        return Err(ApiError::not_found(format!("no route for /users/{}", id)));
    }
    Ok(next.run(request).await)
}

/// Rejects requests without a logged-in session before they reach the handler
pub async fn must_login(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let store = session_store(request.extensions())?;

    let Some(user) = store.load(request.headers()).user() else {
        tracing::warn!(
            "Rejected unauthenticated {} {}",
            request.method(),
            request.uri().path()
        );
        return Err(ApiError::unauthorized("You must be logged in"));
    };

    tracing::debug!("Session user {} passed login gate", user.id);
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Already resolved by must_login
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let store = session_store(&parts.extensions)?;
        store
            .load(&parts.headers)
            .user()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::unauthorized("You must be logged in"))
    }
}
