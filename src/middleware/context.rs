use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, Extensions},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;

use crate::app::AppState;
use crate::auth::{Session, SessionStore};
use crate::error::ApiError;

/// Shared database pool, injected by middleware
#[derive(Clone)]
pub struct Db(pub PgPool);

/// Injects the database handle and the session store into every request,
/// so handlers and inner middleware read them from the request extensions.
pub async fn inject_context(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(Db(state.pool.clone()));
    request.extensions_mut().insert(state.sessions.clone());

    next.run(request).await
}

/// Pull the session store back out of the extensions; a missing store means
/// `inject_context` was not layered around the route.
pub(crate) fn session_store(extensions: &Extensions) -> Result<SessionStore, ApiError> {
    extensions.get::<SessionStore>().cloned().ok_or_else(|| {
        tracing::error!("Session store missing from request extensions");
        ApiError::internal_server_error("Session store not configured")
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let store = session_store(&parts.extensions)?;
        Ok(store.load(&parts.headers))
    }
}
