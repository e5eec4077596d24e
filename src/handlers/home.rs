use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;

use crate::database::models::{SessionUser, WordRow};
use crate::database::{DatabaseError, DatabaseManager, WordRepository};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, Db};

const HOME_WORD_COUNT: i64 = 12;

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub user: Option<SessionUser>,
    pub words: Vec<WordRow>,
}

/// GET / - current user (if any) and a handful of random words to play with
pub async fn get_home(
    Extension(Db(pool)): Extension<Db>,
    user: Option<CurrentUser>,
) -> ApiResult<HomePage> {
    let words = random_words_or_empty(&WordRepository::new(pool), HOME_WORD_COUNT).await?;

    Ok(ApiResponse::success(HomePage {
        user: user.map(|u| u.0),
        words,
    }))
}

/// An empty word table is not an error on pages that only show suggestions
pub(crate) async fn random_words_or_empty(
    words: &WordRepository,
    limit: i64,
) -> Result<Vec<WordRow>, DatabaseError> {
    match words.random_words(limit).await {
        Ok(words) => Ok(words),
        Err(DatabaseError::NotFound(_)) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// GET /health - database connectivity check
pub async fn health(Extension(Db(pool)): Extension<Db>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&pool).await {
        Ok(_) => (
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
