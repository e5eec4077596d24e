use axum::{extract::Extension, Json};
use serde::Deserialize;

use crate::database::models::SubmissionSummary;
use crate::database::{SubmissionRepository, WordRepository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, Db};

#[derive(Debug, Deserialize)]
pub struct HistoryRequest {
    pub word: String,
}

/// GET /history - the caller's own submissions, newest first
pub async fn get_history(
    user: CurrentUser,
    Extension(Db(pool)): Extension<Db>,
) -> ApiResult<Vec<SubmissionSummary>> {
    let history = SubmissionRepository::new(pool).history_for_user(user.id()).await?;
    Ok(ApiResponse::success(history))
}

/// POST /history - every submission that plays on the posted word
pub async fn post_history(
    _user: CurrentUser,
    Extension(Db(pool)): Extension<Db>,
    Json(payload): Json<HistoryRequest>,
) -> ApiResult<Vec<SubmissionSummary>> {
    let word = payload.word.trim();
    if word.is_empty() {
        return Err(ApiError::field_error("word", "Word cannot be empty"));
    }

    let word_ids = WordRepository::new(pool.clone()).get_word_id_list(&[word][..]).await?;
    let submissions = SubmissionRepository::new(pool).using_words(&word_ids).await?;
    Ok(ApiResponse::success(submissions))
}
