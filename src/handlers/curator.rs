use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::database::models::SubmissionSummary;
use crate::database::submissions::{MAX_SCORE, MIN_SCORE};
use crate::database::SubmissionRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, Db};

const DEFAULT_QUEUE_SIZE: i64 = 10;
const MAX_QUEUE_SIZE: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RateRequest {
    pub submission_id: i64,
    pub score: i16,
}

/// GET /queuerater - submissions the caller can still rate, oldest first
pub async fn get_curator(
    user: CurrentUser,
    Extension(Db(pool)): Extension<Db>,
    Query(query): Query<QueueQuery>,
) -> ApiResult<Vec<SubmissionSummary>> {
    let limit = query.limit.unwrap_or(DEFAULT_QUEUE_SIZE).clamp(1, MAX_QUEUE_SIZE);
    let queue = SubmissionRepository::new(pool).rating_queue(user.id(), limit).await?;
    Ok(ApiResponse::success(queue))
}

/// POST /queuerater - score someone else's submission
pub async fn post_curator(
    user: CurrentUser,
    Extension(Db(pool)): Extension<Db>,
    Json(payload): Json<RateRequest>,
) -> ApiResult<RateRequest> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&payload.score) {
        return Err(ApiError::field_error(
            "score",
            format!("Score must be between {} and {}", MIN_SCORE, MAX_SCORE),
        ));
    }

    let submissions = SubmissionRepository::new(pool);
    let submission = submissions
        .find_by_id(payload.submission_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("submission {} not found", payload.submission_id)))?;

    if submission.user_id == user.id() {
        return Err(ApiError::forbidden("You cannot rate your own submission"));
    }

    submissions.rate(submission.id, user.id(), payload.score).await?;
    Ok(ApiResponse::success(payload))
}
